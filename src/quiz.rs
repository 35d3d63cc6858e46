use serde::{Deserialize, Serialize};

/// A quiz. Same lifecycle as [`Lesson`](crate::lesson::Lesson).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub mcq: Vec<MultipleChoice>,
    pub tf: Vec<TrueFalse>,
    pub open: Vec<OpenQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultipleChoice {
    pub q: String,
    pub choices: Vec<String>,
    /// Letter of the correct choice.
    pub answer: String,
    pub explain: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrueFalse {
    pub q: String,
    pub answer: bool,
    pub explain: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenQuestion {
    pub q: String,
    pub rubric: Vec<String>,
}

/// Prompt-writing coaching that accompanies a quiz.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptLesson {
    pub strategy_summary: String,
    pub prompt_principles: Vec<String>,
    pub demonstration_prompts: Vec<DemonstrationPrompt>,
    pub application_checklist: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemonstrationPrompt {
    pub label: String,
    pub prompt: String,
}
