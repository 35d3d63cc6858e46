//! Deterministic local payloads.
//!
//! Used when a downstream service is unset or unreachable. Everything
//! here is pure: same input, same output, no I/O. Each payload carries a
//! `source` tag naming the path that produced it.

use serde_json::{Value, json};

use crate::consts::truncate_chars;
use crate::lesson::{Lesson, LessonMeta, Reference};
use crate::quiz::{DemonstrationPrompt, MultipleChoice, OpenQuestion, PromptLesson, Quiz, TrueFalse};

pub const SOURCE_STUB: &str = "stub";
pub const SOURCE_COMPONENT: &str = "invoke_component_stub";
pub const SOURCE_COMPONENT_DEFAULT: &str = "invoke_component_default";

pub const LESSON_TITLE: &str = "Clarify Ambiguity with the SPQA Frame";

const LESSON_OBJECTIVES: &[&str] = &[
    "Separate symptoms from root problems",
    "Define success criteria",
    "Identify next best action",
];

const LESSON_BODY: &str = "Use SPQA: Situation → Problem → Questions → Actions. \
    Start by restating the situation in plain language, isolate one measurable problem, \
    list the 3 top clarifying questions, and choose one 48-hour action.";

const LESSON_TAKEAWAYS: &[&str] = &[
    "Answer the right questions",
    "Tie actions to metrics",
    "Iterate quickly",
];

const LESSON_REFERENCES: &[(&str, &str)] = &[("SPQA Primer", "https://example.com")];

/// (question, choices, answer letter, explanation)
const QUIZ_MCQ: &[(&str, [&str; 4], &str, &str)] = &[
    (
        "In SPQA, what comes after Problem?",
        ["Action", "Question", "Scope", "Answer"],
        "B",
        "S → P → Q → A",
    ),
    (
        "Best lever to reduce ambiguity fastest?",
        [
            "More meetings",
            "Answer top questions",
            "Add stakeholders",
            "Extend timeline",
        ],
        "B",
        "Answering the right questions reduces uncertainty.",
    ),
    (
        "Which improves prompt reliability?",
        [
            "Vague goals",
            "No constraints",
            "Explicit output format",
            "Skip critique",
        ],
        "C",
        "Specify structure & format.",
    ),
];

const QUIZ_TF: &[(&str, bool, &str)] = &[
    (
        "SPQA stands for Situation, Problem, Question, Actions.",
        true,
        "Correct order.",
    ),
    (
        "Refinement/critique is optional for complex tasks.",
        false,
        "Refinement is essential for complex prompts.",
    ),
];

const QUIZ_OPEN: &[(&str, &[&str])] = &[(
    "Rewrite the user’s question using SPQA. Provide one immediate 48-hour action.",
    &[
        "Situation restated",
        "Problem measurable",
        "Top Qs listed",
        "48-hour action present",
    ],
)];

const STRATEGY_SUMMARY: &str = "Use SPQA to turn ambiguous tasks into crisp prompts.";

const PROMPT_PRINCIPLES: &[&str] = &[
    "Set a clear role & constraints",
    "Structure inputs (context → task → criteria)",
    "Specify output format",
    "Iterate: critique & refine",
];

const DEMONSTRATION_PROMPTS: &[(&str, &str)] = &[
    (
        "Single-shot",
        "You are a strategy coach. Using SPQA, rewrite this business question… [user’s question]. Output: a 4-step plan.",
    ),
    (
        "Few-shot",
        "Here are 2 examples of good SPQA prompts… Now create one for: [user’s question].",
    ),
    (
        "Refinement",
        "Critique the following prompt for clarity, constraints, and measurability. Suggest a tighter version.",
    ),
];

const APPLICATION_CHECKLIST: &[&str] = &[
    "Is the objective measurable?",
    "Are constraints explicit?",
    "Is the output format unambiguous?",
    "Does the prompt include a critique step?",
];

/// Characters of the question kept as the stub elicitation summary.
pub const ELICIT_SUMMARY_CHARS: usize = 400;

pub const CAPTURE_QUESTION: &str = "C_CaptureQuestion";

pub const CLARIFY_FOLLOWUP: &str =
    "Could you tell me a bit more about your situation and the outcome you want?";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The fallback lesson. Its content quotes `question` verbatim.
pub fn lesson(question: &str) -> Lesson {
    Lesson {
        title: LESSON_TITLE.to_string(),
        objectives: strings(LESSON_OBJECTIVES),
        content: format!("{LESSON_BODY}\n\nApply it to your question: \"{question}\""),
        key_takeaways: strings(LESSON_TAKEAWAYS),
        references: LESSON_REFERENCES
            .iter()
            .map(|(label, url)| Reference {
                label: label.to_string(),
                url: url.to_string(),
            })
            .collect(),
        meta: LessonMeta {
            question: question.to_string(),
        },
    }
}

pub fn quiz() -> Quiz {
    Quiz {
        mcq: QUIZ_MCQ
            .iter()
            .map(|(q, choices, answer, explain)| MultipleChoice {
                q: q.to_string(),
                choices: strings(choices),
                answer: answer.to_string(),
                explain: explain.to_string(),
            })
            .collect(),
        tf: QUIZ_TF
            .iter()
            .map(|(q, answer, explain)| TrueFalse {
                q: q.to_string(),
                answer: *answer,
                explain: explain.to_string(),
            })
            .collect(),
        open: QUIZ_OPEN
            .iter()
            .map(|(q, rubric)| OpenQuestion {
                q: q.to_string(),
                rubric: strings(rubric),
            })
            .collect(),
    }
}

pub fn prompt_lesson() -> PromptLesson {
    PromptLesson {
        strategy_summary: STRATEGY_SUMMARY.to_string(),
        prompt_principles: strings(PROMPT_PRINCIPLES),
        demonstration_prompts: DEMONSTRATION_PROMPTS
            .iter()
            .map(|(label, prompt)| DemonstrationPrompt {
                label: label.to_string(),
                prompt: prompt.to_string(),
            })
            .collect(),
        application_checklist: strings(APPLICATION_CHECKLIST),
    }
}

/// Local stand-in for the prompt service.
pub fn elicit_summary(question: &str) -> String {
    truncate_chars(question, ELICIT_SUMMARY_CHARS)
}

/// Result of a stubbed component invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentOutcome {
    pub reply: String,
    pub needs_clarify: bool,
    pub followup_question: String,
    /// Always carries `source` and `component`.
    pub raw: Value,
}

pub fn invoke_component(component: &str, question: &str) -> ComponentOutcome {
    if component == CAPTURE_QUESTION {
        let needs_clarify = question.to_lowercase().contains("clarify") || question.contains('?');
        let (reply, followup_question) = if needs_clarify {
            (CLARIFY_FOLLOWUP.to_string(), CLARIFY_FOLLOWUP.to_string())
        } else {
            (format!("Got it: \"{question}\"."), String::new())
        };
        return ComponentOutcome {
            reply,
            needs_clarify,
            followup_question,
            raw: json!({
                "source": SOURCE_COMPONENT,
                "component": component,
                "question": question,
            }),
        };
    }

    ComponentOutcome {
        reply: format!("Component {component} invoked."),
        needs_clarify: false,
        followup_question: String::new(),
        raw: json!({
            "source": SOURCE_COMPONENT_DEFAULT,
            "component": component,
        }),
    }
}
