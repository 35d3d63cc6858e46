/// The `/webhook` dispatch key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Ping,
    Retrieve,
    GenerateLesson,
    GenerateQuiz,
    ExportLesson,
    LlmElicit,
    InvokeComponent,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::Ping,
        Action::Retrieve,
        Action::GenerateLesson,
        Action::GenerateQuiz,
        Action::ExportLesson,
        Action::LlmElicit,
        Action::InvokeComponent,
    ];

    /// Wire name, as callers send it (lower case).
    pub fn name(self) -> &'static str {
        match self {
            Action::Ping => "ping",
            Action::Retrieve => "retrieve",
            Action::GenerateLesson => "generate_lesson",
            Action::GenerateQuiz => "generate_quiz",
            Action::ExportLesson => "export_lesson",
            Action::LlmElicit => "llm_elicit",
            Action::InvokeComponent => "invoke_component",
        }
    }

    /// Match an already lower-cased action string.
    pub fn parse(action: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == action)
    }
}
