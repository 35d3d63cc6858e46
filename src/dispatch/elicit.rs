//! Summary extraction for prompt-service payloads.
//!
//! The prompt service returns free-form JSON. Each extractor looks in one
//! place and returns a summary or nothing; [`summarize`] tries them in
//! order and stops at the first hit.

use serde_json::Value;

use crate::consts::truncate_chars;

const PROMPT_SUMMARY_CHARS: usize = 800;
const SYNTHESIZED_SUMMARY_CHARS: usize = 1000;
const SYNTHESIZED_PROMPTS: usize = 2;

/// Fields that may carry a plain-text answer, in priority order.
const FREE_TEXT_FIELDS: &[&str] = &["text", "result", "output", "answer"];

/// Which extractor produced the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarySource {
    Explicit,
    StrategySummary,
    DemonstrationPrompt,
    FreeText,
    Synthesized,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub source: SummarySource,
    pub text: String,
}

type Extractor = fn(&Value) -> Option<String>;

const CHAIN: &[(SummarySource, Extractor)] = &[
    (SummarySource::Explicit, explicit),
    (SummarySource::StrategySummary, strategy_summary),
    (SummarySource::DemonstrationPrompt, first_demonstration),
    (SummarySource::FreeText, free_text),
    (SummarySource::Synthesized, synthesized),
];

pub fn summarize(payload: &Value) -> Option<Summary> {
    CHAIN.iter().find_map(|(source, extract)| {
        extract(payload).map(|text| Summary {
            source: *source,
            text,
        })
    })
}

fn non_empty(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn explicit(payload: &Value) -> Option<String> {
    non_empty(payload.get("summary")).map(str::to_string)
}

fn strategy_summary(payload: &Value) -> Option<String> {
    non_empty(
        payload
            .get("promptLesson")
            .and_then(|p| p.get("strategySummary")),
    )
    .map(str::to_string)
}

/// `promptLesson.demonstrationPrompts`, or a top-level
/// `demonstrationPrompts` when the lesson wrapper is missing.
fn demonstration_prompts(payload: &Value) -> &[Value] {
    payload
        .get("promptLesson")
        .and_then(|p| p.get("demonstrationPrompts"))
        .and_then(Value::as_array)
        .or_else(|| payload.get("demonstrationPrompts").and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn first_demonstration(payload: &Value) -> Option<String> {
    let first = demonstration_prompts(payload).first()?;
    non_empty(first.get("prompt")).map(|p| truncate_chars(p, PROMPT_SUMMARY_CHARS))
}

fn free_text(payload: &Value) -> Option<String> {
    FREE_TEXT_FIELDS
        .iter()
        .find_map(|field| non_empty(payload.get(*field)))
        .map(|text| truncate_chars(text, PROMPT_SUMMARY_CHARS))
}

fn synthesized(payload: &Value) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(strategy) = non_empty(
        payload
            .get("promptLesson")
            .and_then(|p| p.get("strategySummary")),
    ) {
        parts.push(strategy);
    }
    parts.extend(
        demonstration_prompts(payload)
            .iter()
            .filter_map(|d| non_empty(d.get("prompt")))
            .take(SYNTHESIZED_PROMPTS),
    );

    if parts.is_empty() {
        return None;
    }
    Some(truncate_chars(&parts.join("\n\n"), SYNTHESIZED_SUMMARY_CHARS))
}
