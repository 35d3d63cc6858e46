use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::request::{is_truthy, stringify};

/// A generated lesson. Built per request, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub title: String,
    pub objectives: Vec<String>,
    pub content: String,
    pub key_takeaways: Vec<String>,
    pub references: Vec<Reference>,
    pub meta: LessonMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LessonMeta {
    pub question: String,
}

impl Lesson {
    /// Read a lesson out of arbitrary JSON. Wrongly typed or missing
    /// fields come back empty; this never fails.
    pub fn from_value_lossy(value: &Value) -> Self {
        let references = value
            .get("references")
            .and_then(Value::as_array)
            .map(|refs| {
                refs.iter()
                    .map(|r| Reference {
                        label: text_field(r, "label"),
                        url: text_field(r, "url"),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            title: text_field(value, "title"),
            objectives: string_list(value, "objectives"),
            content: text_field(value, "content"),
            key_takeaways: string_list(value, "keyTakeaways"),
            references,
            meta: LessonMeta {
                question: value
                    .get("meta")
                    .map(|meta| text_field(meta, "question"))
                    .unwrap_or_default(),
            },
        }
    }
}

/// Number of key takeaways in a raw lesson payload (0 if not an array).
pub fn bullet_count(value: &Value) -> usize {
    value
        .get("keyTakeaways")
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

fn text_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .filter(|v| is_truthy(v))
        .map(stringify)
        .unwrap_or_default()
}

fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().map(stringify).collect())
        .unwrap_or_default()
}
