use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One respondent-provided value. Text covers free text, a single-choice
/// label, a numeric value riding as a string pending coercion, and the
/// file-name placeholder of a file question; multi-choice answers carry
/// the selected labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Selections(Vec<String>),
}

impl AnswerValue {
    pub fn text(value: impl Into<String>) -> Self {
        AnswerValue::Text(value.into())
    }

    pub fn selections<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AnswerValue::Selections(values.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Text(text) => text.is_empty(),
            AnswerValue::Selections(items) => items.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(text) => Some(text),
            AnswerValue::Selections(_) => None,
        }
    }

    /// Predicate match: a selection set matches by membership, any other
    /// value by exact string equality.
    pub fn matches(&self, expected: &str) -> bool {
        match self {
            AnswerValue::Text(text) => text == expected,
            AnswerValue::Selections(items) => items.iter().any(|item| item == expected),
        }
    }
}

/// Session-local mapping from question id to the current answer.
pub type AnswerMap = BTreeMap<String, AnswerValue>;

/// Submission payload handed to the response collaborator at a
/// successful submit. The engine does not retain it afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDocument {
    pub values: AnswerMap,
    pub submitted_at: DateTime<Utc>,
}

impl ResponseDocument {
    pub fn to_cbor(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        serde_cbor::to_vec(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
