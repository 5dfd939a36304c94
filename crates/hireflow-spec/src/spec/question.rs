use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Closed set of question kinds. The lowercase labels are the wire
/// vocabulary for persisted documents; an unknown tag fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Single,
    Multi,
    Short,
    Long,
    Number,
    File,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Single => "single",
            QuestionType::Multi => "multi",
            QuestionType::Short => "short",
            QuestionType::Long => "long",
            QuestionType::Number => "number",
            QuestionType::File => "file",
        }
    }

    /// Kinds that carry an ordered choice list.
    pub fn has_choices(&self) -> bool {
        matches!(self, QuestionType::Single | QuestionType::Multi)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conjunctive condition gating whether a question is shown: every entry
/// maps a dependency question id to the answer value it must hold.
pub type VisibilityPredicate = BTreeMap<String, String>;

/// One field definition inside a section. Constraint fields are flat on
/// the question, exactly as persisted documents carry them; fields that
/// do not apply to the current kind are tolerated and ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, rename = "visibleIf", skip_serializing_if = "Option::is_none")]
    pub visible_if: Option<VisibilityPredicate>,
}

impl Question {
    /// Bare question of the given kind with no constraints attached.
    pub fn new(id: impl Into<String>, kind: QuestionType, label: impl Into<String>) -> Self {
        Question {
            id: id.into(),
            kind,
            label: label.into(),
            required: false,
            choices: None,
            min: None,
            max: None,
            max_length: None,
            visible_if: None,
        }
    }
}
