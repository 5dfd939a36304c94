use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::question::Question;

/// An ordered group of questions within an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// The full questionnaire document for one job. Section ids are unique
/// within a document; the builder is the only producer of new ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub job_id: String,
    pub sections: Vec<Section>,
    pub updated_at: DateTime<Utc>,
}

impl Assessment {
    /// Document for a job that has never been authored: one default
    /// section, no questions.
    pub fn empty(job_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Assessment {
            job_id: job_id.into(),
            sections: vec![Section {
                id: "s1".into(),
                title: "Section 1".into(),
                questions: Vec::new(),
            }],
            updated_at: now,
        }
    }

    /// All questions in document order: section order, then question
    /// order within the section.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.sections.iter().flat_map(|section| &section.questions)
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions().find(|question| question.id == id)
    }

    pub fn question_count(&self) -> usize {
        self.sections
            .iter()
            .map(|section| section.questions.len())
            .sum()
    }
}
