use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::spec::question::{Question, QuestionType, VisibilityPredicate};
use crate::spec::{Assessment, Section};
use crate::store::{AssessmentStore, StoreError};

/// Structural failure of an edit intent: the document it was aimed at
/// does not have the addressed section, question, or choice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    #[error("section index {0} is out of range")]
    SectionOutOfRange(usize),
    #[error("question index {0} is out of range in section '{1}'")]
    QuestionOutOfRange(usize, String),
    #[error("choice index {0} is out of range for question '{1}'")]
    ChoiceOutOfRange(usize, String),
}

/// Failure of the save protocol. A document that fails validation never
/// reaches the persistence collaborator.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("an assessment needs at least one question before it can be saved")]
    NoQuestions,
    #[error("visibility of question '{0}' depends on itself through a cycle")]
    CyclicPredicate(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Partial update merged into an existing question. Absent fields keep
/// their current value; a field set to `null` clears it. Switching
/// `type` deliberately leaves constraints from the previous kind in
/// place, as persisted documents tolerate extra constraint fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<QuestionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    #[serde(default, deserialize_with = "patched", skip_serializing_if = "Option::is_none")]
    pub min: Option<Option<f64>>,
    #[serde(default, deserialize_with = "patched", skip_serializing_if = "Option::is_none")]
    pub max: Option<Option<f64>>,
    #[serde(
        rename = "maxLength",
        default,
        deserialize_with = "patched",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_length: Option<Option<usize>>,
    #[serde(
        rename = "visibleIf",
        default,
        deserialize_with = "patched",
        skip_serializing_if = "Option::is_none"
    )]
    pub visible_if: Option<Option<VisibilityPredicate>>,
}

// Distinguishes an absent patch field (keep) from an explicit null
// (clear): the outer Option is always Some once the key is present.
fn patched<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// One authoring edit, applied through [`apply`]. Sections, questions,
/// and choices are addressed by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditIntent {
    AddSection,
    RemoveSection {
        section: usize,
    },
    RenameSection {
        section: usize,
        title: String,
    },
    AddQuestion {
        section: usize,
        kind: QuestionType,
    },
    RemoveQuestion {
        section: usize,
        question: usize,
    },
    UpdateQuestion {
        section: usize,
        question: usize,
        patch: QuestionPatch,
    },
    AddChoice {
        section: usize,
        question: usize,
    },
    UpdateChoice {
        section: usize,
        question: usize,
        choice: usize,
        label: String,
    },
    RemoveChoice {
        section: usize,
        question: usize,
        choice: usize,
    },
}

impl EditIntent {
    /// Destructive intents the hosting surface must confirm with the
    /// user before applying. The reducer itself never blocks.
    pub fn requires_confirmation(&self) -> bool {
        matches!(
            self,
            EditIntent::RemoveSection { .. } | EditIntent::RemoveQuestion { .. }
        )
    }
}

/// Applies one edit to the document and returns the new version with the
/// last-modified timestamp set to `now`. The input document is never
/// mutated; a structural error leaves no partial edit behind.
pub fn apply(
    assessment: &Assessment,
    intent: &EditIntent,
    now: DateTime<Utc>,
) -> Result<Assessment, BuilderError> {
    let mut next = assessment.clone();

    match intent {
        EditIntent::AddSection => {
            let index = next_section_index(&next);
            next.sections.push(Section {
                id: format!("s{index}"),
                title: format!("Section {index}"),
                questions: Vec::new(),
            });
        }
        EditIntent::RemoveSection { section } => {
            section_check(&next, *section)?;
            next.sections.remove(*section);
        }
        EditIntent::RenameSection { section, title } => {
            section_mut(&mut next, *section)?.title = title.clone();
        }
        EditIntent::AddQuestion { section, kind } => {
            let id = next_question_id(&next, *section)?;
            let section = section_mut(&mut next, *section)?;
            section.questions.push(new_question(id, *kind));
        }
        EditIntent::RemoveQuestion { section, question } => {
            let section = section_mut(&mut next, *section)?;
            question_check(section, *question)?;
            section.questions.remove(*question);
        }
        EditIntent::UpdateQuestion {
            section,
            question,
            patch,
        } => {
            let section = section_mut(&mut next, *section)?;
            merge_patch(question_mut(section, *question)?, patch);
        }
        EditIntent::AddChoice { section, question } => {
            let section = section_mut(&mut next, *section)?;
            let question = question_mut(section, *question)?;
            let choices = question.choices.get_or_insert_with(Vec::new);
            choices.push(format!("Option {}", next_choice_letter(choices.len())));
        }
        EditIntent::UpdateChoice {
            section,
            question,
            choice,
            label,
        } => {
            let section = section_mut(&mut next, *section)?;
            let slot = choice_mut(question_mut(section, *question)?, *choice)?;
            *slot = label.clone();
        }
        EditIntent::RemoveChoice {
            section,
            question,
            choice,
        } => {
            let section = section_mut(&mut next, *section)?;
            let question = question_mut(section, *question)?;
            choice_check(question, *choice)?;
            if let Some(choices) = question.choices.as_mut() {
                choices.remove(*choice);
            }
        }
    }

    next.updated_at = now;
    Ok(next)
}

/// Validates the working copy, then hands it to the persistence
/// collaborator. Transient store failures leave the caller's copy
/// untouched and may be retried.
pub fn save(store: &dyn AssessmentStore, assessment: &Assessment) -> Result<(), SaveError> {
    check_saveable(assessment)?;
    store.save_assessment(&assessment.job_id, assessment)?;
    Ok(())
}

/// Save-time validation: the document must contain at least one question
/// and its visibility predicates must not form a dependency cycle.
/// Predicates naming unknown questions are allowed; the runtime simply
/// keeps such fields hidden.
pub fn check_saveable(assessment: &Assessment) -> Result<(), SaveError> {
    if assessment.question_count() == 0 {
        return Err(SaveError::NoQuestions);
    }
    detect_cycle(assessment)?;
    Ok(())
}

fn detect_cycle(assessment: &Assessment) -> Result<(), SaveError> {
    let mut dependencies: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for question in assessment.questions() {
        let deps = question
            .visible_if
            .iter()
            .flat_map(|predicate| predicate.keys())
            .map(String::as_str)
            .collect();
        dependencies.insert(question.id.as_str(), deps);
    }

    let mut settled = BTreeSet::new();
    for start in dependencies.keys().copied() {
        let mut trail = Vec::new();
        if let Some(cycle_head) = walk(start, &dependencies, &mut settled, &mut trail) {
            return Err(SaveError::CyclicPredicate(cycle_head.to_string()));
        }
    }
    Ok(())
}

fn walk<'a>(
    id: &'a str,
    dependencies: &BTreeMap<&'a str, Vec<&'a str>>,
    settled: &mut BTreeSet<&'a str>,
    trail: &mut Vec<&'a str>,
) -> Option<&'a str> {
    if settled.contains(id) {
        return None;
    }
    if trail.contains(&id) {
        return Some(id);
    }
    trail.push(id);
    for dep in dependencies.get(id).into_iter().flatten().copied() {
        // References to unknown questions have no outgoing edges.
        if dependencies.contains_key(dep)
            && let Some(found) = walk(dep, dependencies, settled, trail)
        {
            return Some(found);
        }
    }
    trail.pop();
    settled.insert(id);
    None
}

fn new_question(id: String, kind: QuestionType) -> Question {
    let mut question = Question::new(id.clone(), kind, format!("Question {id}"));
    match kind {
        QuestionType::Single | QuestionType::Multi => {
            question.choices = Some(vec!["Option A".into(), "Option B".into()]);
        }
        QuestionType::Number => {
            question.min = Some(0.0);
            question.max = Some(100.0);
        }
        QuestionType::Short => question.max_length = Some(120),
        QuestionType::Long => question.max_length = Some(500),
        QuestionType::File => {}
    }
    question
}

fn merge_patch(question: &mut Question, patch: &QuestionPatch) {
    if let Some(label) = &patch.label {
        question.label = label.clone();
    }
    if let Some(kind) = patch.kind {
        question.kind = kind;
    }
    if let Some(required) = patch.required {
        question.required = required;
    }
    if let Some(choices) = &patch.choices {
        question.choices = Some(choices.clone());
    }
    if let Some(min) = patch.min {
        question.min = min;
    }
    if let Some(max) = patch.max {
        question.max = max;
    }
    if let Some(max_length) = patch.max_length {
        question.max_length = max_length;
    }
    if let Some(visible_if) = &patch.visible_if {
        question.visible_if = visible_if.clone();
    }
}

// Section ids are never reused: a remove followed by an add must not
// recreate an id a predicate or stored response might still reference.
fn next_section_index(assessment: &Assessment) -> usize {
    let mut index = assessment.sections.len() + 1;
    while assessment
        .sections
        .iter()
        .any(|section| section.id == format!("s{index}"))
    {
        index += 1;
    }
    index
}

// Question ids are unique across the whole document so that visibility
// predicates always resolve unambiguously.
fn next_question_id(assessment: &Assessment, section: usize) -> Result<String, BuilderError> {
    let base = section_ref(assessment, section)?.questions.len() + 1;
    let mut index = base;
    loop {
        let id = format!("q{index}");
        if assessment.question(&id).is_none() {
            return Ok(id);
        }
        index += 1;
    }
}

fn next_choice_letter(existing: usize) -> char {
    char::from_u32('A' as u32 + existing as u32).unwrap_or('?')
}

fn section_check(assessment: &Assessment, index: usize) -> Result<(), BuilderError> {
    section_ref(assessment, index).map(|_| ())
}

fn section_ref(assessment: &Assessment, index: usize) -> Result<&Section, BuilderError> {
    assessment
        .sections
        .get(index)
        .ok_or(BuilderError::SectionOutOfRange(index))
}

fn section_mut(assessment: &mut Assessment, index: usize) -> Result<&mut Section, BuilderError> {
    assessment
        .sections
        .get_mut(index)
        .ok_or(BuilderError::SectionOutOfRange(index))
}

fn question_check(section: &Section, index: usize) -> Result<(), BuilderError> {
    if index < section.questions.len() {
        Ok(())
    } else {
        Err(BuilderError::QuestionOutOfRange(index, section.id.clone()))
    }
}

fn question_mut(section: &mut Section, index: usize) -> Result<&mut Question, BuilderError> {
    let id = section.id.clone();
    section
        .questions
        .get_mut(index)
        .ok_or(BuilderError::QuestionOutOfRange(index, id))
}

fn choice_check(question: &Question, index: usize) -> Result<(), BuilderError> {
    let len = question.choices.as_ref().map_or(0, Vec::len);
    if index < len {
        Ok(())
    } else {
        Err(BuilderError::ChoiceOutOfRange(index, question.id.clone()))
    }
}

fn choice_mut(question: &mut Question, index: usize) -> Result<&mut String, BuilderError> {
    let id = question.id.clone();
    question
        .choices
        .as_mut()
        .and_then(|choices| choices.get_mut(index))
        .ok_or(BuilderError::ChoiceOutOfRange(index, id))
}
