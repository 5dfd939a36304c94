use std::collections::BTreeSet;

use crate::answers::{AnswerMap, AnswerValue};
use crate::spec::question::{Question, QuestionType};
use crate::spec::Assessment;
use crate::visibility::VisibilityMap;

/// Per-question invalid flags; `true` means the field currently fails
/// validation and should block submission.
pub type ValidationMap = std::collections::BTreeMap<String, bool>;

/// Computes the invalid flag for every question in the document.
///
/// A question can only be invalid once it is in the touched set and
/// currently visible; untouched or hidden fields always report valid.
/// The required-empty check runs first and short-circuits the
/// range/length checks, so an empty non-required field never fails them.
pub fn validate(
    assessment: &Assessment,
    visibility: &VisibilityMap,
    answers: &AnswerMap,
    touched: &BTreeSet<String>,
) -> ValidationMap {
    let mut map = ValidationMap::new();

    for section in &assessment.sections {
        for question in &section.questions {
            let visible = visibility.get(&question.id).copied().unwrap_or(true);
            let invalid = touched.contains(&question.id)
                && visible
                && violates(question, answers.get(&question.id));
            map.insert(question.id.clone(), invalid);
        }
    }

    map
}

/// First invalid question in document order, the deterministic target
/// for user attention after a rejected submit.
pub fn first_invalid<'a>(
    assessment: &'a Assessment,
    validation: &ValidationMap,
) -> Option<&'a str> {
    assessment
        .questions()
        .find(|question| validation.get(&question.id).copied().unwrap_or(false))
        .map(|question| question.id.as_str())
}

pub fn is_clean(validation: &ValidationMap) -> bool {
    !validation.values().any(|invalid| *invalid)
}

fn violates(question: &Question, answer: Option<&AnswerValue>) -> bool {
    let empty = answer.is_none_or(AnswerValue::is_empty);
    if question.required && empty {
        return true;
    }
    if empty {
        return false;
    }

    match question.kind {
        QuestionType::Number => out_of_range(question, answer),
        QuestionType::Short | QuestionType::Long => too_long(question, answer),
        _ => false,
    }
}

fn out_of_range(question: &Question, answer: Option<&AnswerValue>) -> bool {
    // Numeric answers ride as strings; a value that does not parse is
    // left to the required check alone.
    let Some(value) = answer
        .and_then(AnswerValue::as_text)
        .and_then(|raw| raw.trim().parse::<f64>().ok())
    else {
        return false;
    };

    question.min.is_some_and(|min| value < min) || question.max.is_some_and(|max| value > max)
}

fn too_long(question: &Question, answer: Option<&AnswerValue>) -> bool {
    match (question.max_length, answer.and_then(AnswerValue::as_text)) {
        (Some(max_length), Some(text)) => text.len() > max_length,
        _ => false,
    }
}
