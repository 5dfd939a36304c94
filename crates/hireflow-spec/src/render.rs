use std::collections::BTreeSet;

use serde_json::{json, Map, Value};

use crate::answers::{AnswerMap, AnswerValue};
use crate::schema::response_schema;
use crate::spec::question::QuestionType;
use crate::spec::Assessment;
use crate::validate::validate;
use crate::visibility::resolve_visibility;

/// Describes a single question for preview outputs, with the flags the
/// runtime session would report for the same answers.
#[derive(Debug, Clone)]
pub struct PreviewQuestion {
    pub id: String,
    pub label: String,
    pub kind: QuestionType,
    pub required: bool,
    pub choices: Option<Vec<String>>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub max_length: Option<usize>,
    pub visible: bool,
    pub invalid: bool,
    pub current_value: Option<AnswerValue>,
}

#[derive(Debug, Clone)]
pub struct PreviewSection {
    pub id: String,
    pub title: String,
    pub questions: Vec<PreviewQuestion>,
}

/// Progress counters over visible questions.
#[derive(Debug, Clone)]
pub struct PreviewProgress {
    pub answered: usize,
    pub total: usize,
}

/// Collected payload used by both the text and JSON renderers.
#[derive(Debug, Clone)]
pub struct PreviewPayload {
    pub job_id: String,
    pub sections: Vec<PreviewSection>,
    pub progress: PreviewProgress,
    pub schema: Value,
}

/// Builds the preview payload for a document and the current answer
/// state. The flags mirror exactly what a runtime session over the same
/// inputs would show.
pub fn build_preview_payload(
    assessment: &Assessment,
    answers: &AnswerMap,
    touched: &BTreeSet<String>,
) -> PreviewPayload {
    let visibility = resolve_visibility(assessment, answers);
    let validation = validate(assessment, &visibility, answers, touched);

    let sections = assessment
        .sections
        .iter()
        .map(|section| PreviewSection {
            id: section.id.clone(),
            title: section.title.clone(),
            questions: section
                .questions
                .iter()
                .map(|question| PreviewQuestion {
                    id: question.id.clone(),
                    label: question.label.clone(),
                    kind: question.kind,
                    required: question.required,
                    choices: question.choices.clone(),
                    min: question.min,
                    max: question.max,
                    max_length: question.max_length,
                    visible: visibility.get(&question.id).copied().unwrap_or(true),
                    invalid: validation.get(&question.id).copied().unwrap_or(false),
                    current_value: answers.get(&question.id).cloned(),
                })
                .collect(),
        })
        .collect::<Vec<_>>();

    let answered = assessment
        .questions()
        .filter(|question| {
            visibility.get(&question.id).copied().unwrap_or(true)
                && answers
                    .get(&question.id)
                    .is_some_and(|answer| !answer.is_empty())
        })
        .count();
    let total = visibility.values().filter(|visible| **visible).count();

    let schema = response_schema(assessment, &visibility);

    PreviewPayload {
        job_id: assessment.job_id.clone(),
        sections,
        progress: PreviewProgress { answered, total },
        schema,
    }
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &PreviewPayload) -> Value {
    let sections = payload
        .sections
        .iter()
        .map(|section| {
            let questions = section
                .questions
                .iter()
                .map(|question| {
                    let mut map = Map::new();
                    map.insert("id".into(), Value::String(question.id.clone()));
                    map.insert("label".into(), Value::String(question.label.clone()));
                    map.insert(
                        "type".into(),
                        Value::String(question.kind.as_str().to_string()),
                    );
                    map.insert("required".into(), Value::Bool(question.required));
                    if let Some(choices) = &question.choices {
                        map.insert(
                            "choices".into(),
                            Value::Array(
                                choices
                                    .iter()
                                    .map(|choice| Value::String(choice.clone()))
                                    .collect(),
                            ),
                        );
                    }
                    if let Some(current_value) = &question.current_value {
                        map.insert(
                            "current_value".into(),
                            serde_json::to_value(current_value).unwrap_or(Value::Null),
                        );
                    }
                    map.insert("visible".into(), Value::Bool(question.visible));
                    map.insert("invalid".into(), Value::Bool(question.invalid));
                    Value::Object(map)
                })
                .collect::<Vec<_>>();
            json!({
                "id": section.id,
                "title": section.title,
                "questions": questions,
            })
        })
        .collect::<Vec<_>>();

    json!({
        "job_id": payload.job_id,
        "progress": {
            "answered": payload.progress.answered,
            "total": payload.progress.total,
        },
        "sections": sections,
        "schema": payload.schema,
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &PreviewPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Assessment for job: {}", payload.job_id));
    lines.push(format!(
        "Progress: {}/{} visible questions answered",
        payload.progress.answered, payload.progress.total
    ));

    for section in &payload.sections {
        lines.push(format!("Section: {} ({})", section.title, section.id));
        for question in &section.questions {
            let mut entry = format!(" - {} ({})", question.id, question.label);
            if question.required {
                entry.push_str(" [required]");
            }
            if !question.visible {
                entry.push_str(" [hidden]");
            }
            if question.invalid {
                entry.push_str(" [invalid]");
            }
            if let Some(value) = &question.current_value {
                entry.push_str(&format!(" = {}", value_to_display(value)));
            }
            lines.push(entry);
        }
    }

    lines.join("\n")
}

fn value_to_display(value: &AnswerValue) -> String {
    match value {
        AnswerValue::Text(text) => text.clone(),
        AnswerValue::Selections(items) => items.join(", "),
    }
}
