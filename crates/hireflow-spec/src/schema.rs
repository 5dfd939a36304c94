use serde_json::{json, Map, Value};

use crate::spec::question::{Question, QuestionType};
use crate::spec::Assessment;
use crate::visibility::VisibilityMap;

/// JSON Schema for the response `values` object, covering currently
/// visible questions only. Hidden questions are omitted entirely so a
/// generated document never demands an answer the respondent cannot see.
pub fn response_schema(assessment: &Assessment, visibility: &VisibilityMap) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for question in assessment.questions() {
        if !visibility.get(&question.id).copied().unwrap_or(true) {
            continue;
        }
        properties.insert(question.id.clone(), question_schema(question));
        if question.required {
            required.push(Value::String(question.id.clone()));
        }
    }

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

fn question_schema(question: &Question) -> Value {
    match question.kind {
        QuestionType::Single => match &question.choices {
            Some(choices) => json!({ "type": "string", "enum": choices }),
            None => json!({ "type": "string" }),
        },
        QuestionType::Multi => {
            let items = match &question.choices {
                Some(choices) => json!({ "type": "string", "enum": choices }),
                None => json!({ "type": "string" }),
            };
            json!({ "type": "array", "items": items })
        }
        QuestionType::Short | QuestionType::Long => match question.max_length {
            Some(max_length) => json!({ "type": "string", "maxLength": max_length }),
            None => json!({ "type": "string" }),
        },
        // Numeric answers ride as strings on the wire; file answers are
        // name placeholders.
        QuestionType::Number | QuestionType::File => json!({ "type": "string" }),
    }
}
