mod common;

use chrono::Utc;
use serde_json::json;

use hireflow_spec::{AnswerValue, Assessment, Question, QuestionType, ResponseDocument};

use common::sample_assessment;

#[test]
fn persisted_field_names_are_preserved() {
    let assessment = sample_assessment();
    let value = serde_json::to_value(&assessment).expect("serialize");

    assert_eq!(value["jobId"], "job-frontend-1");
    assert!(value["updatedAt"].is_string());
    let question = &value["sections"][0]["questions"][1];
    assert_eq!(question["type"], "short");
    assert_eq!(question["maxLength"], 120);
    assert_eq!(question["visibleIf"]["q1"], "Yes");
}

#[test]
fn type_tag_vocabulary_round_trips() {
    for (kind, tag) in [
        (QuestionType::Single, "single"),
        (QuestionType::Multi, "multi"),
        (QuestionType::Short, "short"),
        (QuestionType::Long, "long"),
        (QuestionType::Number, "number"),
        (QuestionType::File, "file"),
    ] {
        assert_eq!(serde_json::to_value(kind).unwrap(), json!(tag));
        assert_eq!(kind.as_str(), tag);
    }
}

#[test]
fn unknown_type_tag_is_rejected_at_the_boundary() {
    let result: Result<Question, _> = serde_json::from_value(json!({
        "id": "q1",
        "type": "rating",
        "label": "Rate us"
    }));
    assert!(result.is_err());
}

#[test]
fn optional_constraint_fields_are_omitted_when_absent() {
    let question = Question::new("q1", QuestionType::File, "Resume");
    let value = serde_json::to_value(&question).expect("serialize");
    let object = value.as_object().expect("object");

    assert!(!object.contains_key("choices"));
    assert!(!object.contains_key("min"));
    assert!(!object.contains_key("maxLength"));
    assert!(!object.contains_key("visibleIf"));
}

#[test]
fn missing_required_flag_defaults_to_false() {
    let question: Question = serde_json::from_value(json!({
        "id": "q1",
        "type": "short",
        "label": "Anything else?"
    }))
    .expect("deserialize");
    assert!(!question.required);
}

#[test]
fn answer_values_ride_as_strings_or_string_arrays() {
    let text: AnswerValue = serde_json::from_value(json!("42")).unwrap();
    assert_eq!(text, AnswerValue::text("42"));

    let selections: AnswerValue = serde_json::from_value(json!(["React", "Vue"])).unwrap();
    assert_eq!(selections, AnswerValue::selections(["React", "Vue"]));
}

#[test]
fn response_document_uses_the_submission_wire_shape() {
    let mut response = ResponseDocument {
        values: Default::default(),
        submitted_at: Utc::now(),
    };
    response
        .values
        .insert("q1".into(), AnswerValue::text("Yes"));

    let value = serde_json::to_value(&response).expect("serialize");
    assert_eq!(value["values"]["q1"], "Yes");
    assert!(value["submittedAt"].is_string());

    let bytes = response.to_cbor().expect("cbor encode");
    assert!(!bytes.is_empty());
}

#[test]
fn document_round_trip_is_lossless() {
    let assessment = sample_assessment();
    let text = serde_json::to_string(&assessment).expect("serialize");
    let reparsed: Assessment = serde_json::from_str(&text).expect("reparse");
    assert_eq!(reparsed, assessment);
}
