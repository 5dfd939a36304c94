mod common;

use std::collections::BTreeSet;

use hireflow_spec::{build_preview_payload, render_json_ui, render_text, AnswerMap, AnswerValue};

use common::sample_assessment;

#[test]
fn preview_reflects_visibility_of_the_current_answers() {
    let assessment = sample_assessment();
    let mut answers = AnswerMap::new();
    answers.insert("q1".into(), AnswerValue::text("Yes"));

    let payload = build_preview_payload(&assessment, &answers, &BTreeSet::new());
    let screening = &payload.sections[0];
    assert_eq!(screening.title, "Screening");
    assert!(screening.questions[1].visible, "q2 unlocked by q1 == Yes");

    let background = &payload.sections[1];
    assert!(!background.questions[1].visible, "q5 still gated on q4");
}

#[test]
fn progress_counts_visible_questions_only() {
    let assessment = sample_assessment();
    let mut answers = AnswerMap::new();
    answers.insert("q1".into(), AnswerValue::text("No"));
    answers.insert("q4".into(), AnswerValue::selections(["Vue"]));

    let payload = build_preview_payload(&assessment, &answers, &BTreeSet::new());
    // Visible: q1, q3, q4, q6. Answered among them: q1, q4.
    assert_eq!(payload.progress.total, 4);
    assert_eq!(payload.progress.answered, 2);
}

#[test]
fn preview_marks_invalid_touched_fields() {
    let assessment = sample_assessment();
    let answers = AnswerMap::new();
    let touched: BTreeSet<String> = ["q1".to_string()].into();

    let payload = build_preview_payload(&assessment, &answers, &touched);
    assert!(payload.sections[0].questions[0].invalid);
    assert!(!payload.sections[1].questions[2].invalid, "q6 untouched");
}

#[test]
fn render_text_lists_sections_and_flags() {
    let assessment = sample_assessment();
    let mut answers = AnswerMap::new();
    answers.insert("q1".into(), AnswerValue::text("No"));

    let payload = build_preview_payload(&assessment, &answers, &BTreeSet::new());
    let text = render_text(&payload);
    assert!(text.contains("Assessment for job: job-frontend-1"));
    assert!(text.contains("Section: Screening (s1)"));
    assert!(text.contains("[required]"));
    assert!(text.contains("[hidden]"));
    assert!(text.contains("= No"));
}

#[test]
fn render_json_ui_exposes_structure() {
    let assessment = sample_assessment();
    let mut answers = AnswerMap::new();
    answers.insert("q4".into(), AnswerValue::selections(["React", "Vue"]));

    let payload = build_preview_payload(&assessment, &answers, &BTreeSet::new());
    let ui = render_json_ui(&payload);

    assert_eq!(ui["job_id"], "job-frontend-1");
    assert_eq!(ui["progress"]["total"], 5);
    let sections = ui["sections"].as_array().expect("sections array");
    assert_eq!(sections.len(), 2);
    let questions = sections[1]["questions"].as_array().expect("questions");
    assert_eq!(questions[0]["type"], "multi");
    assert_eq!(questions[0]["current_value"], serde_json::json!(["React", "Vue"]));
    assert_eq!(questions[1]["visible"], true);
}

#[test]
fn schema_covers_visible_questions_only() {
    let assessment = sample_assessment();
    let payload = build_preview_payload(&assessment, &AnswerMap::new(), &BTreeSet::new());

    let properties = payload.schema["properties"].as_object().expect("properties");
    assert!(properties.contains_key("q1"));
    assert!(!properties.contains_key("q2"), "hidden questions are omitted");
    assert_eq!(properties["q1"]["enum"], serde_json::json!(["Yes", "No"]));
    assert_eq!(properties["q4"]["type"], "array");
    assert_eq!(properties["q3"]["type"], "string");

    let required = payload.schema["required"].as_array().expect("required");
    assert!(required.iter().any(|value| value == "q1"));
    assert!(required.iter().any(|value| value == "q6"));
    assert!(!required.iter().any(|value| value == "q2"));
}
