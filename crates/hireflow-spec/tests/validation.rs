mod common;

use std::collections::BTreeSet;

use hireflow_spec::{
    first_invalid, is_clean, resolve_visibility, validate, AnswerMap, AnswerValue,
};

use common::sample_assessment;

fn touched(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[test]
fn untouched_questions_are_never_invalid() {
    let assessment = sample_assessment();
    let answers = AnswerMap::new();
    let visibility = resolve_visibility(&assessment, &answers);

    let validation = validate(&assessment, &visibility, &answers, &BTreeSet::new());
    assert!(is_clean(&validation));
}

#[test]
fn touched_required_question_with_empty_answer_is_invalid() {
    let assessment = sample_assessment();
    let answers = AnswerMap::new();
    let visibility = resolve_visibility(&assessment, &answers);

    let validation = validate(&assessment, &visibility, &answers, &touched(&["q1"]));
    assert_eq!(validation.get("q1"), Some(&true));
}

#[test]
fn empty_string_counts_as_empty_for_required() {
    let assessment = sample_assessment();
    let mut answers = AnswerMap::new();
    answers.insert("q1".into(), AnswerValue::text(""));
    let visibility = resolve_visibility(&assessment, &answers);

    let validation = validate(&assessment, &visibility, &answers, &touched(&["q1"]));
    assert_eq!(validation.get("q1"), Some(&true));
}

#[test]
fn required_multi_choice_needs_at_least_one_selection() {
    let mut assessment = sample_assessment();
    assessment.sections[1].questions[0].required = true;

    let mut answers = AnswerMap::new();
    answers.insert("q4".into(), AnswerValue::Selections(Vec::new()));
    let visibility = resolve_visibility(&assessment, &answers);

    let validation = validate(&assessment, &visibility, &answers, &touched(&["q4"]));
    assert_eq!(validation.get("q4"), Some(&true));

    answers.insert("q4".into(), AnswerValue::selections(["Vue"]));
    let validation = validate(&assessment, &visibility, &answers, &touched(&["q4"]));
    assert_eq!(validation.get("q4"), Some(&false));
}

#[test]
fn hidden_questions_are_never_invalid() {
    let assessment = sample_assessment();
    let answers = AnswerMap::new();
    let visibility = resolve_visibility(&assessment, &answers);

    // q2 is required but hidden while q1 is unanswered.
    let validation = validate(&assessment, &visibility, &answers, &touched(&["q2"]));
    assert_eq!(validation.get("q2"), Some(&false));
}

#[test]
fn numeric_bounds_are_inclusive() {
    let assessment = sample_assessment();
    let visibility = resolve_visibility(&assessment, &AnswerMap::new());
    let marked = touched(&["q3"]);

    for (raw, expected_invalid) in [("0", false), ("100", false), ("-1", true), ("101", true)] {
        let mut answers = AnswerMap::new();
        answers.insert("q3".into(), AnswerValue::text(raw));
        let validation = validate(&assessment, &visibility, &answers, &marked);
        assert_eq!(
            validation.get("q3"),
            Some(&expected_invalid),
            "value {raw} should report invalid={expected_invalid}"
        );
    }
}

#[test]
fn empty_non_required_field_skips_range_and_length_checks() {
    let assessment = sample_assessment();
    let visibility = resolve_visibility(&assessment, &AnswerMap::new());

    let mut answers = AnswerMap::new();
    answers.insert("q3".into(), AnswerValue::text(""));
    let validation = validate(&assessment, &visibility, &answers, &touched(&["q3"]));
    assert_eq!(validation.get("q3"), Some(&false));
}

#[test]
fn unparseable_numeric_answer_is_left_to_the_required_check() {
    let assessment = sample_assessment();
    let visibility = resolve_visibility(&assessment, &AnswerMap::new());

    let mut answers = AnswerMap::new();
    answers.insert("q3".into(), AnswerValue::text("lots"));
    let validation = validate(&assessment, &visibility, &answers, &touched(&["q3"]));
    assert_eq!(validation.get("q3"), Some(&false));
}

#[test]
fn text_answers_longer_than_max_length_are_invalid() {
    let assessment = sample_assessment();

    let mut answers = AnswerMap::new();
    answers.insert("q1".into(), AnswerValue::text("Yes"));
    answers.insert("q2".into(), AnswerValue::text("x".repeat(121)));
    let visibility = resolve_visibility(&assessment, &answers);

    let validation = validate(&assessment, &visibility, &answers, &touched(&["q2"]));
    assert_eq!(validation.get("q2"), Some(&true));

    answers.insert("q2".into(), AnswerValue::text("x".repeat(120)));
    let validation = validate(&assessment, &visibility, &answers, &touched(&["q2"]));
    assert_eq!(validation.get("q2"), Some(&false));
}

#[test]
fn required_and_filled_number_still_checks_range() {
    let mut assessment = sample_assessment();
    assessment.sections[0].questions[2].required = true;

    let mut answers = AnswerMap::new();
    answers.insert("q3".into(), AnswerValue::text("250"));
    let visibility = resolve_visibility(&assessment, &answers);

    let validation = validate(&assessment, &visibility, &answers, &touched(&["q3"]));
    assert_eq!(validation.get("q3"), Some(&true));
}

#[test]
fn first_invalid_follows_document_order() {
    let assessment = sample_assessment();
    let answers = AnswerMap::new();
    let visibility = resolve_visibility(&assessment, &answers);

    let marked = touched(&["q1", "q6"]);
    let validation = validate(&assessment, &visibility, &answers, &marked);
    assert_eq!(first_invalid(&assessment, &validation), Some("q1"));

    let marked = touched(&["q6"]);
    let validation = validate(&assessment, &visibility, &answers, &marked);
    assert_eq!(first_invalid(&assessment, &validation), Some("q6"));
}

#[test]
fn evaluation_is_idempotent() {
    let assessment = sample_assessment();
    let mut answers = AnswerMap::new();
    answers.insert("q3".into(), AnswerValue::text("42"));
    let visibility = resolve_visibility(&assessment, &answers);
    let marked = touched(&["q1", "q3"]);

    let first = validate(&assessment, &visibility, &answers, &marked);
    let second = validate(&assessment, &visibility, &answers, &marked);
    assert_eq!(first, second);
}
