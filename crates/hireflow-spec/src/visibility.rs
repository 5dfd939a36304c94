use crate::answers::AnswerMap;
use crate::spec::Assessment;

pub type VisibilityMap = std::collections::BTreeMap<String, bool>;

/// Computes the visible flag for every question in the document.
///
/// A question without a predicate is always visible. Otherwise the
/// predicate is a conjunction: every (dependency id, expected value)
/// pair must hold. A dependency whose answer is missing, or that names
/// no existing question, fails its pair rather than raising an error.
pub fn resolve_visibility(assessment: &Assessment, answers: &AnswerMap) -> VisibilityMap {
    let mut map = VisibilityMap::new();

    for section in &assessment.sections {
        for question in &section.questions {
            let visible = match &question.visible_if {
                None => true,
                Some(predicate) => predicate.iter().all(|(dependency, expected)| {
                    answers
                        .get(dependency)
                        .is_some_and(|answer| answer.matches(expected))
                }),
            };
            map.insert(question.id.clone(), visible);
        }
    }

    map
}
