//! Invariant checks for the tutorial tree.
//!
//! Two families: structural checks that a loaded state must pass to be used at
//! all, and derivation checks reported for diagnostics only. Nothing here
//! repairs the tree.

use std::collections::HashSet;

use crate::core::state_update::derive_lesson_status;
use crate::tutorial::{Progress, State, Tutorial};

/// Derivation-rule violations within `tutorial`:
/// - a lesson's status must match its steps
/// - the tutorial's status must match its lessons
pub fn validate(tutorial: &Tutorial) -> Vec<String> {
    let mut errors = Vec::new();

    for lesson in &tutorial.lessons {
        let expected = derive_lesson_status(lesson);
        if lesson.status != expected {
            errors.push(format!(
                "{}/{}: lesson status is {} but steps imply {}",
                tutorial.name,
                lesson.name,
                u8::from(lesson.status),
                u8::from(expected)
            ));
        }
    }

    let all_completed = tutorial
        .lessons
        .iter()
        .all(|lesson| lesson.status == Progress::Completed);
    let any_started = tutorial
        .lessons
        .iter()
        .any(|lesson| lesson.status != Progress::NotStarted);
    let expected = if all_completed {
        Progress::Completed
    } else if any_started {
        Progress::InProgress
    } else {
        Progress::NotStarted
    };
    if tutorial.status != expected {
        errors.push(format!(
            "{}: tutorial status is {} but lessons imply {}",
            tutorial.name,
            u8::from(tutorial.status),
            u8::from(expected)
        ));
    }

    errors
}

/// Structural checks that JSON Schema cannot express:
/// - unique tutorial names, unique lesson names per tutorial, unique step names per lesson
/// - non-empty `current_tutorial` names an existing tutorial
/// - the state carries a user id
pub fn validate_structure(state: &State) -> Vec<String> {
    let mut errors = Vec::new();

    if state.user_id.trim().is_empty() {
        errors.push("userId must not be empty".to_string());
    }

    let mut tutorials = HashSet::new();
    for tutorial in &state.tutorials {
        if !tutorials.insert(tutorial.name.as_str()) {
            errors.push(format!("duplicate tutorial '{}'", tutorial.name));
        }
        let mut lessons = HashSet::new();
        for lesson in &tutorial.lessons {
            if !lessons.insert(lesson.name.as_str()) {
                errors.push(format!(
                    "{}: duplicate lesson '{}'",
                    tutorial.name, lesson.name
                ));
            }
            let mut steps = HashSet::new();
            for step in &lesson.steps {
                if !steps.insert(step.name.as_str()) {
                    errors.push(format!(
                        "{}/{}: duplicate step '{}'",
                        tutorial.name, lesson.name, step.name
                    ));
                }
            }
        }
    }

    if !state.current_tutorial.is_empty() && state.tutorial(&state.current_tutorial).is_none() {
        errors.push(format!(
            "currentTutorial '{}' does not name a tutorial",
            state.current_tutorial
        ));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{lesson, state_with, step, tutorial};

    #[test]
    fn consistent_tutorial_has_no_violations() {
        let t = tutorial(
            "t1",
            vec![
                lesson("l1", vec![step("a", 2), step("b", 1)]),
                lesson("l2", vec![step("c", 0)]),
            ],
        );
        assert!(validate(&t).is_empty());
    }

    #[test]
    fn validate_reports_drifted_statuses() {
        let mut t = tutorial("t1", vec![lesson("l1", vec![step("a", 2)])]);
        t.lessons[0].status = Progress::InProgress;
        t.status = Progress::NotStarted;

        let errors = validate(&t);
        assert_eq!(
            errors,
            vec![
                "t1/l1: lesson status is 1 but steps imply 2".to_string(),
                "t1: tutorial status is 0 but lessons imply 1".to_string(),
            ]
        );
        // Reporting never repairs.
        assert_eq!(t.lessons[0].status, Progress::InProgress);
    }

    #[test]
    fn validate_structure_reports_duplicates_and_dangling_pointer() {
        let mut state = state_with(vec![
            tutorial("dup", vec![lesson("l", vec![step("a", 0), step("a", 0)])]),
            tutorial("dup", vec![lesson("l", vec![step("a", 0)])]),
        ]);
        state.current_tutorial = "ghost".to_string();

        let errors = validate_structure(&state);
        assert!(errors.iter().any(|err| err.contains("duplicate tutorial 'dup'")));
        assert!(errors.iter().any(|err| err.contains("duplicate step 'a'")));
        assert!(errors.iter().any(|err| err.contains("currentTutorial 'ghost'")));
    }
}
