//! Progress transitions over the persisted aggregate.
//!
//! Every transition writes step statuses directly and then re-derives lesson
//! and tutorial statuses from their children, so derived statuses can never
//! drift from the steps they summarize.

use crate::error::{Result, TutorError};
use crate::tutorial::{Lesson, Progress, State, Tutorial};

/// Summary of a single step completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSummary {
    /// The step's lesson became completed by this transition.
    pub lesson_completed: bool,
    /// The step's tutorial became completed by this transition.
    pub tutorial_completed: bool,
}

/// Make `step` the current position and lift it out of not-started.
///
/// Completed steps stay completed; only the pointers move. This keeps
/// reported progress monotonic when revisiting a finished step.
pub fn update_progress(state: &mut State, tutorial: &str, lesson: &str, step: &str) -> Result<()> {
    let target = locate_mut(state, tutorial, lesson, step)?;
    let lesson_entry = target
        .lesson_mut(lesson)
        .ok_or_else(|| lesson_not_found(tutorial, lesson))?;
    let step_entry = lesson_entry
        .step_mut(step)
        .ok_or_else(|| step_not_found(lesson, step))?;
    if step_entry.status == Progress::NotStarted {
        step_entry.status = Progress::InProgress;
    }
    lesson_entry.current_step = step.to_string();
    target.current_lesson = lesson.to_string();
    derive_statuses(target);
    state.current_tutorial = tutorial.to_string();
    Ok(())
}

/// Mark `step` completed, re-derive statuses and advance the current pointers
/// to the first unfinished step (cleared once the tutorial is complete).
pub fn mark_completed(
    state: &mut State,
    tutorial: &str,
    lesson: &str,
    step: &str,
) -> Result<CompletionSummary> {
    let target = locate_mut(state, tutorial, lesson, step)?;
    let (lesson_before, tutorial_before) = {
        let lesson_entry = target
            .lesson(lesson)
            .ok_or_else(|| lesson_not_found(tutorial, lesson))?;
        (lesson_entry.status, target.status)
    };

    if let Some(step_entry) = target
        .lesson_mut(lesson)
        .and_then(|lesson_entry| lesson_entry.step_mut(step))
    {
        step_entry.status = Progress::Completed;
    }
    derive_statuses(target);
    advance_pointers(target);

    let lesson_after = target
        .lesson(lesson)
        .map(|lesson_entry| lesson_entry.status)
        .unwrap_or(lesson_before);
    Ok(CompletionSummary {
        lesson_completed: !lesson_before.is_completed() && lesson_after.is_completed(),
        tutorial_completed: !tutorial_before.is_completed() && target.status.is_completed(),
    })
}

/// Complete every step that precedes `step` in declared order.
///
/// Returns `lesson/step` paths of steps that changed, in declared order.
pub fn complete_steps_before(
    state: &mut State,
    tutorial: &str,
    lesson: &str,
    step: &str,
) -> Result<Vec<String>> {
    let target = locate_mut(state, tutorial, lesson, step)?;
    let mut completed = Vec::new();

    'lessons: for lesson_entry in &mut target.lessons {
        let is_target_lesson = lesson_entry.name == lesson;
        for step_entry in &mut lesson_entry.steps {
            if is_target_lesson && step_entry.name == step {
                break 'lessons;
            }
            if step_entry.status != Progress::Completed {
                step_entry.status = Progress::Completed;
                completed.push(format!("{}/{}", lesson_entry.name, step_entry.name));
            }
        }
    }

    derive_statuses(target);
    Ok(completed)
}

/// Return every node to not-started and clear all pointers.
///
/// The user id and the shape of the tree are left untouched.
pub fn reset_progress(state: &mut State) {
    for tutorial in &mut state.tutorials {
        tutorial.status = Progress::NotStarted;
        tutorial.current_lesson.clear();
        for lesson in &mut tutorial.lessons {
            lesson.status = Progress::NotStarted;
            lesson.current_step.clear();
            for step in &mut lesson.steps {
                step.status = Progress::NotStarted;
            }
        }
    }
    state.current_tutorial.clear();
}

/// Re-derive lesson and tutorial statuses from their steps.
pub fn derive_statuses(tutorial: &mut Tutorial) {
    for lesson in &mut tutorial.lessons {
        lesson.status = derive_lesson_status(lesson);
    }
    tutorial.status = combine(tutorial.lessons.iter().map(|lesson| lesson.status));
}

/// Completed iff every step is completed; in progress iff any step has begun.
pub fn derive_lesson_status(lesson: &Lesson) -> Progress {
    combine(lesson.steps.iter().map(|step| step.status))
}

/// Tutorial status derived from (already derived) lesson statuses.
pub fn derive_tutorial_status(tutorial: &Tutorial) -> Progress {
    combine(tutorial.lessons.iter().map(derive_lesson_status))
}

fn combine(children: impl Iterator<Item = Progress>) -> Progress {
    let mut all_completed = true;
    let mut any_started = false;
    for status in children {
        if status != Progress::Completed {
            all_completed = false;
        }
        if status != Progress::NotStarted {
            any_started = true;
        }
    }
    if all_completed {
        Progress::Completed
    } else if any_started {
        Progress::InProgress
    } else {
        Progress::NotStarted
    }
}

fn advance_pointers(tutorial: &mut Tutorial) {
    let next = tutorial.lessons.iter().enumerate().find_map(|(index, lesson)| {
        lesson
            .steps
            .iter()
            .find(|step| !step.status.is_completed())
            .map(|step| (index, step.name.clone()))
    });

    match next {
        Some((index, step_name)) => {
            tutorial.current_lesson = tutorial.lessons[index].name.clone();
            tutorial.lessons[index].current_step = step_name;
        }
        None => {
            tutorial.current_lesson.clear();
            for lesson in &mut tutorial.lessons {
                lesson.current_step.clear();
            }
        }
    }
}

/// Resolve all three names, reporting the first level that does not resolve.
fn locate_mut<'a>(
    state: &'a mut State,
    tutorial: &str,
    lesson: &str,
    step: &str,
) -> Result<&'a mut Tutorial> {
    let target = state
        .tutorial_mut(tutorial)
        .ok_or_else(|| TutorError::TutorialNotFound {
            name: tutorial.to_string(),
        })?;
    let lesson_entry = target
        .lesson(lesson)
        .ok_or_else(|| lesson_not_found(tutorial, lesson))?;
    if lesson_entry.step(step).is_none() {
        return Err(step_not_found(lesson, step));
    }
    Ok(target)
}

fn lesson_not_found(tutorial: &str, lesson: &str) -> TutorError {
    TutorError::LessonNotFound {
        tutorial: tutorial.to_string(),
        lesson: lesson.to_string(),
    }
}

fn step_not_found(lesson: &str, step: &str) -> TutorError {
    TutorError::StepNotFound {
        lesson: lesson.to_string(),
        step: step.to_string(),
    }
}
