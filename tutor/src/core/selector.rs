//! Position resolution within a tutorial.
//!
//! Lookups return `None` when nothing resolves; callers decide how to report it.

use crate::tutorial::{Lesson, Progress, Step, Tutorial};

/// A step together with its lesson and 0-based indices in declared order.
#[derive(Debug, Clone, Copy)]
pub struct StepRef<'a> {
    pub lesson: &'a Lesson,
    pub step: &'a Step,
    pub lesson_index: usize,
    pub step_index: usize,
}

impl StepRef<'_> {
    /// 1-based position of the step within its lesson.
    pub fn number_in_lesson(&self) -> usize {
        self.step_index + 1
    }

    pub fn is_last_in_lesson(&self) -> bool {
        self.step_index + 1 == self.lesson.steps.len()
    }

    pub fn is_last_lesson(&self, tutorial: &Tutorial) -> bool {
        self.lesson_index + 1 == tutorial.lessons.len()
    }

    /// 1-based position of the step across the whole tutorial.
    pub fn number_in_tutorial(&self, tutorial: &Tutorial) -> usize {
        let before: usize = tutorial.lessons[..self.lesson_index]
            .iter()
            .map(|lesson| lesson.steps.len())
            .sum();
        before + self.step_index + 1
    }
}

/// Resolve a `(lesson, step)` pair by name.
pub fn locate<'a>(tutorial: &'a Tutorial, lesson: &str, step: &str) -> Option<StepRef<'a>> {
    let lesson_index = tutorial.lessons.iter().position(|l| l.name == lesson)?;
    let lesson_entry = &tutorial.lessons[lesson_index];
    let step_index = lesson_entry.steps.iter().position(|s| s.name == step)?;
    Some(StepRef {
        lesson: lesson_entry,
        step: &lesson_entry.steps[step_index],
        lesson_index,
        step_index,
    })
}

/// First step of the named lesson, or of the first lesson when `lesson` is `None`.
pub fn first_step<'a>(tutorial: &'a Tutorial, lesson: Option<&str>) -> Option<StepRef<'a>> {
    let lesson_index = match lesson {
        Some(name) => tutorial.lessons.iter().position(|l| l.name == name)?,
        None => 0,
    };
    let lesson_entry = tutorial.lessons.get(lesson_index)?;
    let step = lesson_entry.steps.first()?;
    Some(StepRef {
        lesson: lesson_entry,
        step,
        lesson_index,
        step_index: 0,
    })
}

/// First in-progress step in declared order, else the first not-started step.
pub fn next_step(tutorial: &Tutorial) -> Option<StepRef<'_>> {
    find_step(tutorial, |step| step.status == Progress::InProgress)
        .or_else(|| find_step(tutorial, |step| step.status == Progress::NotStarted))
}

/// First lesson that is not completed.
pub fn next_lesson(tutorial: &Tutorial) -> Option<&Lesson> {
    tutorial
        .lessons
        .iter()
        .find(|lesson| !lesson.status.is_completed())
}

/// Resolve the current lesson pointer, falling back when it is stale.
pub fn current_lesson(tutorial: &Tutorial) -> Option<&Lesson> {
    tutorial
        .lesson(&tutorial.current_lesson)
        .filter(|lesson| !lesson.status.is_completed())
        .or_else(|| next_lesson(tutorial))
}

/// Resolve the current step pointers, falling back to [`next_step`] when the
/// pointers are empty, dangling or name an already completed node.
pub fn current_step(tutorial: &Tutorial) -> Option<StepRef<'_>> {
    tutorial
        .lesson(&tutorial.current_lesson)
        .and_then(|lesson| locate(tutorial, &lesson.name, &lesson.current_step))
        .filter(|found| !found.step.status.is_completed())
        .or_else(|| next_step(tutorial))
}

/// The step after `(lesson, step)`: the next one in the same lesson, else the
/// first step of the following lesson, else `None`.
pub fn step_after_completion<'a>(
    tutorial: &'a Tutorial,
    lesson: &str,
    step: &str,
) -> Option<StepRef<'a>> {
    let current = locate(tutorial, lesson, step)?;
    if let Some(next) = current.lesson.steps.get(current.step_index + 1) {
        return Some(StepRef {
            lesson: current.lesson,
            step: next,
            lesson_index: current.lesson_index,
            step_index: current.step_index + 1,
        });
    }
    let lesson_index = current.lesson_index + 1;
    let next_lesson = tutorial.lessons.get(lesson_index)?;
    let step = next_lesson.steps.first()?;
    Some(StepRef {
        lesson: next_lesson,
        step,
        lesson_index,
        step_index: 0,
    })
}

/// Walk forward from `(lesson, step)` to the first step that is not completed.
pub fn next_unfinished_after<'a>(
    tutorial: &'a Tutorial,
    lesson: &str,
    step: &str,
) -> Option<StepRef<'a>> {
    let mut candidate = step_after_completion(tutorial, lesson, step)?;
    while candidate.step.status.is_completed() {
        candidate =
            step_after_completion(tutorial, &candidate.lesson.name, &candidate.step.name)?;
    }
    Some(candidate)
}

fn find_step(tutorial: &Tutorial, predicate: impl Fn(&Step) -> bool) -> Option<StepRef<'_>> {
    tutorial
        .lessons
        .iter()
        .enumerate()
        .find_map(|(lesson_index, lesson)| {
            lesson
                .steps
                .iter()
                .position(&predicate)
                .map(|step_index| StepRef {
                    lesson,
                    step: &lesson.steps[step_index],
                    lesson_index,
                    step_index,
                })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{lesson, step, tutorial};

    fn sample(statuses: [u8; 4]) -> Tutorial {
        tutorial(
            "t1",
            vec![
                lesson("l1", vec![step("a1", statuses[0]), step("b1", statuses[1])]),
                lesson("l2", vec![step("a2", statuses[2]), step("b2", statuses[3])]),
            ],
        )
    }

    fn names(found: Option<StepRef<'_>>) -> Option<(String, String)> {
        found.map(|s| (s.lesson.name.clone(), s.step.name.clone()))
    }

    fn pair(lesson: &str, step: &str) -> Option<(String, String)> {
        Some((lesson.to_string(), step.to_string()))
    }

    #[test]
    fn next_step_prefers_in_progress_over_not_started() {
        let t = sample([0, 0, 1, 0]);
        assert_eq!(names(next_step(&t)), pair("l2", "a2"));
        let t = sample([2, 0, 0, 0]);
        assert_eq!(names(next_step(&t)), pair("l1", "b1"));
        let t = sample([2, 2, 2, 2]);
        assert!(next_step(&t).is_none());
    }

    #[test]
    fn step_after_completion_crosses_lessons() {
        let t = sample([0; 4]);
        assert_eq!(names(step_after_completion(&t, "l1", "a1")), pair("l1", "b1"));
        assert_eq!(names(step_after_completion(&t, "l1", "b1")), pair("l2", "a2"));
        assert!(step_after_completion(&t, "l2", "b2").is_none());
        assert!(step_after_completion(&t, "l9", "a1").is_none());
    }

    /// A pointer at a completed step is stale and falls back to the next unfinished step.
    #[test]
    fn current_step_falls_back_when_pointer_is_stale() {
        let mut t = sample([2, 0, 0, 0]);
        t.current_lesson = "l1".to_string();
        t.lessons[0].current_step = "a1".to_string();
        assert_eq!(names(current_step(&t)), pair("l1", "b1"));

        t.lessons[0].current_step = "missing".to_string();
        assert_eq!(names(current_step(&t)), pair("l1", "b1"));
    }

    #[test]
    fn current_step_uses_live_pointer() {
        let mut t = sample([2, 0, 0, 0]);
        t.current_lesson = "l2".to_string();
        t.lessons[1].current_step = "b2".to_string();
        assert_eq!(names(current_step(&t)), pair("l2", "b2"));
    }

    #[test]
    fn current_step_handles_empty_pointers() {
        let t = sample([0; 4]);
        assert_eq!(names(current_step(&t)), pair("l1", "a1"));
    }

    #[test]
    fn current_lesson_skips_completed_pointer() {
        let mut t = sample([2, 2, 0, 0]);
        t.lessons[0].status = Progress::Completed;
        t.current_lesson = "l1".to_string();
        assert_eq!(current_lesson(&t).map(|l| l.name.as_str()), Some("l2"));
    }

    #[test]
    fn next_unfinished_after_skips_completed_steps() {
        let t = sample([1, 2, 2, 0]);
        assert_eq!(names(next_unfinished_after(&t, "l1", "a1")), pair("l2", "b2"));
        let t = sample([1, 2, 2, 2]);
        assert!(next_unfinished_after(&t, "l1", "a1").is_none());
    }

    #[test]
    fn positions_are_one_based() {
        let t = sample([0; 4]);
        let found = locate(&t, "l2", "b2").expect("locate");
        assert_eq!(found.number_in_lesson(), 2);
        assert_eq!(found.number_in_tutorial(&t), 4);
        assert!(found.is_last_in_lesson());
        assert!(found.is_last_lesson(&t));
        let first = first_step(&t, Some("l2")).expect("first");
        assert_eq!(first.step.name, "a2");
        assert!(first_step(&t, Some("nope")).is_none());
    }
}
