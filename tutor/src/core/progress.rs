//! Progress metrics over the tutorial tree.

use crate::core::state_update::{derive_lesson_status, derive_tutorial_status};
use crate::tutorial::{Lesson, Progress, State, Step, Tutorial};

/// Step and lesson counts for a single tutorial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TutorialStats {
    pub total_steps: usize,
    pub completed_steps: usize,
    pub in_progress_steps: usize,
    pub not_started_steps: usize,
    pub total_lessons: usize,
    pub completed_lessons: usize,
    pub percent: u8,
}

/// Aggregate counts across every tutorial in the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverallStats {
    pub total_tutorials: usize,
    pub completed_tutorials: usize,
    pub in_progress_tutorials: usize,
    pub not_started_tutorials: usize,
    pub total_lessons: usize,
    pub completed_lessons: usize,
    pub total_steps: usize,
    pub completed_steps: usize,
    pub percent: u8,
}

impl OverallStats {
    pub fn has_progress(&self) -> bool {
        self.completed_tutorials > 0 || self.in_progress_tutorials > 0
    }
}

/// `round(100 * completed / total)`, `0` for an empty tree.
pub fn percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (completed as f64 * 100.0 / total as f64).round() as u8
}

pub fn tutorial_percent(tutorial: &Tutorial) -> u8 {
    percent(completed_steps(tutorial), total_steps(tutorial))
}

pub fn overall_percent(state: &State) -> u8 {
    let total: usize = state.tutorials.iter().map(total_steps).sum();
    let completed: usize = state.tutorials.iter().map(completed_steps).sum();
    percent(completed, total)
}

pub fn total_steps(tutorial: &Tutorial) -> usize {
    tutorial.lessons.iter().map(|lesson| lesson.steps.len()).sum()
}

pub fn completed_steps(tutorial: &Tutorial) -> usize {
    count_steps(tutorial, Progress::Completed)
}

pub fn is_step_complete(step: &Step) -> bool {
    step.status.is_completed()
}

pub fn is_lesson_complete(lesson: &Lesson) -> bool {
    derive_lesson_status(lesson).is_completed()
}

pub fn is_tutorial_complete(tutorial: &Tutorial) -> bool {
    derive_tutorial_status(tutorial).is_completed()
}

pub fn tutorial_stats(tutorial: &Tutorial) -> TutorialStats {
    let total_steps = total_steps(tutorial);
    let completed_steps = completed_steps(tutorial);
    let in_progress_steps = count_steps(tutorial, Progress::InProgress);
    TutorialStats {
        total_steps,
        completed_steps,
        in_progress_steps,
        not_started_steps: total_steps - completed_steps - in_progress_steps,
        total_lessons: tutorial.lessons.len(),
        completed_lessons: tutorial
            .lessons
            .iter()
            .filter(|lesson| is_lesson_complete(lesson))
            .count(),
        percent: percent(completed_steps, total_steps),
    }
}

pub fn overall_stats(state: &State) -> OverallStats {
    let mut stats = OverallStats {
        total_tutorials: state.tutorials.len(),
        ..OverallStats::default()
    };
    for tutorial in &state.tutorials {
        match derive_tutorial_status(tutorial) {
            Progress::Completed => stats.completed_tutorials += 1,
            Progress::InProgress => stats.in_progress_tutorials += 1,
            Progress::NotStarted => stats.not_started_tutorials += 1,
        }
        let per_tutorial = tutorial_stats(tutorial);
        stats.total_lessons += per_tutorial.total_lessons;
        stats.completed_lessons += per_tutorial.completed_lessons;
        stats.total_steps += per_tutorial.total_steps;
        stats.completed_steps += per_tutorial.completed_steps;
    }
    stats.percent = percent(stats.completed_steps, stats.total_steps);
    stats
}

fn count_steps(tutorial: &Tutorial, status: Progress) -> usize {
    tutorial.steps().filter(|step| step.status == status).count()
}
