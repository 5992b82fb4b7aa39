//! User-facing text for every engine outcome.
//!
//! Formatting only reads already computed values; it never resolves positions
//! on its own beyond what [`crate::core::selector`] provides.

use crate::core::progress::{self, OverallStats};
use crate::core::selector::{self, StepRef};
use crate::tutorial::{Progress, State, Tutorial};

pub fn status_marker(status: Progress) -> &'static str {
    match status {
        Progress::NotStarted => "⬜",
        Progress::InProgress => "🔶",
        Progress::Completed => "✅",
    }
}

/// `Completed`, `Not started` or `c/t steps`.
pub fn progress_display(tutorial: &Tutorial) -> String {
    match tutorial.status {
        Progress::Completed => Progress::Completed.label().to_string(),
        Progress::NotStarted => Progress::NotStarted.label().to_string(),
        Progress::InProgress => format!(
            "{}/{} steps",
            progress::completed_steps(tutorial),
            progress::total_steps(tutorial)
        ),
    }
}

/// Numbered list, one tutorial per line, in catalog order.
pub fn tutorial_list(tutorials: &[Tutorial]) -> String {
    tutorials
        .iter()
        .enumerate()
        .map(|(index, tutorial)| {
            format!(
                "{}. {} {} ({}) - {}",
                index + 1,
                status_marker(tutorial.status),
                tutorial.title,
                tutorial.difficulty.as_str(),
                progress_display(tutorial)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Listing shown by `start` without a tutorial name.
pub fn welcome(state: &State) -> String {
    if state.tutorials.is_empty() {
        return "📚 No tutorials available. Please check your tutorial directory.".to_string();
    }
    let returning = state
        .tutorials
        .iter()
        .any(|tutorial| tutorial.status != Progress::NotStarted);
    if returning {
        format!(
            "🎓 Welcome back to the tutorials!\n\n{}\n\nWhich tutorial would you like to start or continue? Just tell me the name or number.",
            tutorial_list(&state.tutorials)
        )
    } else {
        format!(
            "🎓 Welcome to the tutorials!\n\n📚 Available Tutorials:\n\n{}\n\nWhich tutorial would you like to start? Just tell me the name or number.",
            tutorial_list(&state.tutorials)
        )
    }
}

pub fn tutorial_not_found(requested: &str, available: &[String]) -> String {
    format!(
        "❌ Tutorial \"{requested}\" not found.\n\n📚 Available tutorials:\n{}\n\nTry again with one of the available tutorial names.",
        bullet_list(available)
    )
}

pub fn lesson_not_found(tutorial: &Tutorial, requested: &str) -> String {
    format!(
        "❌ Lesson '{requested}' not found in tutorial '{}'.\n\nAvailable lessons:\n{}",
        tutorial.title,
        bullet_list(&tutorial.lesson_names())
    )
}

pub fn step_not_found(lesson_title: &str, requested: &str, available: &[String]) -> String {
    format!(
        "❌ Step '{requested}' not found in lesson '{lesson_title}'.\n\nAvailable steps:\n{}",
        bullet_list(available)
    )
}

/// A declared step whose markdown file is missing; state is left untouched.
pub fn content_not_found(found: &StepRef<'_>, tutorial: &Tutorial) -> String {
    let others: Vec<String> = found
        .lesson
        .steps
        .iter()
        .filter(|step| step.name != found.step.name)
        .map(|step| step.name.clone())
        .collect();
    let mut text = format!(
        "❌ Content for step '{}' in lesson '{}' of '{}' was not found.",
        found.step.name, found.lesson.name, tutorial.title
    );
    if !others.is_empty() {
        text.push_str(&format!(
            "\n\nNearest valid steps in this lesson:\n{}",
            bullet_list(&others)
        ));
    }
    text.push_str(&format!(
        "\n\nLessons in this tutorial:\n{}",
        bullet_list(&tutorial.lesson_names())
    ));
    text
}

pub fn no_state() -> String {
    "❌ No tutorial state found. Please start a tutorial first.".to_string()
}

pub fn no_active_tutorial() -> String {
    "❌ No tutorial currently active. Please start a tutorial first.".to_string()
}

pub fn already_complete(tutorial: &Tutorial) -> String {
    format!(
        "✅ Tutorial \"{}\" is already complete!\n\n🏆 You've mastered this tutorial. Would you like to:\n- Start a different tutorial\n- Reset your progress\n- Jump back to review specific steps\n\nJust let me know what you'd like to do!",
        tutorial.title
    )
}

/// Start or resume banner, chosen from the status before the call.
pub fn start_banner(tutorial: &Tutorial, status_before: Progress) -> String {
    if status_before == Progress::NotStarted {
        format!("🎓 Starting \"{}\" tutorial!", tutorial.title)
    } else {
        format!("🎓 Resuming \"{}\" tutorial...", tutorial.title)
    }
}

pub fn step_completion(completed_title: &str, tutorial: &Tutorial, next: &StepRef<'_>) -> String {
    format!(
        "🎉 Great job completing \"{completed_title}\"!\n\n📘 Continuing: {}\n📝 Next Step: {} ({}/{})",
        tutorial.title,
        next.step.title,
        next.number_in_lesson(),
        next.lesson.steps.len()
    )
}

pub fn lesson_completion(lesson_title: &str, tutorial: &Tutorial) -> String {
    format!(
        "🎉 Lesson Complete! You've finished \"{lesson_title}\" in {}.\n\n📚 Moving to the next lesson...",
        tutorial.title
    )
}

pub fn tutorial_completion(tutorial: &Tutorial) -> String {
    format!(
        "🎉 Congratulations! You've completed \"{}\"!\n\n🏆 Tutorial Complete! You've worked through every step.\n\nReady for another one? Ask me to \"start a tutorial\" to see the available options.",
        tutorial.title
    )
}

pub fn jump_context(tutorial: &Tutorial, target: &StepRef<'_>) -> String {
    format!(
        "🎯 Jumped to: {}\n📘 Lesson {}: {}\n📝 Step {}/{}: {}\n📊 Tutorial Progress: {}% ({}/{} steps)",
        tutorial.title,
        target.lesson_index + 1,
        target.lesson.title,
        target.number_in_lesson(),
        target.lesson.steps.len(),
        target.step.title,
        progress::tutorial_percent(tutorial),
        target.number_in_tutorial(tutorial),
        progress::total_steps(tutorial)
    )
}

/// Read-only overview: position, all tutorials, statistics and suggestions.
pub fn status_overview(state: &State) -> String {
    let stats = progress::overall_stats(state);
    let mut text = String::from("📊 Tutorial Progress\n\n");

    match state.active_tutorial() {
        Some(tutorial) => {
            let position = selector::current_step(tutorial);
            let step_line = match &position {
                Some(found) => format!(
                    "📝 Step: {} (step {} of {})",
                    found.step.title,
                    found.number_in_tutorial(tutorial),
                    progress::total_steps(tutorial)
                ),
                None => "📝 Step: None (all steps completed)".to_string(),
            };
            text.push_str(&format!(
                "🎯 Current: {}\n{step_line}\n📈 Progress: {}% complete\n\n",
                tutorial.title,
                progress::tutorial_percent(tutorial)
            ));
        }
        None => text.push_str("No tutorial currently active.\n\n"),
    }

    text.push_str(&format!(
        "📚 All Tutorials:\n{}\n\n",
        tutorial_list(&state.tutorials)
    ));
    text.push_str(&statistics(&stats));
    text.push_str("\n\n");

    let suggestion = match state.active_tutorial() {
        Some(tutorial) if !tutorial.status.is_completed() => {
            "Ready to continue? Ask me to \"move to the next step\""
        }
        _ => "Ready to start? Ask me to \"start a tutorial\"",
    };
    text.push_str(suggestion);
    text
}

/// Non-destructive preview returned by `reset` without confirmation.
pub fn reset_preview(state: &State) -> String {
    let stats = progress::overall_stats(state);
    let mut text = String::from("⚠️ Reset All Tutorial Progress\n\n");
    if !stats.has_progress() {
        text.push_str(
            "📚 You don't have any tutorial progress to reset.\n\nAll tutorials are currently marked as \"Not started\".",
        );
        return text;
    }

    text.push_str(&format!(
        "📊 Current Progress Summary:\n• Total Tutorials: {}\n• Completed: {}\n• In Progress: {}\n• Not Started: {}\n• Overall Progress: {}%\n\n",
        stats.total_tutorials,
        stats.completed_tutorials,
        stats.in_progress_tutorials,
        stats.not_started_tutorials,
        stats.percent
    ));
    text.push_str("📚 Tutorial Details:\n");
    for tutorial in &state.tutorials {
        let per_tutorial = progress::tutorial_stats(tutorial);
        text.push_str(&format!(
            "{} {}: {}% ({}/{} steps)\n",
            status_marker(tutorial.status),
            tutorial.title,
            per_tutorial.percent,
            per_tutorial.completed_steps,
            per_tutorial.total_steps
        ));
    }
    text.push_str(
        "\n⚠️ WARNING: Resetting will:\n• Return every tutorial to \"Not started\"\n• Clear all step completion history\n• Remove the current tutorial position\n• This CANNOT be undone\n\n🔄 To proceed, call reset again with confirm set to true.\n\n❌ To cancel, do nothing.",
    );
    text
}

/// Summary after a confirmed reset, built from statistics taken before it.
pub fn reset_complete(before: &OverallStats) -> String {
    format!(
        "✅ Tutorial progress has been reset successfully!\n\n📊 Previous Progress (now cleared):\n• Completed Tutorials: {}\n• In Progress Tutorials: {}\n• Overall Progress: {}%\n\n🎓 Fresh Start:\n• All {} tutorials are now marked as \"Not started\"\n• All step completion history has been cleared\n• No current tutorial is active\n\n🚀 Ask me to \"start a tutorial\" to begin again.",
        before.completed_tutorials, before.in_progress_tutorials, before.percent, before.total_tutorials
    )
}

pub fn nothing_to_reset() -> String {
    "📚 No progress found to reset. All tutorials are already marked as \"Not started\".".to_string()
}

pub fn error(err: &impl std::fmt::Display) -> String {
    format!("❌ {err}")
}

fn statistics(stats: &OverallStats) -> String {
    format!(
        "📈 Statistics:\n• Tutorials: {} completed, {} in progress, {} not started\n• Lessons: {}/{} completed\n• Steps: {}/{} completed ({}%)",
        stats.completed_tutorials,
        stats.in_progress_tutorials,
        stats.not_started_tutorials,
        stats.completed_lessons,
        stats.total_lessons,
        stats.completed_steps,
        stats.total_steps,
        stats.percent
    )
}

fn bullet_list(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("- {name}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{lesson, state_with, step, tutorial};

    #[test]
    fn tutorial_list_shows_marker_difficulty_and_progress() {
        let tutorials = vec![
            tutorial("a", vec![lesson("l", vec![step("s", 2)])]),
            tutorial("b", vec![lesson("l", vec![step("s", 2), step("t", 0)])]),
            tutorial("c", vec![lesson("l", vec![step("s", 0)])]),
        ];
        assert_eq!(
            tutorial_list(&tutorials),
            "1. ✅ a title (beginner) - Completed\n2. 🔶 b title (beginner) - 1/2 steps\n3. ⬜ c title (beginner) - Not started"
        );
    }

    #[test]
    fn welcome_distinguishes_returning_users() {
        let fresh = state_with(vec![tutorial("a", vec![lesson("l", vec![step("s", 0)])])]);
        assert!(welcome(&fresh).starts_with("🎓 Welcome to the tutorials!"));
        let returning = state_with(vec![tutorial("a", vec![lesson("l", vec![step("s", 1)])])]);
        assert!(welcome(&returning).starts_with("🎓 Welcome back"));
        assert!(welcome(&state_with(Vec::new())).contains("No tutorials available"));
    }

    #[test]
    fn reset_preview_without_progress_says_so() {
        let state = state_with(vec![tutorial("a", vec![lesson("l", vec![step("s", 0)])])]);
        assert!(reset_preview(&state).contains("don't have any tutorial progress"));
    }

    #[test]
    fn status_overview_reports_position_and_statistics() {
        let mut state = state_with(vec![tutorial(
            "a",
            vec![lesson("l", vec![step("s", 2), step("t", 1)])],
        )]);
        state.current_tutorial = "a".to_string();
        let text = status_overview(&state);
        assert!(text.contains("🎯 Current: a title"));
        assert!(text.contains("📝 Step: t title (step 2 of 2)"));
        assert!(text.contains("📈 Progress: 50% complete"));
        assert!(text.contains("• Steps: 1/2 completed (50%)"));
        assert!(text.ends_with("Ask me to \"move to the next step\""));
    }
}
