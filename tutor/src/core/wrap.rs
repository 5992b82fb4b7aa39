//! Wrapped step content: tutor preamble, position header, body and navigation hint.
//!
//! The marker lines (`📘 Lesson:`, `📝 Step:`, `### Step Content:`, `---`) are
//! consumed by downstream renderers and must stay stable.

use std::sync::LazyLock;

use minijinja::{Environment, context};
use regex::Regex;

use crate::core::selector::StepRef;
use crate::error::Result;
use crate::tutorial::Tutorial;

const STEP_TEMPLATE: &str = include_str!("templates/step.md");

static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid blank-run regex"));
static TRAILING_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)[ \t]+$").expect("valid trailing-space regex"));

/// Where a step sits, as needed by the header and the navigation hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPosition {
    pub lesson_title: String,
    pub step_title: String,
    /// 1-based, within the lesson.
    pub step_number: usize,
    pub total_steps: usize,
    pub has_code: bool,
    pub last_lesson: bool,
}

impl StepPosition {
    pub fn of(tutorial: &Tutorial, found: &StepRef<'_>) -> Self {
        Self {
            lesson_title: found.lesson.title.clone(),
            step_title: found.step.title.clone(),
            step_number: found.number_in_lesson(),
            total_steps: found.lesson.steps.len(),
            has_code: found.step.has_code,
            last_lesson: found.is_last_lesson(tutorial),
        }
    }

    pub fn is_last_in_lesson(&self) -> bool {
        self.step_number == self.total_steps
    }

    pub fn navigation_hint(&self) -> &'static str {
        match (self.is_last_in_lesson(), self.last_lesson) {
            (true, true) => "🎉 You're on the final step! Complete this to finish the tutorial.",
            (true, false) => {
                "📚 This is the last step of this lesson. Ready to move to the next lesson?"
            }
            _ => "Ready to continue? Ask me to 'move to the next step'",
        }
    }
}

/// minijinja wrapper around the step template.
pub struct StepRenderer {
    env: Environment<'static>,
}

impl StepRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("step", STEP_TEMPLATE)
            .expect("step template should be valid");
        Self { env }
    }

    pub fn wrap(&self, body: &str, position: &StepPosition) -> Result<String> {
        let template = self.env.get_template("step")?;
        let rendered = template.render(context! {
            lesson_title => &position.lesson_title,
            step_title => &position.step_title,
            step_number => position.step_number,
            total_steps => position.total_steps,
            has_code => position.has_code,
            body => tidy_for_terminal(body),
            hint => position.navigation_hint(),
        })?;
        Ok(rendered)
    }
}

impl Default for StepRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop trailing whitespace and collapse runs of blank lines outside fenced
/// code blocks, then trim the ends. Fenced blocks are copied verbatim.
pub fn tidy_for_terminal(body: &str) -> String {
    let normalized = body.replace("\r\n", "\n");
    let mut tidied = String::with_capacity(normalized.len());
    let mut prose = String::new();
    let mut in_fence = false;
    for line in normalized.split_inclusive('\n') {
        let is_fence = line.trim_start().starts_with("```");
        if in_fence && is_fence {
            // The closing line's newline joins the prose that follows.
            match line.strip_suffix('\n') {
                Some(fence) => {
                    tidied.push_str(fence);
                    prose.push('\n');
                }
                None => tidied.push_str(line),
            }
            in_fence = false;
        } else if in_fence {
            tidied.push_str(line);
        } else if is_fence {
            tidied.push_str(&tidy_prose(&prose));
            prose.clear();
            tidied.push_str(line);
            in_fence = true;
        } else {
            prose.push_str(line);
        }
    }
    tidied.push_str(&tidy_prose(&prose));
    tidied.trim().to_string()
}

fn tidy_prose(text: &str) -> String {
    let trimmed = TRAILING_SPACE.replace_all(text, "");
    BLANK_RUNS.replace_all(&trimmed, "\n\n").into_owned()
}

/// Authoring problems in a step body. Reported by diagnostics only.
pub fn lint_step_content(body: &str, has_code: bool) -> Vec<String> {
    let mut issues = Vec::new();
    if body.trim().is_empty() {
        issues.push("step content is empty".to_string());
        return issues;
    }
    if !body.lines().any(|line| line.trim_start().starts_with('#')) {
        issues.push("step content has no heading".to_string());
    }
    if has_code && !body.contains("```") {
        issues.push("step is marked hasCode but contains no code block".to_string());
    }
    issues
}
