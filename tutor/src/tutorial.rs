use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema version written into both the state envelope and the state itself.
pub const CURRENT_SCHEMA_VERSION: &str = "1.0.0";

/// Tri-state progress, persisted as `0`, `1` or `2`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Progress {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl Progress {
    pub fn is_completed(self) -> bool {
        self == Progress::Completed
    }

    pub fn label(self) -> &'static str {
        match self {
            Progress::NotStarted => "Not started",
            Progress::InProgress => "In progress",
            Progress::Completed => "Completed",
        }
    }
}

impl From<Progress> for u8 {
    fn from(value: Progress) -> Self {
        match value {
            Progress::NotStarted => 0,
            Progress::InProgress => 1,
            Progress::Completed => 2,
        }
    }
}

impl TryFrom<u8> for Progress {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Progress::NotStarted),
            1 => Ok(Progress::InProgress),
            2 => Ok(Progress::Completed),
            other => Err(format!("invalid progress status {other} (expected 0, 1 or 2)")),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

/// Persisted aggregate: the full tutorial tree plus the user's position in it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub user_id: String,
    /// Name of the active tutorial, empty when none is active.
    pub current_tutorial: String,
    pub tutorials: Vec<Tutorial>,
    pub last_accessed: DateTime<Utc>,
    pub schema_version: String,
}

impl State {
    /// Fresh aggregate for `user_id` over a freshly loaded tutorial tree.
    pub fn fresh(user_id: impl Into<String>, tutorials: Vec<Tutorial>) -> Self {
        Self {
            user_id: user_id.into(),
            current_tutorial: String::new(),
            tutorials,
            last_accessed: Utc::now(),
            schema_version: CURRENT_SCHEMA_VERSION.to_string(),
        }
    }

    pub fn tutorial(&self, name: &str) -> Option<&Tutorial> {
        self.tutorials.iter().find(|tutorial| tutorial.name == name)
    }

    pub fn tutorial_mut(&mut self, name: &str) -> Option<&mut Tutorial> {
        self.tutorials.iter_mut().find(|tutorial| tutorial.name == name)
    }

    /// The tutorial named by `current_tutorial`, if any.
    pub fn active_tutorial(&self) -> Option<&Tutorial> {
        if self.current_tutorial.is_empty() {
            return None;
        }
        self.tutorial(&self.current_tutorial)
    }

    pub fn tutorial_names(&self) -> Vec<String> {
        self.tutorials.iter().map(|tutorial| tutorial.name.clone()).collect()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Tutorial {
    pub name: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    /// Informational only; never enforced.
    pub prerequisites: Vec<String>,
    pub status: Progress,
    pub current_lesson: String,
    pub lessons: Vec<Lesson>,
}

impl Tutorial {
    pub fn lesson(&self, name: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|lesson| lesson.name == name)
    }

    pub fn lesson_mut(&mut self, name: &str) -> Option<&mut Lesson> {
        self.lessons.iter_mut().find(|lesson| lesson.name == name)
    }

    pub fn lesson_names(&self) -> Vec<String> {
        self.lessons.iter().map(|lesson| lesson.name.clone()).collect()
    }

    /// Steps in declared order across all lessons.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.lessons.iter().flat_map(|lesson| lesson.steps.iter())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub name: String,
    pub title: String,
    pub status: Progress,
    pub current_step: String,
    pub steps: Vec<Step>,
}

impl Lesson {
    pub fn step(&self, name: &str) -> Option<&Step> {
        self.steps.iter().find(|step| step.name == name)
    }

    pub fn step_mut(&mut self, name: &str) -> Option<&mut Step> {
        self.steps.iter_mut().find(|step| step.name == name)
    }

    pub fn step_names(&self) -> Vec<String> {
        self.steps.iter().map(|step| step.name.clone()).collect()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub name: String,
    pub title: String,
    pub status: Progress,
    pub has_code: bool,
    /// Loaded on demand; never persisted.
    #[serde(skip)]
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_serializes_as_integer() {
        let json = serde_json::to_string(&Progress::InProgress).expect("serialize");
        assert_eq!(json, "1");
        let parsed: Progress = serde_json::from_str("2").expect("parse");
        assert_eq!(parsed, Progress::Completed);
    }

    #[test]
    fn progress_rejects_out_of_range_values() {
        let err = serde_json::from_str::<Progress>("3").expect_err("expected error");
        assert!(err.to_string().contains("invalid progress status 3"));
    }

    #[test]
    fn step_content_is_not_persisted() {
        let step = Step {
            name: "intro".to_string(),
            title: "Intro".to_string(),
            status: Progress::NotStarted,
            has_code: true,
            content: Some("# Body".to_string()),
        };
        let value = serde_json::to_value(&step).expect("serialize");
        assert!(value.get("content").is_none());
        assert_eq!(value["hasCode"], serde_json::Value::Bool(true));
    }
}
