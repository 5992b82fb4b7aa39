//! Tutorial catalog: `<root>/<tutorial>/tutorial.json` plus `<lesson>/<step>.md` files.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{IoContext, Result, TutorError};
use crate::tutorial::{Difficulty, Lesson, Progress, Step, Tutorial};

pub const METADATA_FILE: &str = "tutorial.json";

/// `tutorial.json` as authored.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TutorialMetadata {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// Listing position; tutorials without one sort last.
    #[serde(default)]
    pub order: Option<i64>,
    pub lessons: Vec<LessonMetadata>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LessonMetadata {
    pub name: String,
    pub title: String,
    pub steps: Vec<StepMetadata>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StepMetadata {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub has_code: bool,
}

impl TutorialMetadata {
    /// Problems that make the document unusable as a tutorial tree.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.name.trim().is_empty() {
            problems.push("tutorial name is empty".to_string());
        }
        if self.lessons.is_empty() {
            problems.push("tutorial has no lessons".to_string());
        }
        let mut lessons = HashSet::new();
        for lesson in &self.lessons {
            if lesson.name.trim().is_empty() {
                problems.push("lesson name is empty".to_string());
            }
            if !lessons.insert(lesson.name.as_str()) {
                problems.push(format!("duplicate lesson '{}'", lesson.name));
            }
            if lesson.steps.is_empty() {
                problems.push(format!("lesson '{}' has no steps", lesson.name));
            }
            let mut steps = HashSet::new();
            for step in &lesson.steps {
                if step.name.trim().is_empty() {
                    problems.push(format!("lesson '{}' has a step with an empty name", lesson.name));
                }
                if !steps.insert(step.name.as_str()) {
                    problems.push(format!(
                        "lesson '{}' has duplicate step '{}'",
                        lesson.name, step.name
                    ));
                }
            }
        }
        problems
    }

    /// Fresh, not-started tutorial in declared order.
    pub fn into_tutorial(self) -> Tutorial {
        Tutorial {
            name: self.name,
            title: self.title,
            description: self.description,
            difficulty: self.difficulty,
            prerequisites: self.prerequisites,
            status: Progress::NotStarted,
            current_lesson: String::new(),
            lessons: self
                .lessons
                .into_iter()
                .map(|lesson| Lesson {
                    name: lesson.name,
                    title: lesson.title,
                    status: Progress::NotStarted,
                    current_step: String::new(),
                    steps: lesson
                        .steps
                        .into_iter()
                        .map(|step| Step {
                            name: step.name,
                            title: step.title,
                            status: Progress::NotStarted,
                            has_code: step.has_code,
                            content: None,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Read-only view over a content root.
#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
}

impl Catalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metadata_path(&self, tutorial: &str) -> PathBuf {
        self.root.join(tutorial).join(METADATA_FILE)
    }

    pub fn step_path(&self, tutorial: &str, lesson: &str, step: &str) -> PathBuf {
        self.root
            .join(tutorial)
            .join(lesson)
            .join(format!("{step}.md"))
    }

    /// Directory names under the root that hold a `tutorial.json`, sorted.
    ///
    /// A missing root is an empty catalog.
    pub fn list_tutorials(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(root = %self.root.display(), "tutorial directory does not exist");
                return Ok(Vec::new());
            }
            Err(err) => {
                return Err(err).io_context(|| format!("list {}", self.root.display()));
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.io_context(|| format!("list {}", self.root.display()))?;
            let path = entry.path();
            if !path.is_dir() || !path.join(METADATA_FILE).is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        debug!(root = %self.root.display(), count = names.len(), "listed tutorials");
        Ok(names)
    }

    /// Parse and check one tutorial's metadata.
    pub fn load_metadata(&self, tutorial: &str) -> Result<TutorialMetadata> {
        let path = self.metadata_path(tutorial);
        let contents =
            fs::read_to_string(&path).io_context(|| format!("read {}", path.display()))?;
        let metadata: TutorialMetadata =
            serde_json::from_str(&contents).map_err(|err| TutorError::InvalidMetadata {
                path: path.clone(),
                reason: err.to_string(),
            })?;

        let mut problems = metadata.problems();
        if metadata.name != tutorial {
            problems.push(format!(
                "name '{}' does not match directory '{tutorial}'",
                metadata.name
            ));
        }
        if !problems.is_empty() {
            return Err(TutorError::InvalidMetadata {
                path,
                reason: problems.join("; "),
            });
        }
        Ok(metadata)
    }

    /// Every valid tutorial, ordered by `(order, name)`.
    ///
    /// Invalid documents are skipped with a warning so one broken tutorial does
    /// not hide the rest.
    pub fn load_tutorials(&self) -> Result<Vec<Tutorial>> {
        let mut loaded = Vec::new();
        for name in self.list_tutorials()? {
            match self.load_metadata(&name) {
                Ok(metadata) => loaded.push(metadata),
                Err(err) => warn!(tutorial = %name, error = %err, "skipping tutorial"),
            }
        }
        loaded.sort_by(|a, b| {
            (a.order.unwrap_or(i64::MAX), &a.name).cmp(&(b.order.unwrap_or(i64::MAX), &b.name))
        });
        debug!(count = loaded.len(), "loaded tutorial catalog");
        Ok(loaded
            .into_iter()
            .map(TutorialMetadata::into_tutorial)
            .collect())
    }

    /// Step markdown files declared by `tutorial` but missing on disk.
    pub fn check_structure(&self, tutorial: &Tutorial) -> Vec<PathBuf> {
        let mut missing = Vec::new();
        let metadata = self.metadata_path(&tutorial.name);
        if !metadata.is_file() {
            missing.push(metadata);
        }
        for lesson in &tutorial.lessons {
            for step in &lesson.steps {
                let path = self.step_path(&tutorial.name, &lesson.name, &step.name);
                if !path.is_file() {
                    missing.push(path);
                }
            }
        }
        missing
    }
}
