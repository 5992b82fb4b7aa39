//! Test-only helpers for building tutorial trees and on-disk content fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use tempfile::TempDir;

use crate::core::state_update::{derive_lesson_status, derive_statuses};
use crate::io::paths::TutorPaths;
use crate::tutorial::{Difficulty, Lesson, Progress, State, Step, Tutorial};

/// Create a deterministic step with an explicit status (`0`, `1` or `2`).
pub fn step(name: &str, status: u8) -> Step {
    Step {
        name: name.to_string(),
        title: format!("{name} title"),
        status: Progress::try_from(status).unwrap_or_default(),
        has_code: false,
        content: None,
    }
}

/// Create a lesson whose status is derived from `steps`.
pub fn lesson(name: &str, steps: Vec<Step>) -> Lesson {
    let mut lesson = Lesson {
        name: name.to_string(),
        title: format!("{name} title"),
        status: Progress::NotStarted,
        current_step: String::new(),
        steps,
    };
    lesson.status = derive_lesson_status(&lesson);
    lesson
}

/// Create a tutorial whose lesson and tutorial statuses are derived.
pub fn tutorial(name: &str, lessons: Vec<Lesson>) -> Tutorial {
    let mut tutorial = Tutorial {
        name: name.to_string(),
        title: format!("{name} title"),
        description: format!("{name} description"),
        difficulty: Difficulty::Beginner,
        prerequisites: Vec::new(),
        status: Progress::NotStarted,
        current_lesson: String::new(),
        lessons,
    };
    derive_statuses(&mut tutorial);
    tutorial
}

/// Wrap tutorials in a state owned by `user-1`.
pub fn state_with(tutorials: Vec<Tutorial>) -> State {
    State::fresh("user-1", tutorials)
}

/// A temp content root populated with `tutorial.json` documents and step files.
pub struct ContentFixture {
    dir: TempDir,
}

impl ContentFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a tutorial with `lessons` given as `(lesson, [steps])` pairs.
    ///
    /// Every step gets a markdown file whose body names its position.
    pub fn add_tutorial(&self, name: &str, order: i64, lessons: &[(&str, Vec<&str>)]) {
        let lessons_json: Vec<_> = lessons
            .iter()
            .map(|(lesson, steps)| {
                json!({
                    "name": lesson,
                    "title": format!("{lesson} title"),
                    "steps": steps
                        .iter()
                        .enumerate()
                        .map(|(index, step)| json!({
                            "name": step,
                            "title": format!("{step} title"),
                            "hasCode": index % 2 == 0,
                        }))
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        let metadata = json!({
            "name": name,
            "title": format!("{name} title"),
            "description": format!("About {name}"),
            "difficulty": "beginner",
            "prerequisites": [],
            "order": order,
            "lessons": lessons_json,
        });
        self.write(
            &format!("{name}/tutorial.json"),
            &serde_json::to_string_pretty(&metadata).expect("serialize metadata"),
        );
        for (lesson, steps) in lessons {
            for step in steps {
                self.write_step(
                    name,
                    lesson,
                    step,
                    &format!("# {step}\n\nBody of {name}/{lesson}/{step}.\n"),
                );
            }
        }
    }

    pub fn write_step(&self, tutorial: &str, lesson: &str, step: &str, body: &str) {
        self.write(&format!("{tutorial}/{lesson}/{step}.md"), body);
    }

    pub fn remove_step(&self, tutorial: &str, lesson: &str, step: &str) {
        fs::remove_file(self.step_path(tutorial, lesson, step)).expect("remove step");
    }

    pub fn step_path(&self, tutorial: &str, lesson: &str, step: &str) -> PathBuf {
        self.root()
            .join(tutorial)
            .join(lesson)
            .join(format!("{step}.md"))
    }

    /// Write an arbitrary file relative to the content root.
    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create content dir");
        }
        fs::write(&path, contents).expect("write content file");
    }
}

impl Default for ContentFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Isolated cache directory paired with a content fixture.
pub struct TestEnv {
    pub content: ContentFixture,
    cache: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            content: ContentFixture::new(),
            cache: tempfile::tempdir().expect("tempdir"),
        }
    }

    /// Single tutorial `t1` with lessons `l1` and `l2`, two steps each.
    pub fn two_by_two() -> Self {
        let env = Self::new();
        env.content.add_tutorial(
            "t1",
            1,
            &[("l1", vec!["a1", "b1"]), ("l2", vec!["a2", "b2"])],
        );
        env
    }

    pub fn paths(&self) -> TutorPaths {
        TutorPaths::new(self.cache.path(), self.content.root())
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
