//! Read-only health report over the stored state and the content tree.

use std::fmt::Write as _;
use std::fs;

use tracing::debug;

use crate::core::frontmatter::strip_front_matter;
use crate::core::invariants::validate;
use crate::core::wrap::lint_step_content;
use crate::engine::Engine;
use crate::error::{IoContext, Result};
use crate::tutorial::Tutorial;

/// Findings grouped by severity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnosis {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Diagnosis {
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Engine<'_> {
    /// Text report; never writes progress.
    pub fn diagnose(&mut self) -> String {
        match self.collect_diagnosis() {
            Ok(diagnosis) => self.render_diagnosis(&diagnosis),
            Err(err) => format!("❌ {err}"),
        }
    }

    pub fn collect_diagnosis(&self) -> Result<Diagnosis> {
        let mut diagnosis = Diagnosis::default();
        let catalog = self.store().catalog().clone();

        let names = catalog.list_tutorials()?;
        if names.is_empty() {
            diagnosis.warnings.push(format!(
                "no tutorials found in {}",
                catalog.root().display()
            ));
        }
        let mut tutorials: Vec<Tutorial> = Vec::new();
        for name in &names {
            match catalog.load_metadata(name) {
                Ok(metadata) => tutorials.push(metadata.into_tutorial()),
                Err(err) => diagnosis.errors.push(err.to_string()),
            }
        }

        if let Some(state) = self.store().load_state()? {
            for tutorial in &state.tutorials {
                for violation in validate(tutorial) {
                    diagnosis.errors.push(format!("state: {violation}"));
                }
                if !names.contains(&tutorial.name) {
                    diagnosis.warnings.push(format!(
                        "state: tutorial '{}' is no longer in the content tree",
                        tutorial.name
                    ));
                }
            }
        }

        for tutorial in &tutorials {
            for path in catalog.check_structure(tutorial) {
                diagnosis
                    .errors
                    .push(format!("{}: missing {}", tutorial.name, path.display()));
            }
            for lesson in &tutorial.lessons {
                for step in &lesson.steps {
                    // Read around the content cache so the report leaves it as found.
                    let path = catalog.step_path(&tutorial.name, &lesson.name, &step.name);
                    let raw = match fs::read_to_string(&path) {
                        Ok(raw) => raw,
                        Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                        Err(err) => {
                            return Err(err).io_context(|| format!("read {}", path.display()));
                        }
                    };
                    for issue in lint_step_content(strip_front_matter(&raw), step.has_code) {
                        diagnosis.warnings.push(format!(
                            "{}/{}/{}: {issue}",
                            tutorial.name, lesson.name, step.name
                        ));
                    }
                }
            }
        }

        debug!(
            errors = diagnosis.errors.len(),
            warnings = diagnosis.warnings.len(),
            "diagnosis collected"
        );
        Ok(diagnosis)
    }

    fn render_diagnosis(&mut self, diagnosis: &Diagnosis) -> String {
        let mut text = String::from("🩺 Tutorial Diagnostics\n\n");
        if diagnosis.errors.is_empty() && diagnosis.warnings.is_empty() {
            text.push_str("✅ No problems found.\n");
        }
        if !diagnosis.errors.is_empty() {
            text.push_str("❌ Errors:\n");
            for error in &diagnosis.errors {
                let _ = writeln!(text, "- {error}");
            }
        }
        if !diagnosis.warnings.is_empty() {
            text.push_str("⚠️ Warnings:\n");
            for warning in &diagnosis.warnings {
                let _ = writeln!(text, "- {warning}");
            }
        }
        let stats = self.content().stats();
        let _ = write!(
            text,
            "\n📦 Content cache: {}/{} entries, {} hits, {} misses",
            stats.entries, stats.capacity, stats.hits, stats.misses
        );
        text
    }
}
