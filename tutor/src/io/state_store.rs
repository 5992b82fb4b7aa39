//! Persisted tutorial state with schema, checksum and invariant validation.
//!
//! The store owns the only read-modify-write path over `state.json`. A file
//! that fails any check is never returned: it is replaced by a fresh aggregate
//! built from the content catalog.

use std::fs;

use jsonschema::{Draft, Validator};
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::atomic::write_atomic;
use super::catalog::Catalog;
use super::identity::Identity;
use super::paths::TutorPaths;
use crate::core::invariants::validate_structure;
use crate::core::state_update::{self, CompletionSummary};
use crate::error::{IoContext, Result};
use crate::tutorial::{CURRENT_SCHEMA_VERSION, State};

const STATE_SCHEMA: &str = include_str!("../../schemas/state.schema.json");

/// Why a stored document was not accepted as-is.
#[derive(Debug, PartialEq, Eq)]
enum Rejection {
    /// Written by another schema version; only the user id survives.
    Outdated {
        found: String,
        user_id: Option<String>,
    },
    Corrupt(String),
}

pub struct StateStore {
    paths: TutorPaths,
    identity: Identity,
    catalog: Catalog,
    validator: Validator,
}

impl StateStore {
    pub fn new(paths: TutorPaths) -> Self {
        let schema: Value =
            serde_json::from_str(STATE_SCHEMA).expect("state schema should be valid JSON");
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&schema)
            .expect("state schema should compile");
        Self {
            identity: Identity::new(&paths.user_id_path),
            catalog: Catalog::new(&paths.content_dir),
            paths,
            validator,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Stored aggregate, `None` when nothing has been saved yet.
    ///
    /// Corrupt or outdated files are regenerated and saved before returning.
    pub fn load_state(&self) -> Result<Option<State>> {
        let path = &self.paths.state_path;
        debug!(path = %path.display(), "loading state");
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no state file");
                return Ok(None);
            }
            Err(err) => return Err(err).io_context(|| format!("read state {}", path.display())),
        };

        match self.decode(&bytes) {
            Ok(state) => {
                debug!(
                    user_id = %state.user_id,
                    current_tutorial = %state.current_tutorial,
                    tutorials = state.tutorials.len(),
                    "state loaded"
                );
                Ok(Some(state))
            }
            Err(Rejection::Outdated { found, user_id }) => {
                info!(
                    found = %found,
                    current = CURRENT_SCHEMA_VERSION,
                    "state schema version changed; regenerating"
                );
                self.regenerate(user_id).map(Some)
            }
            Err(Rejection::Corrupt(reason)) => {
                warn!(path = %path.display(), reason = %reason, "state file corrupt; regenerating");
                self.regenerate(None).map(Some)
            }
        }
    }

    /// Persist `state`, refreshing `last_accessed` and `schema_version` in place.
    pub fn save_state(&self, state: &mut State) -> Result<()> {
        state.last_accessed = chrono::Utc::now();
        state.schema_version = CURRENT_SCHEMA_VERSION.to_string();
        let state_value = serde_json::to_value(&*state)?;
        let envelope = json!({
            "version": CURRENT_SCHEMA_VERSION,
            "checksum": checksum(&state_value),
            "state": state_value,
        });
        let mut buf = serde_json::to_string_pretty(&envelope)?;
        buf.push('\n');
        debug!(
            path = %self.paths.state_path.display(),
            current_tutorial = %state.current_tutorial,
            "writing state"
        );
        write_atomic(&self.paths.state_path, &buf)
    }

    /// Stored aggregate, or a fresh one from the catalog saved on first use.
    pub fn load_or_initialize(&self) -> Result<State> {
        match self.load_state()? {
            Some(state) => Ok(state),
            None => {
                info!(content_dir = %self.catalog.root().display(), "initializing state");
                self.regenerate(None)
            }
        }
    }

    /// Discard whatever is stored and save a default aggregate.
    ///
    /// `user_id` is kept when given (and written back to the identity file);
    /// otherwise the identity file decides.
    pub fn regenerate(&self, user_id: Option<String>) -> Result<State> {
        let user_id = match user_id {
            Some(id) => {
                self.identity.store(&id)?;
                id
            }
            None => self.identity.load_or_create()?,
        };
        let mut state = State::fresh(user_id, self.catalog.load_tutorials()?);
        self.save_state(&mut state)?;
        Ok(state)
    }

    pub fn update_progress(&self, tutorial: &str, lesson: &str, step: &str) -> Result<State> {
        let mut state = self.load_or_initialize()?;
        state_update::update_progress(&mut state, tutorial, lesson, step)?;
        self.save_state(&mut state)?;
        Ok(state)
    }

    pub fn mark_completed(
        &self,
        tutorial: &str,
        lesson: &str,
        step: &str,
    ) -> Result<(State, CompletionSummary)> {
        let mut state = self.load_or_initialize()?;
        let summary = state_update::mark_completed(&mut state, tutorial, lesson, step)?;
        self.save_state(&mut state)?;
        Ok((state, summary))
    }

    /// Complete every step before the target; returns the changed `lesson/step` paths.
    pub fn complete_steps_before(
        &self,
        tutorial: &str,
        lesson: &str,
        step: &str,
    ) -> Result<Vec<String>> {
        let mut state = self.load_or_initialize()?;
        let changed = state_update::complete_steps_before(&mut state, tutorial, lesson, step)?;
        if !changed.is_empty() {
            self.save_state(&mut state)?;
        }
        Ok(changed)
    }

    pub fn reset_progress(&self) -> Result<State> {
        let mut state = self.load_or_initialize()?;
        state_update::reset_progress(&mut state);
        self.save_state(&mut state)?;
        Ok(state)
    }

    fn decode(&self, bytes: &[u8]) -> std::result::Result<State, Rejection> {
        let text = std::str::from_utf8(bytes)
            .map_err(|err| Rejection::Corrupt(format!("not UTF-8: {err}")))?;
        let value: Value = serde_json::from_str(text)
            .map_err(|err| Rejection::Corrupt(format!("parse: {err}")))?;

        let version = value.get("version").and_then(Value::as_str);
        let schema_version = value.pointer("/state/schemaVersion").and_then(Value::as_str);
        for found in [version, schema_version].into_iter().flatten() {
            if found != CURRENT_SCHEMA_VERSION {
                let user_id = value
                    .pointer("/state/userId")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string);
                return Err(Rejection::Outdated {
                    found: found.to_string(),
                    user_id,
                });
            }
        }

        if !self.validator.is_valid(&value) {
            let messages = self
                .validator
                .iter_errors(&value)
                .map(|err| err.to_string())
                .collect::<Vec<_>>();
            return Err(Rejection::Corrupt(format!(
                "schema validation failed: {}",
                messages.join("; ")
            )));
        }

        if let (Some(expected), Some(state_value)) = (
            value.get("checksum").and_then(Value::as_str),
            value.get("state"),
        ) {
            let actual = checksum(state_value);
            if actual != expected {
                return Err(Rejection::Corrupt(format!(
                    "checksum mismatch (stored {expected}, computed {actual})"
                )));
            }
        }

        let state_value = value
            .get("state")
            .cloned()
            .ok_or_else(|| Rejection::Corrupt("missing state".to_string()))?;
        let state: State = serde_json::from_value(state_value)
            .map_err(|err| Rejection::Corrupt(format!("deserialize: {err}")))?;

        let errors = validate_structure(&state);
        if !errors.is_empty() {
            return Err(Rejection::Corrupt(format!(
                "invariants failed: {}",
                errors.join("; ")
            )));
        }
        Ok(state)
    }
}

/// Hex SHA-256 over the compact JSON form of the state payload.
fn checksum(state: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(state.to_string().as_bytes());
    hex::encode(hasher.finalize())
}
