//! Persisted opaque user identifier (`user-id`).

use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};
use uuid::Uuid;

use super::atomic::write_atomic;
use crate::error::{IoContext, Result};

#[derive(Debug, Clone)]
pub struct Identity {
    path: PathBuf,
}

impl Identity {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Stored identifier, `None` when the file is absent or blank.
    pub fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let id = contents.trim();
                Ok((!id.is_empty()).then(|| id.to_string()))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).io_context(|| format!("read {}", self.path.display())),
        }
    }

    /// Stored identifier, generating and persisting a new UUID v4 if needed.
    pub fn load_or_create(&self) -> Result<String> {
        if let Some(id) = self.read()? {
            debug!(path = %self.path.display(), "user id loaded");
            return Ok(id);
        }
        let id = Uuid::new_v4().to_string();
        self.store(&id)?;
        info!(path = %self.path.display(), "generated new user id");
        Ok(id)
    }

    pub fn store(&self, id: &str) -> Result<()> {
        write_atomic(&self.path, &format!("{id}\n"))
    }
}
