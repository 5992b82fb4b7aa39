use std::path::{Path, PathBuf};

/// Canonical on-disk locations for one tutor installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorPaths {
    pub cache_dir: PathBuf,
    pub content_dir: PathBuf,
    /// `{version, state, checksum}` envelope.
    pub state_path: PathBuf,
    /// Raw user identifier, one line.
    pub user_id_path: PathBuf,
}

impl TutorPaths {
    pub fn new(cache_dir: impl Into<PathBuf>, content_dir: impl Into<PathBuf>) -> Self {
        let cache_dir = cache_dir.into();
        Self {
            state_path: cache_dir.join("state.json"),
            user_id_path: cache_dir.join("user-id"),
            content_dir: content_dir.into(),
            cache_dir,
        }
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }
}
