//! Tutor configuration stored in `tutor.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use super::atomic::write_atomic;
use super::paths::TutorPaths;

/// Tutor configuration (TOML).
///
/// Missing fields fall back to defaults, and a missing file means all defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TutorConfig {
    /// Root of the tutorial content tree.
    pub content_dir: PathBuf,

    /// Directory holding `state.json` and `user-id`.
    /// Defaults to `<platform cache dir>/tutor`.
    pub cache_dir: Option<PathBuf>,

    /// Maximum number of step bodies kept in memory.
    pub content_cache_capacity: usize,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("tutorials"),
            cache_dir: None,
            content_cache_capacity: 10,
        }
    }
}

impl TutorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.content_cache_capacity == 0 {
            return Err(anyhow!("content_cache_capacity must be > 0"));
        }
        if self.content_dir.as_os_str().is_empty() {
            return Err(anyhow!("content_dir must not be empty"));
        }
        Ok(())
    }

    /// Configured cache directory, else the platform default.
    pub fn resolve_cache_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Ok(dir.clone());
        }
        dirs::cache_dir()
            .map(|dir| dir.join("tutor"))
            .context("no platform cache directory; set cache_dir in the config")
    }

    pub fn paths(&self) -> Result<TutorPaths> {
        Ok(TutorPaths::new(
            self.resolve_cache_dir()?,
            self.content_dir.clone(),
        ))
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `TutorConfig::default()`.
pub fn load_config(path: &Path) -> Result<TutorConfig> {
    if !path.exists() {
        let cfg = TutorConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: TutorConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk.
pub fn write_config(path: &Path, cfg: &TutorConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf).with_context(|| format!("write config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, TutorConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("tutor.toml");
        let cfg = TutorConfig {
            content_dir: PathBuf::from("content"),
            cache_dir: Some(temp.path().join("cache")),
            content_cache_capacity: 4,
        };
        write_config(&path, &cfg).expect("write");
        assert_eq!(load_config(&path).expect("load"), cfg);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("tutor.toml");
        fs::write(&path, "content_cache_capacity = 3\n").expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.content_cache_capacity, 3);
        assert_eq!(cfg.content_dir, PathBuf::from("tutorials"));
        assert!(cfg.cache_dir.is_none());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("tutor.toml");
        fs::write(&path, "content_cache_capacity = 0\n").expect("write");
        let err = load_config(&path).expect_err("invalid");
        assert!(err.to_string().contains("content_cache_capacity"));
    }

    #[test]
    fn explicit_cache_dir_wins() {
        let cfg = TutorConfig {
            cache_dir: Some(PathBuf::from("/var/tmp/tutor")),
            ..TutorConfig::default()
        };
        let paths = cfg.paths().expect("paths");
        assert_eq!(paths.state_path, PathBuf::from("/var/tmp/tutor/state.json"));
    }
}
