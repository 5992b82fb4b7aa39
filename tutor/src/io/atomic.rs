//! Temp-file-then-rename writes shared by every persisted file.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{IoContext, Result, TutorError};

/// Write `contents` next to `path` and rename it into place.
///
/// Readers observe either the previous file or the complete new one.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path.parent().ok_or_else(|| {
        TutorError::io(
            format!("path missing parent {}", path.display()),
            std::io::Error::from(std::io::ErrorKind::InvalidInput),
        )
    })?;
    fs::create_dir_all(parent).io_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = temp_path(path);
    debug!(path = %path.display(), tmp = %tmp_path.display(), bytes = contents.len(), "atomic write");
    fs::write(&tmp_path, contents)
        .io_context(|| format!("write temp file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).io_context(|| format!("replace {}", path.display()))?;
    Ok(())
}

/// `state.json` -> `state.json.tmp`, `user-id` -> `user-id.tmp`.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| OsString::from("file"));
    name.push(".tmp");
    path.with_file_name(name)
}
