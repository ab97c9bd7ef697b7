//! Note persistence
//!
//! [`FsNoteWriter`] writes through a sibling temp file and renames it into
//! place, so an interrupted write never leaves a truncated note behind.

use crate::error::WriteError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Persists rendered notes
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait NoteWriter: Send + Sync {
    /// Write `content` to `path`, replacing any existing file
    async fn write(&self, path: &Path, content: &str) -> Result<(), WriteError>;
}

/// File system writer
#[derive(Debug, Clone, Default)]
pub struct FsNoteWriter;

impl FsNoteWriter {
    /// Create a writer
    pub fn new() -> Self {
        Self
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "note".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

#[async_trait::async_trait]
impl NoteWriter for FsNoteWriter {
    async fn write(&self, path: &Path, content: &str) -> Result<(), WriteError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| WriteError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let temp_path = temp_path_for(path);
        fs::write(&temp_path, content)
            .await
            .map_err(|source| WriteError::Write {
                path: temp_path.clone(),
                source,
            })?;

        if let Err(source) = fs::rename(&temp_path, path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(WriteError::Rename {
                path: path.to_path_buf(),
                source,
            });
        }

        debug!(path = %path.display(), bytes = content.len(), "Note written");
        Ok(())
    }
}

/// Make sure the output root exists and accepts writes
///
/// Creates the directory tree if needed, then writes and removes a probe file.
pub async fn prepare_output_root(root: &Path) -> Result<(), WriteError> {
    fs::create_dir_all(root)
        .await
        .map_err(|source| WriteError::CreateDir {
            path: root.to_path_buf(),
            source,
        })?;

    let probe = root.join(".todosync-write-test");
    fs::write(&probe, b"ok")
        .await
        .map_err(|source| WriteError::Write {
            path: probe.clone(),
            source,
        })?;
    let _ = fs::remove_file(&probe).await;

    Ok(())
}
