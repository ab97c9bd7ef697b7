//! Error types for todosync-notes

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Rendering failure for a single task
#[derive(Debug, Error)]
pub enum RenderError {
    /// Task has no usable id, so no file name can be derived
    #[error("task has no id")]
    MissingTaskId,

    /// A comment timestamp could not be parsed
    #[error("comment {comment_id} has invalid timestamp '{value}'")]
    InvalidTimestamp {
        /// Comment ID
        comment_id: String,
        /// Raw timestamp
        value: String,
    },
}

/// File system failure while writing a note
#[derive(Debug, Error)]
pub enum WriteError {
    /// Parent directory could not be created
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        /// Directory path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Temporary file could not be written
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Temporary file could not be moved into place
    #[error("failed to replace {}: {source}", path.display())]
    Rename {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl WriteError {
    /// Path the failed operation targeted
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            WriteError::CreateDir { path, .. }
            | WriteError::Write { path, .. }
            | WriteError::Rename { path, .. } => path,
        }
    }
}
