//! Todosync Notes - Obsidian Output
//!
//! This crate turns Todoist tasks into Obsidian markdown notes:
//! - Settings: [`ExportSettings`] (output root, tag prefix, folders)
//! - Renderer: the pure [`NoteRenderer`] trait and [`MarkdownRenderer`]
//! - Writer: the [`NoteWriter`] trait and [`FsNoteWriter`] (temp file + rename)
//! - Format: filename sanitising and YAML string quoting

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod format;
pub mod renderer;
pub mod settings;
pub mod writer;

pub use error::{RenderError, WriteError};
pub use format::{format_yaml_string, sanitize_filename, tag_segment};
pub use renderer::{MarkdownRenderer, NoteInput, NoteRenderer, RenderedNote};
pub use settings::{ExportSettings, DEFAULT_OUTPUT_DIR, DEFAULT_TAG_PREFIX};
pub use writer::{prepare_output_root, FsNoteWriter, NoteWriter};

#[cfg(any(test, feature = "mock"))]
pub use renderer::MockNoteRenderer;
#[cfg(any(test, feature = "mock"))]
pub use writer::MockNoteWriter;
