//! Todosync Todoist - Remote Task Source
//!
//! This crate provides everything the sync engine needs from Todoist:
//! - Types: projects, tasks, due dates and comments as returned by the REST API
//! - Source: the [`TaskSource`] trait consumed by the sync cycle
//! - Client: [`TodoistClient`], the HTTP implementation of [`TaskSource`]
//! - Errors: classified into auth, network and rate-limit failures

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod source;
pub mod types;

pub use client::{
    TodoistClient, TodoistConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, TOKEN_ENV_VAR,
};
pub use error::{Error, ErrorKind, Result};
pub use source::{TaskQuery, TaskSource};
pub use types::{Comment, Due, Project, Task};

#[cfg(any(test, feature = "mock"))]
pub use source::MockTaskSource;
