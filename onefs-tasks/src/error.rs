// SPDX-License-Identifier: GPL-3.0-only

//! Task-level error type

use onefs_papi::PapiError;
use thiserror::Error;

/// Why a task run failed. Every variant renders as the single message that
/// ends up in the report's `msg` field.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Input parameters failed validation; nothing was sent to the array
    #[error("{0}")]
    Validation(String),

    /// An operation against the array failed; the message names the
    /// operation and carries the underlying error
    #[error("{0}")]
    Failed(String),

    /// An array call failed before any task context was attached
    #[error(transparent)]
    Api(#[from] PapiError),
}

impl TaskError {
    pub fn validation(msg: impl Into<String>) -> Self {
        TaskError::Validation(msg.into())
    }

    pub fn failed(msg: impl Into<String>) -> Self {
        TaskError::Failed(msg.into())
    }

    /// Attach the name of the operation that was underway. Validation errors
    /// pass through untouched; they already name the offending parameter.
    pub fn context(self, operation: impl std::fmt::Display) -> Self {
        match self {
            TaskError::Validation(msg) => TaskError::Validation(msg),
            other => TaskError::Failed(format!("{operation} failed with error: {other}")),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, TaskError::Validation(_))
    }
}
