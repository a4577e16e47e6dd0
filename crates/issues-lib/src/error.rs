//! Error types for `issues-lib`.
//!
//! Expected request outcomes (missing fields, unknown ids, no-op updates)
//! and infrastructure failures share one enum; callers use
//! [`IssueError::is_expected`] to tell them apart.

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for issue store operations.
#[derive(Error, Debug)]
pub enum IssueError {
    // === Request Outcomes ===
    /// One or more required creation fields were absent or empty.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Multiple validation errors occurred.
    #[error("Validation errors: {errors:?}")]
    ValidationErrors { errors: Vec<ValidationError> },

    /// No identifier was supplied.
    #[error("Missing issue ID")]
    MissingId,

    /// Identifier is not in the store's identifier space. The service turns
    /// this into `UpdateFailed` or `DeleteFailed`.
    #[error("Malformed issue ID: {id}")]
    MalformedId { id: String },

    /// Update target is malformed, unknown, or the patch could not be applied.
    #[error("Could not update issue: {id}")]
    UpdateFailed { id: String },

    /// Delete target is malformed or unknown.
    #[error("Could not delete issue: {id}")]
    DeleteFailed { id: String },

    /// The patch did not change any stored value.
    #[error("No update fields sent for issue: {id}")]
    NoUpdateFields { id: String },

    // === Storage Errors ===
    /// Generic storage failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// File not found at the specified path.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Failed to parse a line in the JSONL file.
    #[error("JSONL parse error at line {line}: {reason}")]
    JsonlParse { line: usize, reason: String },

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

impl IssueError {
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn from_validation_errors(errors: Vec<ValidationError>) -> Self {
        if errors.len() == 1 {
            let err = &errors[0];
            Self::Validation {
                field: err.field.clone(),
                reason: err.message.clone(),
            }
        } else {
            Self::ValidationErrors { errors }
        }
    }

    /// True for outcomes a client caused and is told about in the response
    /// body, false for store or I/O failures.
    #[must_use]
    pub const fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::ValidationErrors { .. }
                | Self::MissingId
                | Self::UpdateFailed { .. }
                | Self::DeleteFailed { .. }
                | Self::NoUpdateFields { .. }
        )
    }

    /// The issue ID this outcome refers to, if any.
    #[must_use]
    pub fn issue_id(&self) -> Option<&str> {
        match self {
            Self::MalformedId { id }
            | Self::UpdateFailed { id }
            | Self::DeleteFailed { id }
            | Self::NoUpdateFields { id } => Some(id),
            _ => None,
        }
    }
}

/// Result type using `IssueError`.
pub type Result<T> = std::result::Result<T, IssueError>;
