//! Validation helpers for issues.
//!
//! These routines enforce the record constraints and return structured
//! validation errors without touching the store.

use crate::error::ValidationError;
use crate::model::{Issue, NewIssue};
use crate::util::is_valid_id_format;

/// Message clients receive for any missing required creation field.
pub const REQUIRED_FIELDS_MISSING: &str = "required field(s) missing";

/// Validates issue fields and invariants.
pub struct IssueValidator;

impl IssueValidator {
    /// Check that every required creation field is present and non-empty.
    ///
    /// # Errors
    ///
    /// Returns one `ValidationError` per missing field.
    pub fn validate_new(input: &NewIssue) -> Result<(), Vec<ValidationError>> {
        let required = [
            ("issue_title", input.issue_title.as_deref()),
            ("issue_text", input.issue_text.as_deref()),
            ("created_by", input.created_by.as_deref()),
        ];

        let errors: Vec<ValidationError> = required
            .iter()
            .filter(|(_, value)| value.is_none_or(|v| v.trim().is_empty()))
            .map(|(field, _)| ValidationError::new(*field, REQUIRED_FIELDS_MISSING))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate a stored issue and return all validation errors found.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any record invariant is violated.
    pub fn validate(issue: &Issue) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        // ID: 24 hex chars.
        if !is_valid_id_format(&issue.id) {
            errors.push(ValidationError::new(
                "_id",
                "invalid format (expected 24 hex characters)",
            ));
        }

        // Required fields never go empty once stored.
        if issue.issue_title.trim().is_empty() {
            errors.push(ValidationError::new("issue_title", "cannot be empty"));
        }
        if issue.issue_text.trim().is_empty() {
            errors.push(ValidationError::new("issue_text", "cannot be empty"));
        }
        if issue.created_by.trim().is_empty() {
            errors.push(ValidationError::new("created_by", "cannot be empty"));
        }

        // Timestamps: created_on <= updated_on.
        if issue.updated_on < issue.created_on {
            errors.push(ValidationError::new(
                "updated_on",
                "cannot be before created_on",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
