//! Core data types for issues-lib.
//!
//! Field names match the wire format clients already speak, so `Issue`
//! serializes directly into API responses and JSONL lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Project used when a caller does not name one.
pub const DEFAULT_PROJECT: &str = "apitest";

const fn default_open() -> bool {
    true
}

/// The primary issue entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    /// Store-assigned ID (24 hex chars). Empty until inserted.
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    /// Project this issue belongs to.
    #[serde(default)]
    pub project_title: String,

    pub issue_title: String,

    pub issue_text: String,

    pub created_by: String,

    /// Assigned user (empty when unassigned).
    #[serde(default)]
    pub assigned_to: String,

    /// Free-form status line.
    #[serde(default)]
    pub status_text: String,

    /// Open/closed flag.
    #[serde(default = "default_open")]
    pub open: bool,

    /// Creation timestamp. Never mutated.
    pub created_on: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_on: DateTime<Utc>,
}

impl Default for Issue {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            project_title: DEFAULT_PROJECT.to_string(),
            issue_title: String::new(),
            issue_text: String::new(),
            created_by: String::new(),
            assigned_to: String::new(),
            status_text: String::new(),
            open: true,
            created_on: now,
            updated_on: now,
        }
    }
}

/// Caller-supplied fields for creating an issue.
///
/// Required fields are optional here so that absence can be reported as a
/// validation outcome rather than a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewIssue {
    pub project_title: Option<String>,
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
}

impl NewIssue {
    /// Build the record to persist: defaults applied, `open = true`,
    /// both timestamps set to `now`, ID left for the store to assign.
    #[must_use]
    pub fn into_issue(self, now: DateTime<Utc>) -> Issue {
        Issue {
            id: String::new(),
            project_title: self
                .project_title
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| DEFAULT_PROJECT.to_string()),
            issue_title: self.issue_title.unwrap_or_default(),
            issue_text: self.issue_text.unwrap_or_default(),
            created_by: self.created_by.unwrap_or_default(),
            assigned_to: self.assigned_to.unwrap_or_default(),
            status_text: self.status_text.unwrap_or_default(),
            open: true,
            created_on: now,
            updated_on: now,
        }
    }
}
