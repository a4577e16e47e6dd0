//! Query and filter types for issue operations.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::model::Issue;

/// Literal marker some clients leave in query values instead of a space.
pub const ENCODED_SPACE: &str = "%20";

/// Replace every encoded-space marker in a query value with a space.
#[must_use]
pub fn clean_query_value(value: &str) -> String {
    value.replace(ENCODED_SPACE, " ")
}

/// Parse a boolean field value (`true`/`false`, any case).
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Equality filter over issue fields. `None` means no constraint.
///
/// Values are kept as the strings the caller sent; each is interpreted
/// against its field's type when matching, and a value that cannot be
/// interpreted matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    pub id: Option<String>,
    pub project_title: Option<String>,
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub open: Option<String>,
    pub created_on: Option<String>,
    pub updated_on: Option<String>,
}

impl IssueFilter {
    /// Build a filter from a project path segment and raw query parameters.
    ///
    /// Empty values are ignored and every value is cleaned of encoded-space
    /// markers. The `issue_text` parameter constrains both `issue_text` and
    /// `issue_title`; an `issue_title` parameter is not consulted. Existing
    /// clients depend on this.
    #[must_use]
    pub fn from_query(project: Option<&str>, params: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            params
                .get(key)
                .map(String::as_str)
                .filter(|v| !v.is_empty())
                .map(clean_query_value)
        };

        let issue_text = get("issue_text");

        Self {
            id: get("_id").or_else(|| get("id")),
            project_title: project.filter(|p| !p.is_empty()).map(clean_query_value),
            issue_title: issue_text.clone(),
            issue_text,
            created_by: get("created_by"),
            assigned_to: get("assigned_to"),
            status_text: get("status_text"),
            open: get("open"),
            created_on: get("created_on"),
            updated_on: get("updated_on"),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.project_title.is_none()
            && self.issue_title.is_none()
            && self.issue_text.is_none()
            && self.created_by.is_none()
            && self.assigned_to.is_none()
            && self.status_text.is_none()
            && self.open.is_none()
            && self.created_on.is_none()
            && self.updated_on.is_none()
    }

    /// True if `issue` satisfies every constraint in the filter.
    #[must_use]
    pub fn matches(&self, issue: &Issue) -> bool {
        if let Some(ref id) = self.id {
            if !id.eq_ignore_ascii_case(&issue.id) {
                return false;
            }
        }

        let text_fields = [
            (&self.project_title, &issue.project_title),
            (&self.issue_title, &issue.issue_title),
            (&self.issue_text, &issue.issue_text),
            (&self.created_by, &issue.created_by),
            (&self.assigned_to, &issue.assigned_to),
            (&self.status_text, &issue.status_text),
        ];
        if !text_fields
            .iter()
            .all(|(wanted, actual)| wanted.as_ref().is_none_or(|w| w == *actual))
        {
            return false;
        }

        if let Some(ref open) = self.open {
            if parse_bool(open) != Some(issue.open) {
                return false;
            }
        }

        timestamp_matches(self.created_on.as_deref(), issue.created_on)
            && timestamp_matches(self.updated_on.as_deref(), issue.updated_on)
    }
}

fn timestamp_matches(wanted: Option<&str>, actual: DateTime<Utc>) -> bool {
    wanted.is_none_or(|w| {
        DateTime::parse_from_rfc3339(w.trim()).is_ok_and(|ts| ts.with_timezone(&Utc) == actual)
    })
}

/// Fields to update on an issue.
///
/// Used both for the caller's candidate values and for the effective
/// change set derived from them with [`IssueUpdate::changes_from`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueUpdate {
    pub project_title: Option<String>,
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub open: Option<bool>,
}

impl IssueUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.project_title.is_none()
            && self.issue_title.is_none()
            && self.issue_text.is_none()
            && self.created_by.is_none()
            && self.assigned_to.is_none()
            && self.status_text.is_none()
            && self.open.is_none()
    }

    /// Keep only the supplied values that differ from `current`.
    ///
    /// Empty strings count as not supplied, so a change set never blanks
    /// a field. Title, text and creator also ignore whitespace-only values,
    /// matching what creation accepts.
    #[must_use]
    pub fn changes_from(&self, current: &Issue) -> Self {
        Self {
            project_title: changed(self.project_title.as_ref(), &current.project_title),
            issue_title: changed_required(self.issue_title.as_ref(), &current.issue_title),
            issue_text: changed_required(self.issue_text.as_ref(), &current.issue_text),
            created_by: changed_required(self.created_by.as_ref(), &current.created_by),
            assigned_to: changed(self.assigned_to.as_ref(), &current.assigned_to),
            status_text: changed(self.status_text.as_ref(), &current.status_text),
            open: self.open.filter(|open| *open != current.open),
        }
    }

    /// Write every present field onto `issue`. Timestamps are untouched.
    pub fn apply_to(&self, issue: &mut Issue) {
        if let Some(ref project) = self.project_title {
            issue.project_title.clone_from(project);
        }
        if let Some(ref title) = self.issue_title {
            issue.issue_title.clone_from(title);
        }
        if let Some(ref text) = self.issue_text {
            issue.issue_text.clone_from(text);
        }
        if let Some(ref created_by) = self.created_by {
            issue.created_by.clone_from(created_by);
        }
        if let Some(ref assigned_to) = self.assigned_to {
            issue.assigned_to.clone_from(assigned_to);
        }
        if let Some(ref status) = self.status_text {
            issue.status_text.clone_from(status);
        }
        if let Some(open) = self.open {
            issue.open = open;
        }
    }

    /// Names of the fields present, for logging.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.project_title.is_some() {
            names.push("project_title");
        }
        if self.issue_title.is_some() {
            names.push("issue_title");
        }
        if self.issue_text.is_some() {
            names.push("issue_text");
        }
        if self.created_by.is_some() {
            names.push("created_by");
        }
        if self.assigned_to.is_some() {
            names.push("assigned_to");
        }
        if self.status_text.is_some() {
            names.push("status_text");
        }
        if self.open.is_some() {
            names.push("open");
        }
        names
    }
}

fn changed(candidate: Option<&String>, current: &str) -> Option<String> {
    candidate
        .filter(|value| !value.is_empty() && value.as_str() != current)
        .cloned()
}

fn changed_required(candidate: Option<&String>, current: &str) -> Option<String> {
    changed(candidate.filter(|value| !value.trim().is_empty()), current)
}
