//! Issue service: list, create, update and delete over a [`DocumentStore`].
//!
//! Update and delete read, then write. There is no locking across the two
//! steps, so concurrent writers to the same ID race and the last one wins.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{IssueError, Result};
use crate::model::{Issue, NewIssue};
use crate::query::{IssueFilter, IssueUpdate};
use crate::store::DocumentStore;
use crate::validation::IssueValidator;

/// Return the ID if one was supplied.
///
/// # Errors
///
/// Returns `MissingId` if `id` is absent or blank.
pub fn require_id(id: Option<&str>) -> Result<&str> {
    match id.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(IssueError::MissingId),
    }
}

/// The canonical issue operations.
#[derive(Clone)]
pub struct IssueService {
    store: Arc<dyn DocumentStore>,
}

impl IssueService {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Issues matching every constraint in `filter`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be read.
    pub async fn list(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        debug!(?filter, "listing issues");
        self.store.find_many(filter).await
    }

    /// Validate and persist a new issue.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a required field is missing or empty;
    /// nothing is written in that case.
    pub async fn create(&self, input: NewIssue) -> Result<Issue> {
        if let Err(errors) = IssueValidator::validate_new(&input) {
            debug!(?errors, "rejecting issue with missing fields");
            return Err(IssueError::from_validation_errors(errors));
        }

        let created = self.store.insert(input.into_issue(Utc::now())).await?;
        info!(id = %created.id, project = %created.project_title, "created issue");
        Ok(created)
    }

    /// Apply the fields of `patch` that differ from the stored issue.
    ///
    /// Returns the ID that was updated.
    ///
    /// # Errors
    ///
    /// - `MissingId` if no ID was supplied.
    /// - `UpdateFailed` if the ID is malformed or unknown.
    /// - `NoUpdateFields` if nothing in `patch` differs from the stored issue.
    pub async fn update(&self, id: Option<&str>, patch: &IssueUpdate) -> Result<String> {
        let id = require_id(id)?;
        let update_failed = || IssueError::UpdateFailed { id: id.to_string() };

        if !self.store.is_valid_id(id) {
            debug!(id, "update rejected: malformed id");
            return Err(update_failed());
        }

        let current = match self.store.find_one(id).await {
            Ok(Some(issue)) => issue,
            Ok(None) | Err(IssueError::MalformedId { .. }) => return Err(update_failed()),
            Err(e) => return Err(e),
        };

        let changes = patch.changes_from(&current);
        if changes.is_empty() {
            debug!(id, supplied = ?patch.field_names(), "update rejected: nothing changed");
            return Err(IssueError::NoUpdateFields { id: id.to_string() });
        }

        match self.store.update_fields(id, &changes, Utc::now()).await {
            Ok(true) => {}
            // Deleted between the read and the write.
            Ok(false) | Err(IssueError::MalformedId { .. }) => return Err(update_failed()),
            Err(e) => return Err(e),
        }

        info!(id, fields = ?changes.field_names(), "updated issue");
        Ok(id.to_string())
    }

    /// Remove an issue.
    ///
    /// Returns the ID that was deleted.
    ///
    /// # Errors
    ///
    /// - `MissingId` if no ID was supplied.
    /// - `DeleteFailed` if the ID is malformed or unknown.
    pub async fn delete(&self, id: Option<&str>) -> Result<String> {
        let id = require_id(id)?;

        match self.store.delete(id).await {
            Ok(true) => {
                info!(id, "deleted issue");
                Ok(id.to_string())
            }
            Ok(false) | Err(IssueError::MalformedId { .. }) => {
                debug!(id, "delete rejected: no such issue");
                Err(IssueError::DeleteFailed { id: id.to_string() })
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use crate::validation::REQUIRED_FIELDS_MISSING;
    use std::time::Duration;

    fn service() -> (IssueService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (IssueService::new(store.clone()), store)
    }

    fn full_input() -> NewIssue {
        NewIssue {
            project_title: Some("apitest".to_string()),
            issue_title: Some("Title".to_string()),
            issue_text: Some("Text".to_string()),
            created_by: Some("Creator".to_string()),
            assigned_to: Some("Assignee".to_string()),
            status_text: Some("Status".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_echoes_input() {
        let (service, _) = service();
        let created = service.create(full_input()).await.unwrap();

        assert_eq!(created.project_title, "apitest");
        assert_eq!(created.issue_title, "Title");
        assert_eq!(created.issue_text, "Text");
        assert_eq!(created.created_by, "Creator");
        assert_eq!(created.assigned_to, "Assignee");
        assert_eq!(created.status_text, "Status");
        assert!(created.open);
        assert_eq!(created.created_on, created.updated_on);
    }

    #[tokio::test]
    async fn test_create_missing_required_writes_nothing() {
        let (service, store) = service();
        for strip in ["issue_title", "issue_text", "created_by"] {
            let mut input = full_input();
            match strip {
                "issue_title" => input.issue_title = None,
                "issue_text" => input.issue_text = Some(String::new()),
                _ => input.created_by = None,
            }
            let err = service.create(input).await.unwrap_err();
            assert!(
                matches!(err, IssueError::Validation { ref reason, .. } if reason == REQUIRED_FIELDS_MISSING),
                "unexpected error for {strip}: {err:?}"
            );
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_list_by_id_roundtrip() {
        let (service, _) = service();
        let created = service.create(full_input()).await.unwrap();
        let filter = IssueFilter {
            id: Some(created.id.clone()),
            ..Default::default()
        };
        assert_eq!(service.list(&filter).await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn test_list_intersection() {
        let (service, _) = service();
        let a = service.create(full_input()).await.unwrap();
        let _b = service
            .create(NewIssue {
                assigned_to: Some("Someone else".to_string()),
                ..full_input()
            })
            .await
            .unwrap();

        let filter = IssueFilter {
            created_by: Some("Creator".to_string()),
            assigned_to: Some("Assignee".to_string()),
            ..Default::default()
        };
        let found = service.list(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, a.id);
    }

    #[tokio::test]
    async fn test_update_missing_id() {
        let (service, _) = service();
        let patch = IssueUpdate {
            issue_title: Some("X".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            service.update(None, &patch).await,
            Err(IssueError::MissingId)
        ));
        assert!(matches!(
            service.update(Some("  "), &patch).await,
            Err(IssueError::MissingId)
        ));
    }

    #[tokio::test]
    async fn test_update_malformed_and_unknown_id() {
        let (service, _) = service();
        let patch = IssueUpdate {
            issue_title: Some("X".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            service.update(Some("invalid"), &patch).await,
            Err(IssueError::UpdateFailed { ref id }) if id == "invalid"
        ));
        assert!(matches!(
            service.update(Some("000000000000000000000000"), &patch).await,
            Err(IssueError::UpdateFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_unchanged_values_is_no_update() {
        let (service, _) = service();
        let created = service.create(full_input()).await.unwrap();

        let empty = IssueUpdate::default();
        assert!(matches!(
            service.update(Some(&created.id), &empty).await,
            Err(IssueError::NoUpdateFields { .. })
        ));

        let same = IssueUpdate {
            issue_title: Some("Title".to_string()),
            open: Some(true),
            ..Default::default()
        };
        assert!(matches!(
            service.update(Some(&created.id), &same).await,
            Err(IssueError::NoUpdateFields { ref id }) if *id == created.id
        ));
    }

    #[tokio::test]
    async fn test_update_changes_one_field() {
        let (service, store) = service();
        let created = service.create(full_input()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        let patch = IssueUpdate {
            issue_text: Some("New text".to_string()),
            ..Default::default()
        };
        let id = service.update(Some(&created.id), &patch).await.unwrap();
        assert_eq!(id, created.id);

        let stored = store.find_one(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.issue_text, "New text");
        assert!(stored.updated_on > created.updated_on);
        assert_eq!(
            Issue {
                issue_text: created.issue_text.clone(),
                updated_on: created.updated_on,
                ..stored
            },
            created
        );
    }

    #[tokio::test]
    async fn test_update_close_issue() {
        let (service, store) = service();
        let created = service.create(full_input()).await.unwrap();

        let patch = IssueUpdate {
            open: Some(false),
            assigned_to: Some("Assignee".to_string()),
            ..Default::default()
        };
        service.update(Some(&created.id), &patch).await.unwrap();

        let stored = store.find_one(&created.id).await.unwrap().unwrap();
        assert!(!stored.open);
        assert_eq!(stored.assigned_to, "Assignee");
    }

    #[tokio::test]
    async fn test_delete_is_not_idempotent() {
        let (service, _) = service();
        let created = service.create(full_input()).await.unwrap();

        assert_eq!(service.delete(Some(&created.id)).await.unwrap(), created.id);
        assert!(matches!(
            service.delete(Some(&created.id)).await,
            Err(IssueError::DeleteFailed { .. })
        ));

        let patch = IssueUpdate {
            issue_title: Some("Again".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            service.update(Some(&created.id), &patch).await,
            Err(IssueError::UpdateFailed { .. })
        ));
        let filter = IssueFilter {
            id: Some(created.id.clone()),
            ..Default::default()
        };
        assert!(service.list(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_and_malformed_id() {
        let (service, _) = service();
        assert!(matches!(
            service.delete(None).await,
            Err(IssueError::MissingId)
        ));
        assert!(matches!(
            service.delete(Some("nope")).await,
            Err(IssueError::DeleteFailed { ref id }) if id == "nope"
        ));
    }

    /// Accepts every ID up front, leaving the lookup to reject it.
    struct PermissiveIdStore(InMemoryStore);

    #[async_trait::async_trait]
    impl DocumentStore for PermissiveIdStore {
        async fn find_many(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
            self.0.find_many(filter).await
        }

        async fn find_one(&self, id: &str) -> Result<Option<Issue>> {
            self.0.find_one(id).await
        }

        async fn insert(&self, issue: Issue) -> Result<Issue> {
            self.0.insert(issue).await
        }

        async fn update_fields(
            &self,
            id: &str,
            changes: &IssueUpdate,
            updated_on: chrono::DateTime<Utc>,
        ) -> Result<bool> {
            self.0.update_fields(id, changes, updated_on).await
        }

        async fn delete(&self, id: &str) -> Result<bool> {
            self.0.delete(id).await
        }

        fn is_valid_id(&self, _id: &str) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_store_rejected_id_is_could_not_update_or_delete() {
        let service = IssueService::new(Arc::new(PermissiveIdStore(InMemoryStore::new())));
        let patch = IssueUpdate {
            issue_title: Some("New".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            service.update(Some("not-hex"), &patch).await,
            Err(IssueError::UpdateFailed { ref id }) if id == "not-hex"
        ));
        assert!(matches!(
            service.delete(Some("not-hex")).await,
            Err(IssueError::DeleteFailed { ref id }) if id == "not-hex"
        ));
    }
}
