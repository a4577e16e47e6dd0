//! Document store abstraction and its in-memory implementation.
//!
//! [`DocumentStore`] is the persistence seam the service talks to.
//! [`InMemoryStore`] keeps issues in a `HashMap` and, when opened against a
//! file, writes the whole collection back to JSONL after every mutation.
//! IDs of deleted issues are kept in a sidecar file next to it
//! (`issues.jsonl` -> `issues.retired.jsonl`) so they stay retired across
//! restarts.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{IssueError, Result};
use crate::jsonl;
use crate::model::Issue;
use crate::query::{IssueFilter, IssueUpdate};
use crate::util;
use crate::validation::IssueValidator;

/// Persistence operations for issue records.
///
/// Every method may block on I/O. Lookups by ID return `MalformedId` when
/// the ID is outside the store's identifier space.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All issues matching `filter`.
    async fn find_many(&self, filter: &IssueFilter) -> Result<Vec<Issue>>;

    /// The issue with this ID, if any.
    async fn find_one(&self, id: &str) -> Result<Option<Issue>>;

    /// Persist a new issue. The store assigns the ID; any ID on the input
    /// is replaced.
    async fn insert(&self, issue: Issue) -> Result<Issue>;

    /// Apply `changes` and set `updated_on`. Returns false if no issue has
    /// this ID.
    async fn update_fields(
        &self,
        id: &str,
        changes: &IssueUpdate,
        updated_on: DateTime<Utc>,
    ) -> Result<bool>;

    /// Remove the issue. Returns false if no issue has this ID.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// True if `id` is in this store's identifier space.
    fn is_valid_id(&self, id: &str) -> bool {
        util::is_valid_id_format(id)
    }
}

#[derive(Default)]
struct StoreState {
    issues: HashMap<String, Issue>,
    /// IDs of deleted issues, never handed out again.
    retired_ids: HashSet<String>,
}

impl StoreState {
    fn id_taken(&self, id: &str) -> bool {
        self.issues.contains_key(id) || self.retired_ids.contains(id)
    }

    fn snapshot(&self) -> Vec<Issue> {
        let mut issues: Vec<Issue> = self.issues.values().cloned().collect();
        sort_issues(&mut issues);
        issues
    }

    fn retired_snapshot(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.retired_ids.iter().cloned().collect();
        ids.sort_unstable();
        ids
    }
}

/// Path of the retired-ID file kept beside `data_path`.
#[must_use]
pub fn retired_ids_path(data_path: &Path) -> PathBuf {
    data_path.with_extension("retired.jsonl")
}

/// Load a JSONL file, treating a missing file as empty.
fn load_or_empty<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    match jsonl::load(path) {
        Ok(records) => Ok(records),
        Err(IssueError::FileNotFound(_)) => {
            debug!(path = %path.display(), "no file yet, starting empty");
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

async fn write_jsonl<T>(path: PathBuf, records: Vec<T>) -> Result<()>
where
    T: Serialize + Send + 'static,
{
    tokio::task::spawn_blocking(move || jsonl::save(&path, &records))
        .await
        .map_err(|e| IssueError::Storage(format!("persist task failed: {e}")))?
}

/// In-memory issue store with optional JSONL persistence.
pub struct InMemoryStore {
    state: RwLock<StoreState>,
    jsonl_path: Option<PathBuf>,
}

impl InMemoryStore {
    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Create a new empty store that never touches disk.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            jsonl_path: None,
        }
    }

    /// Open a store persisted at `path`.
    ///
    /// A missing file yields an empty store; the file is created on the
    /// first write. Retired IDs are read from [`retired_ids_path`].
    ///
    /// # Errors
    ///
    /// Returns `Io` or `JsonlParse` if either file cannot be read, or a
    /// validation error if a stored issue breaks a record invariant.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let loaded: Vec<Issue> = load_or_empty(path)?;
        let retired: Vec<String> = load_or_empty(&retired_ids_path(path))?;

        let mut state = StoreState::default();
        for mut issue in loaded {
            IssueValidator::validate(&issue).map_err(IssueError::from_validation_errors)?;
            issue.id = util::normalize_id(&issue.id);
            state.issues.insert(issue.id.clone(), issue);
        }
        for id in retired {
            if !util::is_valid_id_format(&id) {
                return Err(IssueError::validation("_id", format!("invalid retired ID: {id}")));
            }
            state.retired_ids.insert(util::normalize_id(&id));
        }

        info!(
            path = %path.display(),
            count = state.issues.len(),
            retired = state.retired_ids.len(),
            "loaded issues"
        );

        Ok(Self {
            state: RwLock::new(state),
            jsonl_path: Some(path.to_path_buf()),
        })
    }

    /// Path of the backing JSONL file, if any.
    #[must_use]
    pub fn jsonl_path(&self) -> Option<&Path> {
        self.jsonl_path.as_deref()
    }

    /// Number of stored issues.
    pub async fn len(&self) -> usize {
        self.state.read().await.issues.len()
    }

    /// True if the store holds no issues.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.issues.is_empty()
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn check_id(&self, id: &str) -> Result<String> {
        if self.is_valid_id(id) {
            Ok(util::normalize_id(id))
        } else {
            Err(IssueError::MalformedId { id: id.to_string() })
        }
    }

    /// Write the current issues to the JSONL file, if one is configured.
    ///
    /// Callers hold the write lock so file order follows mutation order.
    async fn persist(&self, state: &StoreState) -> Result<()> {
        let Some(path) = self.jsonl_path.clone() else {
            return Ok(());
        };

        let issues = state.snapshot();
        let count = issues.len();
        write_jsonl(path, issues).await?;

        debug!(count, "persisted issues");
        Ok(())
    }

    /// Write the retired-ID set beside the JSONL file, if one is configured.
    async fn persist_retired(&self, state: &StoreState) -> Result<()> {
        let Some(path) = self.jsonl_path.as_deref().map(retired_ids_path) else {
            return Ok(());
        };

        let ids = state.retired_snapshot();
        let count = ids.len();
        write_jsonl(path, ids).await?;

        debug!(count, "persisted retired ids");
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn find_many(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        let state = self.state.read().await;
        let mut results: Vec<Issue> = state
            .issues
            .values()
            .filter(|issue| filter.matches(issue))
            .cloned()
            .collect();
        sort_issues(&mut results);
        Ok(results)
    }

    async fn find_one(&self, id: &str) -> Result<Option<Issue>> {
        let id = self.check_id(id)?;
        Ok(self.state.read().await.issues.get(&id).cloned())
    }

    async fn insert(&self, issue: Issue) -> Result<Issue> {
        let mut state = self.state.write().await;

        let mut new_issue = issue;
        new_issue.id = util::generate_id(
            &new_issue.issue_title,
            &new_issue.issue_text,
            &new_issue.created_by,
            new_issue.created_on,
            |id| state.id_taken(id),
        );

        let id = new_issue.id.clone();
        state.issues.insert(id.clone(), new_issue.clone());

        if let Err(e) = self.persist(&state).await {
            state.issues.remove(&id);
            return Err(e);
        }

        Ok(new_issue)
    }

    async fn update_fields(
        &self,
        id: &str,
        changes: &IssueUpdate,
        updated_on: DateTime<Utc>,
    ) -> Result<bool> {
        let id = self.check_id(id)?;
        let mut state = self.state.write().await;

        let Some(issue) = state.issues.get_mut(&id) else {
            return Ok(false);
        };

        let previous = issue.clone();
        changes.apply_to(issue);
        issue.updated_on = updated_on.max(issue.created_on);

        if let Err(e) = self.persist(&state).await {
            state.issues.insert(id, previous);
            return Err(e);
        }

        Ok(true)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let id = self.check_id(id)?;
        let mut state = self.state.write().await;

        let Some(removed) = state.issues.remove(&id) else {
            return Ok(false);
        };
        state.retired_ids.insert(id.clone());

        // The ID is retired on disk before the issue leaves the data file.
        let written = match self.persist_retired(&state).await {
            Ok(()) => self.persist(&state).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            state.retired_ids.remove(&id);
            state.issues.insert(id, removed);
            return Err(e);
        }

        Ok(true)
    }
}

/// Oldest first, ID as tie-breaker.
fn sort_issues(issues: &mut [Issue]) {
    issues.sort_by(|a, b| a.created_on.cmp(&b.created_on).then_with(|| a.id.cmp(&b.id)));
}
