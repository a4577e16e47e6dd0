//! `issues-lib`: project-scoped issue records over a pluggable document store.
//!
//! The interesting logic lives in two places: [`query::IssueFilter`], which
//! turns loose query parameters into an equality filter, and
//! [`query::IssueUpdate::changes_from`], which reconciles a sparse patch
//! against the stored record. [`IssueService`] strings them together with
//! validation on top of any [`DocumentStore`].
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use issues_lib::{InMemoryStore, IssueFilter, IssueService, IssueUpdate, NewIssue};
//!
//! # async fn demo() -> issues_lib::Result<()> {
//! let store = Arc::new(InMemoryStore::open("data/issues.jsonl")?);
//! let service = IssueService::new(store);
//!
//! let created = service
//!     .create(NewIssue {
//!         issue_title: Some("Broken link".into()),
//!         issue_text: Some("The footer link 404s".into()),
//!         created_by: Some("alice".into()),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! let close = IssueUpdate { open: Some(false), ..Default::default() };
//! service.update(Some(&created.id), &close).await?;
//!
//! let open_issues = service
//!     .list(&IssueFilter { open: Some("true".into()), ..Default::default() })
//!     .await?;
//! # let _ = open_issues;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod jsonl;
pub mod model;
pub mod query;
pub mod service;
pub mod store;
pub mod util;
pub mod validation;

pub use error::{IssueError, Result, ValidationError};
pub use model::{DEFAULT_PROJECT, Issue, NewIssue};
pub use query::{IssueFilter, IssueUpdate, clean_query_value, parse_bool};
pub use service::{IssueService, require_id};
pub use store::{DocumentStore, InMemoryStore};
pub use validation::{IssueValidator, REQUIRED_FIELDS_MISSING};
