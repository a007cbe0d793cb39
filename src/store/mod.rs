//! Access to the tracker's relational store.
//!
//! The webhook pipeline only ever needs five operations, so the store is a
//! narrow trait. [`PostgrestStore`] talks to the hosted REST backend,
//! [`MemoryStore`] keeps everything in process with the same uniqueness rules.

mod memory;
mod models;
mod postgrest;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use models::{
    ActivityAction, ActivityLogEntry, CommitIssueLink, CommitLinkedMetadata, CommitRecord, Issue,
    NewActivity, NewCommit, Project,
};
pub use postgrest::PostgrestStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store rejected {table} request with status {status}: {body}")]
    Rejected {
        table: &'static str,
        status: u16,
        body: String,
    },
    #[error("expected a single {table} row, got {count}")]
    Ambiguous { table: &'static str, count: usize },
    #[error("unexpected {table} response: {reason}")]
    Decode { table: &'static str, reason: String },
    #[error("unique constraint violated on {0}")]
    Conflict(&'static str),
}

impl StoreError {
    /// Whether retrying the same request later can succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Single-row lookup on exact `(github_owner, github_repo)`.
    async fn find_project(&self, owner: &str, repo: &str) -> Result<Option<Project>, StoreError>;

    /// Insert, or return the existing row for `(project_id, sha)`.
    async fn upsert_commit(&self, commit: &NewCommit) -> Result<CommitRecord, StoreError>;

    /// Single-row lookup of a project's issue by display id.
    async fn find_issue(
        &self,
        project_id: Uuid,
        display_id: &str,
    ) -> Result<Option<Issue>, StoreError>;

    /// No-op when the `(commit_id, issue_id)` pair already exists.
    async fn upsert_commit_issue_link(&self, link: &CommitIssueLink) -> Result<(), StoreError>;

    async fn insert_activity(&self, entry: &NewActivity) -> Result<(), StoreError>;
}
