use uuid::Uuid;

use crate::store::{CommitRecord, NewCommit, Store, StoreError};
use crate::webhook_payloads::github::GithubCommit;

impl NewCommit {
    pub fn from_payload(project_id: Uuid, branch: &str, commit: &GithubCommit) -> Self {
        NewCommit {
            project_id,
            sha: commit.id.clone(),
            message: commit.message.clone(),
            author_name: commit.author.name.clone(),
            github_username: commit.author.username.clone(),
            branch: branch.to_string(),
            files_changed: commit.files_changed(),
            additions: commit.added.len(),
            deletions: commit.removed.len(),
            url: commit.url.clone(),
            committed_at: commit.timestamp,
        }
    }
}

/// Writes one commit of a push. Redelivered commits return the stored row.
pub async fn record_commit(
    store: &dyn Store,
    project_id: Uuid,
    branch: &str,
    commit: &GithubCommit,
) -> Result<CommitRecord, StoreError> {
    let new_commit = NewCommit::from_payload(project_id, branch, commit);
    let record = store.upsert_commit(&new_commit).await?;

    tracing::debug!(
        sha = %record.sha,
        commit_id = %record.id,
        files_changed = record.files_changed,
        "Recorded commit"
    );

    Ok(record)
}
