use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub github_owner: String,
    pub github_repo: String,
    #[serde(default)]
    pub webhook_secret: Option<String>,
    /// Prefix of every issue display id in this project, e.g. `ECOM`.
    pub project_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: Uuid,
    pub project_id: Uuid,
    #[serde(rename = "bug_display_id")]
    pub display_id: String,
}

/// Row written for every commit of a tracked push.
///
/// `additions` and `deletions` count files, not lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCommit {
    pub project_id: Uuid,
    pub sha: String,
    pub message: String,
    pub author_name: String,
    pub github_username: Option<String>,
    pub branch: String,
    pub files_changed: usize,
    pub additions: usize,
    pub deletions: usize,
    pub url: String,
    pub committed_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub id: Uuid,
    pub project_id: Uuid,
    pub sha: String,
    pub branch: String,
    pub files_changed: usize,
    pub additions: usize,
    pub deletions: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitIssueLink {
    pub commit_id: Uuid,
    #[serde(rename = "bug_id")]
    pub issue_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    CommitLinked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitLinkedMetadata {
    pub commit_sha: String,
    pub commit_url: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewActivity {
    #[serde(rename = "bug_id")]
    pub issue_id: Uuid,
    pub action: ActivityAction,
    pub metadata: CommitLinkedMetadata,
}

impl NewActivity {
    pub fn commit_linked(issue_id: Uuid, metadata: CommitLinkedMetadata) -> Self {
        Self {
            issue_id,
            action: ActivityAction::CommitLinked,
            metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityLogEntry {
    pub id: Uuid,
    pub issue_id: Uuid,
    pub action: ActivityAction,
    pub metadata: CommitLinkedMetadata,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn activity_serializes_to_activity_log_columns() {
        let issue_id = Uuid::new_v4();
        let entry = NewActivity::commit_linked(
            issue_id,
            CommitLinkedMetadata {
                commit_sha: "abc".to_string(),
                commit_url: "https://example.test/abc".to_string(),
                message: "Fixes ECOM-1".to_string(),
            },
        );

        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "bug_id": issue_id,
                "action": "commit_linked",
                "metadata": {
                    "commit_sha": "abc",
                    "commit_url": "https://example.test/abc",
                    "message": "Fixes ECOM-1"
                }
            })
        );
    }

    #[test]
    fn issue_reads_display_id_column() {
        let issue: Issue = serde_json::from_value(json!({
            "id": Uuid::nil(),
            "project_id": Uuid::nil(),
            "bug_display_id": "ECOM-4",
            "title": "ignored"
        }))
        .unwrap();

        assert_eq!(issue.display_id, "ECOM-4");
    }
}
