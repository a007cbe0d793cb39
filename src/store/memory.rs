use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::{DashMap, DashSet};
use uuid::Uuid;

use super::{
    ActivityLogEntry, CommitIssueLink, CommitRecord, Issue, NewActivity, NewCommit, Project, Store,
    StoreError,
};

/// In-process store with the same uniqueness rules as the hosted schema:
/// one commit per `(project_id, sha)` and one link per `(commit_id, issue_id)`.
#[derive(Default)]
pub struct MemoryStore {
    projects: DashMap<Uuid, Project>,
    issues: DashMap<Uuid, Issue>,
    commits: DashMap<(Uuid, String), CommitRecord>,
    links: DashSet<CommitIssueLink>,
    activity: DashMap<usize, ActivityLogEntry>,
    activity_seq: AtomicUsize,
    failing_commits: DashSet<String>,
    failing_issue_lookups: DashSet<String>,
    failing_links: DashSet<Uuid>,
    failing_activity: DashSet<Uuid>,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_project(&self, project: Project) {
        self.projects.insert(project.id, project);
    }

    pub fn add_issue(&self, issue: Issue) {
        self.issues.insert(issue.id, issue);
    }

    /// Makes every later write of commit `sha` fail.
    pub fn fail_commit(&self, sha: &str) {
        self.failing_commits.insert(sha.to_string());
    }

    /// Makes every later lookup of `display_id` fail.
    pub fn fail_issue_lookup(&self, display_id: &str) {
        self.failing_issue_lookups.insert(display_id.to_string());
    }

    /// Makes every later link write to `issue_id` fail.
    pub fn fail_link(&self, issue_id: Uuid) {
        self.failing_links.insert(issue_id);
    }

    /// Makes every later activity write for `issue_id` fail.
    pub fn fail_activity(&self, issue_id: Uuid) {
        self.failing_activity.insert(issue_id);
    }

    /// Number of store operations served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> Vec<CommitRecord> {
        self.commits.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn commit(&self, project_id: Uuid, sha: &str) -> Option<CommitRecord> {
        self.commits
            .get(&(project_id, sha.to_string()))
            .map(|entry| entry.value().clone())
    }

    pub fn links(&self) -> Vec<CommitIssueLink> {
        self.links.iter().map(|link| *link).collect()
    }

    /// Activity of every issue, oldest first.
    pub fn activity(&self) -> Vec<ActivityLogEntry> {
        let mut entries: Vec<_> = self
            .activity
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, entry)| entry).collect()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn simulated(table: &'static str, what: impl std::fmt::Display) -> StoreError {
    StoreError::Unavailable(format!("{table}: simulated failure for {what}"))
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_project(&self, owner: &str, repo: &str) -> Result<Option<Project>, StoreError> {
        self.record_call();

        let mut matches: Vec<Project> = self
            .projects
            .iter()
            .filter(|p| p.github_owner == owner && p.github_repo == repo)
            .map(|p| p.value().clone())
            .collect();

        match matches.len() {
            0 | 1 => Ok(matches.pop()),
            count => Err(StoreError::Ambiguous {
                table: "projects",
                count,
            }),
        }
    }

    async fn upsert_commit(&self, commit: &NewCommit) -> Result<CommitRecord, StoreError> {
        self.record_call();

        if self.failing_commits.contains(&commit.sha) {
            return Err(StoreError::Rejected {
                table: "commits",
                status: 400,
                body: format!("simulated failure for {}", commit.sha),
            });
        }

        let record = self
            .commits
            .entry((commit.project_id, commit.sha.clone()))
            .or_insert_with(|| CommitRecord {
                id: Uuid::now_v7(),
                project_id: commit.project_id,
                sha: commit.sha.clone(),
                branch: commit.branch.clone(),
                files_changed: commit.files_changed,
                additions: commit.additions,
                deletions: commit.deletions,
            });

        Ok(record.value().clone())
    }

    async fn find_issue(
        &self,
        project_id: Uuid,
        display_id: &str,
    ) -> Result<Option<Issue>, StoreError> {
        self.record_call();

        if self.failing_issue_lookups.contains(display_id) {
            return Err(simulated("bugs", display_id));
        }

        Ok(self
            .issues
            .iter()
            .find(|i| i.project_id == project_id && i.display_id == display_id)
            .map(|i| i.value().clone()))
    }

    async fn upsert_commit_issue_link(&self, link: &CommitIssueLink) -> Result<(), StoreError> {
        self.record_call();

        if self.failing_links.contains(&link.issue_id) {
            return Err(simulated("commit_bug_links", link.issue_id));
        }

        self.links.insert(*link);
        Ok(())
    }

    async fn insert_activity(&self, entry: &NewActivity) -> Result<(), StoreError> {
        self.record_call();

        if self.failing_activity.contains(&entry.issue_id) {
            return Err(simulated("activity_log", entry.issue_id));
        }

        let seq = self.activity_seq.fetch_add(1, Ordering::SeqCst);
        self.activity.insert(
            seq,
            ActivityLogEntry {
                id: Uuid::now_v7(),
                issue_id: entry.issue_id,
                action: entry.action,
                metadata: entry.metadata.clone(),
                created_at: Utc::now(),
            },
        );
        Ok(())
    }
}
