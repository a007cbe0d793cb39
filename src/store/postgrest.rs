use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::{CommitIssueLink, CommitRecord, Issue, NewActivity, NewCommit, Project, Store, StoreError};

const PROJECTS: &str = "projects";
const COMMITS: &str = "commits";
const ISSUES: &str = "bugs";
const COMMIT_ISSUE_LINKS: &str = "commit_bug_links";
const ACTIVITY_LOG: &str = "activity_log";

const PROJECT_COLUMNS: &str = "id,github_owner,github_repo,webhook_secret,project_code";
const ISSUE_COLUMNS: &str = "id,project_id,bug_display_id";
const COMMIT_COLUMNS: &str = "id,project_id,sha,branch,files_changed,additions,deletions";

// Commit rows are immutable once written, so conflicts must never update.
const COMMIT_UPSERT_PREFER: &str = "resolution=ignore-duplicates,return=representation";

/// Client for the hosted PostgREST endpoint (`<base>/rest/v1/<table>`),
/// authenticated with the service role key.
pub struct PostgrestStore {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl PostgrestStore {
    pub fn new(base_url: &str, service_key: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn send(table: &'static str, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("{table}: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(table, status, body))
    }

    async fn rows<T: DeserializeOwned>(
        table: &'static str,
        response: Response,
    ) -> Result<Vec<T>, StoreError> {
        response.json::<Vec<T>>().await.map_err(|e| StoreError::Decode {
            table,
            reason: e.to_string(),
        })
    }

    fn commit_upsert_request(&self, commit: &NewCommit) -> RequestBuilder {
        self.request(Method::POST, COMMITS)
            .query(&[("on_conflict", "project_id,sha")])
            .header("Prefer", COMMIT_UPSERT_PREFER)
            .json(commit)
    }

    /// `select` that treats zero rows as `None` and more than one as an error.
    async fn select_single<T: DeserializeOwned>(
        &self,
        table: &'static str,
        columns: &str,
        filters: &[(&str, String)],
    ) -> Result<Option<T>, StoreError> {
        let request = self
            .request(Method::GET, table)
            .query(&[("select", columns)])
            .query(filters)
            .query(&[("limit", "2")]);

        let mut rows = Self::rows::<T>(table, Self::send(table, request).await?).await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            count => Err(StoreError::Ambiguous { table, count }),
        }
    }
}

fn status_error(table: &'static str, status: StatusCode, body: String) -> StoreError {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        return StoreError::Unavailable(format!("{table}: {status}: {body}"));
    }

    if status == StatusCode::CONFLICT {
        return StoreError::Conflict(table);
    }

    StoreError::Rejected {
        table,
        status: status.as_u16(),
        body,
    }
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

#[async_trait]
impl Store for PostgrestStore {
    async fn find_project(&self, owner: &str, repo: &str) -> Result<Option<Project>, StoreError> {
        self.select_single(
            PROJECTS,
            PROJECT_COLUMNS,
            &[("github_owner", eq(owner)), ("github_repo", eq(repo))],
        )
        .await
    }

    async fn upsert_commit(&self, commit: &NewCommit) -> Result<CommitRecord, StoreError> {
        let response = Self::send(COMMITS, self.commit_upsert_request(commit)).await?;
        if let Some(record) = Self::rows::<CommitRecord>(COMMITS, response).await?.pop() {
            return Ok(record);
        }

        // Duplicate: nothing was written and nothing returned, read the stored row.
        self.select_single(
            COMMITS,
            COMMIT_COLUMNS,
            &[("project_id", eq(commit.project_id)), ("sha", eq(&commit.sha))],
        )
        .await?
        .ok_or_else(|| StoreError::Decode {
            table: COMMITS,
            reason: format!("no row returned for commit {}", commit.sha),
        })
    }

    async fn find_issue(
        &self,
        project_id: Uuid,
        display_id: &str,
    ) -> Result<Option<Issue>, StoreError> {
        self.select_single(
            ISSUES,
            ISSUE_COLUMNS,
            &[("project_id", eq(project_id)), ("bug_display_id", eq(display_id))],
        )
        .await
    }

    async fn upsert_commit_issue_link(&self, link: &CommitIssueLink) -> Result<(), StoreError> {
        let request = self
            .request(Method::POST, COMMIT_ISSUE_LINKS)
            .query(&[("on_conflict", "commit_id,bug_id")])
            .header("Prefer", "resolution=ignore-duplicates,return=minimal")
            .json(link);

        Self::send(COMMIT_ISSUE_LINKS, request).await?;
        Ok(())
    }

    async fn insert_activity(&self, entry: &NewActivity) -> Result<(), StoreError> {
        let request = self
            .request(Method::POST, ACTIVITY_LOG)
            .header("Prefer", "return=minimal")
            .json(entry);

        Self::send(ACTIVITY_LOG, request).await?;
        Ok(())
    }
}
