//! Links commits to the issues their messages mention.
//!
//! Issue display ids look like `ECOM-12`: the project code, a dash and the
//! per-project issue number.

use regex::Regex;
use uuid::Uuid;

use crate::store::{
    CommitIssueLink, CommitLinkedMetadata, CommitRecord, NewActivity, Project, Store, StoreError,
};
use crate::webhook_payloads::github::GithubCommit;

const DISPLAY_ID_PATTERN: &str = "[A-Z]+-[0-9]+";

/// Finds issue references in commit messages.
///
/// With a tag such as `BUG-`, only `BUG-ECOM-12` counts as a reference and the
/// display id is the part after the tag. Without one every standalone
/// `ECOM-12` does, but not the one inside `fooECOM-12` or `ECOM-12a`.
#[derive(Debug, Clone)]
pub struct ReferenceScanner {
    pattern: Regex,
}

impl ReferenceScanner {
    pub fn new(tag: Option<&str>) -> Result<Self, regex::Error> {
        let pattern = match tag.filter(|tag| !tag.is_empty()) {
            Some(tag) => format!(r"{}({DISPLAY_ID_PATTERN})\b", regex::escape(tag)),
            None => format!(r"\b({DISPLAY_ID_PATTERN})\b"),
        };

        Ok(Self {
            pattern: Regex::new(&pattern)?,
        })
    }

    /// All referenced display ids, first mention first, each once.
    pub fn scan<'a>(&self, message: &'a str) -> Vec<&'a str> {
        let mut display_ids: Vec<&str> = Vec::new();

        for captures in self.pattern.captures_iter(message) {
            if let Some(display_id) = captures.get(1).map(|m| m.as_str()) {
                if !display_ids.contains(&display_id) {
                    display_ids.push(display_id);
                }
            }
        }

        display_ids
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LinkSummary {
    pub linked: usize,
    pub unresolved: usize,
    /// References to another project's code, skipped without a lookup.
    pub foreign: usize,
    pub failed: usize,
}

enum LinkOutcome {
    Linked(Uuid),
    Unresolved,
}

/// Links `record` to every issue of `project` that `commit` mentions.
///
/// Only references carrying the project's own code are looked up. Each
/// reference is handled on its own: a failed lookup or write is logged
/// and counted, and the remaining references are still processed.
pub async fn link_references(
    store: &dyn Store,
    scanner: &ReferenceScanner,
    project: &Project,
    record: &CommitRecord,
    commit: &GithubCommit,
) -> LinkSummary {
    let mut summary = LinkSummary::default();
    let own_prefix = format!("{}-", project.project_code);

    for display_id in scanner.scan(&commit.message) {
        if !display_id.starts_with(&own_prefix) {
            tracing::debug!(sha = %record.sha, %display_id, "Reference to another project");
            summary.foreign += 1;
            continue;
        }

        match link_reference(store, project, record, commit, display_id).await {
            Ok(LinkOutcome::Linked(issue_id)) => {
                tracing::info!(sha = %record.sha, %display_id, %issue_id, "Linked commit to issue");
                summary.linked += 1;
            }
            Ok(LinkOutcome::Unresolved) => {
                tracing::debug!(sha = %record.sha, %display_id, "No issue for reference");
                summary.unresolved += 1;
            }
            Err(e) => {
                let span = tracing::error_span!("Can't link reference", sha = %record.sha, %display_id);
                span.in_scope(|| {
                    tracing::error!("{e}");
                });
                summary.failed += 1;
            }
        }
    }

    summary
}

async fn link_reference(
    store: &dyn Store,
    project: &Project,
    record: &CommitRecord,
    commit: &GithubCommit,
    display_id: &str,
) -> Result<LinkOutcome, StoreError> {
    let Some(issue) = store.find_issue(project.id, display_id).await? else {
        return Ok(LinkOutcome::Unresolved);
    };

    let link = CommitIssueLink {
        commit_id: record.id,
        issue_id: issue.id,
    };
    store.upsert_commit_issue_link(&link).await?;

    let metadata = CommitLinkedMetadata {
        commit_sha: commit.id.clone(),
        commit_url: commit.url.clone(),
        message: commit.message.clone(),
    };
    store
        .insert_activity(&NewActivity::commit_linked(issue.id, metadata))
        .await?;

    Ok(LinkOutcome::Linked(issue.id))
}
