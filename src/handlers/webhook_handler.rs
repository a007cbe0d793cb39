use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Serialize;

use crate::app_state::AppState;
use crate::linker::{link_references, ReferenceScanner};
use crate::recorder::record_commit;
use crate::resolver::{resolve_project, Resolution};
use crate::signature::{verify_signature, Verification};
use crate::store::{Project, Store};
use crate::webhook_payloads::github::{GithubCommit, GithubPushWebhookPayload};
use crate::WebhookError;

const HEADER_EVENT: &str = "x-github-event";
const HEADER_SIGNATURE: &str = "x-hub-signature-256";

const PING_EVENT: &str = "ping";
const PUSH_EVENT: &str = "push";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushProcessed {
    pub success: bool,
    /// Commits received in the payload, not commits stored.
    pub processed_commits: usize,
}

pub async fn webhook_handler(
    method: Method,
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match handle_delivery(method, &state, &headers, &body).await {
        Ok(response) => response,
        Err(e) => {
            if e.status().is_server_error() {
                tracing::error!(error = ?e, "Webhook processing failed");
            } else {
                tracing::warn!(error = ?e, "Webhook rejected");
            }

            e.into_response()
        }
    }
}

async fn handle_delivery(
    method: Method,
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Response, WebhookError> {
    if method != Method::POST {
        return Err(WebhookError::MethodNotAllowed);
    }

    let store = state.store().ok_or(WebhookError::NotConfigured)?;

    match header(headers, HEADER_EVENT) {
        Some(PING_EVENT) => return Ok((StatusCode::OK, "pong").into_response()),
        Some(PUSH_EVENT) => {}
        other => {
            let event = other.unwrap_or("unknown");
            tracing::debug!(event, "Ignoring event");
            return Ok((StatusCode::OK, format!("Ignoring event: {event}")).into_response());
        }
    }

    let payload: GithubPushWebhookPayload = serde_json::from_slice(body)?;
    tracing::info!(
        repository = %payload.repository.full_name,
        url = payload.repository.html_url.as_deref().unwrap_or("-"),
        reference = %payload.reference,
        commits = payload.commits.len(),
        "Received push"
    );

    // The secret is per project, so the project has to be known before verifying.
    let project = match resolve_project(store, &payload.repository.full_name).await? {
        Resolution::Resolved(project) => project,
        Resolution::NotTracked => {
            return Ok((StatusCode::OK, "Ignored: Repo not tracked").into_response());
        }
    };

    match verify_signature(
        project.webhook_secret.as_deref(),
        header(headers, HEADER_SIGNATURE),
        body,
    )? {
        Verification::Verified => tracing::debug!(project_id = %project.id, "Signature verified"),
        Verification::SkippedNoSecret => {
            tracing::warn!(project_id = %project.id, "Project has no webhook secret, accepting unsigned push")
        }
    }

    process_push(store, state.scanner(), &project, &payload).await;

    Ok(Json(PushProcessed {
        success: true,
        processed_commits: payload.commits.len(),
    })
    .into_response())
}

async fn process_push(
    store: &dyn Store,
    scanner: &ReferenceScanner,
    project: &Project,
    payload: &GithubPushWebhookPayload,
) {
    let branch = payload.branch();

    for commit in &payload.commits {
        process_commit(store, scanner, project, branch, commit).await;
    }
}

async fn process_commit(
    store: &dyn Store,
    scanner: &ReferenceScanner,
    project: &Project,
    branch: &str,
    commit: &GithubCommit,
) {
    let record = match record_commit(store, project.id, branch, commit).await {
        Ok(record) => record,
        Err(e) => {
            let span = tracing::error_span!("Can't record commit", sha = %commit.id);
            span.in_scope(|| {
                tracing::error!("{e}");
            });

            return;
        }
    };

    let summary = link_references(store, scanner, project, &record, commit).await;
    tracing::info!(
        sha = %record.sha,
        linked = summary.linked,
        unresolved = summary.unresolved,
        foreign = summary.foreign,
        failed = summary.failed,
        "Processed commit"
    );
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
