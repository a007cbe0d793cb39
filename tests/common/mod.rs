use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use hmac::{Hmac, Mac};
use issue_hook::app_state::AppState;
use issue_hook::linker::ReferenceScanner;
use issue_hook::router;
use issue_hook::store::{Issue, MemoryStore, Project, Store};
use serde_json::{json, Value};
use sha2::Sha256;
use tower::ServiceExt;
use uuid::Uuid;

pub const REPOSITORY: &str = "acme/shop";
pub const SECRET: &str = "It's a Secret to Everybody";

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub project: Project,
    state: Arc<AppState>,
}

impl TestApp {
    pub fn new(webhook_secret: Option<&str>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let project = Project {
            id: Uuid::new_v4(),
            github_owner: "acme".to_string(),
            github_repo: "shop".to_string(),
            webhook_secret: webhook_secret.map(str::to_string),
            project_code: "PROJ".to_string(),
        };
        store.add_project(project.clone());

        let state = Arc::new(AppState::new(
            Some(store.clone() as Arc<dyn Store>),
            ReferenceScanner::new(None).unwrap(),
        ));

        Self {
            store,
            project,
            state,
        }
    }

    pub fn add_issue(&self, display_id: &str) -> Issue {
        let issue = Issue {
            id: Uuid::new_v4(),
            project_id: self.project.id,
            display_id: display_id.to_string(),
        };
        self.store.add_issue(issue.clone());
        issue
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        send(router(self.state.clone()), request).await
    }

    pub async fn push(&self, body: &[u8], signature: Option<&str>) -> (StatusCode, String) {
        self.send(push_request(body, signature)).await
    }
}

pub async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

pub fn push_request(body: &[u8], signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .header("x-github-event", "push");

    if let Some(signature) = signature {
        builder = builder.header("x-hub-signature-256", signature);
    }

    builder.body(Body::from(body.to_vec())).unwrap()
}

pub fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

pub fn commit(sha: &str, message: &str) -> Value {
    json!({
        "id": sha,
        "tree_id": "f9d2a07e9488b91af2641b26b9407fe22a451433",
        "distinct": true,
        "message": message,
        "timestamp": "2024-03-01T10:15:00+01:00",
        "author": { "name": "Ada Lovelace", "email": "ada@example.test", "username": "ada" },
        "committer": { "name": "GitHub", "email": "noreply@github.com", "username": "web-flow" },
        "url": format!("https://github.com/acme/shop/commit/{sha}"),
        "added": ["src/cart.rs"],
        "removed": [],
        "modified": ["src/lib.rs", "Cargo.toml"]
    })
}

pub fn push_body(repository: &str, commits: Vec<Value>) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "ref": "refs/heads/main",
        "before": "0000000000000000000000000000000000000000",
        "after": "6113728f27ae82c7b1a177c8d03f9e96e0adf246",
        "repository": {
            "full_name": repository,
            "html_url": format!("https://github.com/{repository}")
        },
        "pusher": { "name": "ada", "email": "ada@example.test" },
        "commits": commits
    }))
    .unwrap()
}
