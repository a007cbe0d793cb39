//! Ingests GitHub push webhooks for the issue tracker.
//!
//! A delivery runs through four stages: ingress checks and signature
//! verification ([`handlers::webhook_handler`], [`signature`]), project
//! resolution ([`resolver`]), commit recording ([`recorder`]) and reference
//! linking ([`linker`]).

pub mod app_state;
pub mod config;
pub mod error;
pub mod git;
pub mod handlers;
pub mod linker;
pub mod recorder;
pub mod resolver;
pub mod signature;
pub mod store;
pub mod webhook_payloads;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{any, get};
use axum::{Extension, Router};

use app_state::AppState;
use handlers::health_handler::health_handler;
use handlers::webhook_handler::webhook_handler;

pub use error::{Result, WebhookError};

/// GitHub caps webhook payloads at 25 MB.
const MAX_PAYLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", any(webhook_handler))
        .route("/webhook", any(webhook_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(MAX_PAYLOAD_BYTES))
        .layer(Extension(state))
}
