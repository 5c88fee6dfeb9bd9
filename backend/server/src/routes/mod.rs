//! HTTP handlers, one module per resource.
//!
//! Handlers read JSON bodies as raw [`axum::body::Bytes`] and run them through
//! the validators themselves, so a bad body is reported field by field in the
//! usual error envelope instead of axum's plain-text rejection.
use axum::response::IntoResponse;
use serde_json::json;

use crate::utils::ok;

pub mod auth;
pub mod images;
pub mod notifications;
pub mod products;
pub mod sections;
pub mod traffic;

pub async fn health() -> impl IntoResponse {
    ok(json!({ "status": "ok" }))
}
