use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use catalog::{admins::AdminProfile, notifications::Notification};
use serde::Serialize;
use serde_json::json;

use crate::{
    error::AppError,
    state::AppState,
    utils::{Paginated, ok},
    validation::query::notification_query,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFeed {
    #[serde(flatten)]
    pub page: Paginated<Notification>,
    pub unread_count: u64,
}

/// A notification together with the admin who caused it. `sender` is `None`
/// when that admin record no longer exists.
#[derive(Debug, Serialize)]
pub struct ActivityEntry {
    #[serde(flatten)]
    pub notification: Notification,
    pub sender: Option<AdminProfile>,
}

pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let query = notification_query(&params)?;
    let (items, total) = state.store.list_notifications(&query).await?;
    let unread_count = state.store.count_unread().await?;

    Ok(ok(NotificationFeed {
        page: Paginated::new(items, total, &query.pagination),
        unread_count,
    }))
}

/// Idempotent: marking an already read notification succeeds again.
pub async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    Path(notification_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let notification = state
        .store
        .mark_notification_read(&notification_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(
                "notificationId",
                format!("Notification {notification_id} not found"),
            )
        })?;

    Ok(ok(notification))
}

pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.store.mark_all_read().await?;

    Ok(ok(json!({ "updated": updated })))
}

pub async fn list_activity(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let query = notification_query(&params)?;
    let (items, total) = state.store.list_notifications(&query).await?;

    let sender_ids: HashSet<&str> = items.iter().map(|n| n.sender_id.as_str()).collect();
    let mut senders = HashMap::new();
    for id in sender_ids {
        if let Some(admin) = state.store.find_admin(id).await? {
            senders.insert(id.to_string(), AdminProfile::from(&admin));
        }
    }

    let page = Paginated::new(items, total, &query.pagination).map(|notification| {
        let sender = senders.get(&notification.sender_id).cloned();
        ActivityEntry {
            notification,
            sender,
        }
    });

    Ok(ok(page))
}
