use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use catalog::traffic::{Month, Visit};
use chrono::Utc;
use serde::Serialize;

use crate::{
    error::AppError,
    state::AppState,
    store::{Store, new_id},
    utils::{created, ok},
    validation::query::traffic_month,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficReport {
    pub month: String,
    pub count: u64,
    pub previous_month: String,
    pub previous_count: u64,
}

async fn count(store: &dyn Store, month: Month) -> Result<u64, AppError> {
    let (from, to) = month.range();
    Ok(store.count_visits(from, to).await?)
}

pub async fn record_visit(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let visit = Visit {
        id: new_id(),
        visited_at: Utc::now(),
    };
    state.store.record_visit(&visit).await?;

    Ok(created(visit))
}

pub async fn monthly_traffic(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let month = traffic_month(&params, Utc::now())?;
    let previous = month.previous();

    Ok(ok(TrafficReport {
        month: month.label(),
        count: count(state.store.as_ref(), month).await?,
        previous_month: previous.label(),
        previous_count: count(state.store.as_ref(), previous).await?,
    }))
}
