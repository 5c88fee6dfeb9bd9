use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension,
    body::Bytes,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use catalog::notifications::NotificationTitle;
use chrono::Utc;
use tracing::info;

use super::images::remove_upload;
use crate::{
    activity::record,
    auth::CurrentAdmin,
    error::AppError,
    state::AppState,
    store::new_id,
    templates::Subject,
    utils::{Paginated, created, ok, parse_body},
    validation::{
        product::{NewProduct, ProductPatch},
        query::product_query,
    },
};

pub fn product_not_found(id: &str) -> AppError {
    AppError::not_found("productId", format!("Product {id} not found"))
}

pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let query = product_query(&params)?;
    let (items, total) = state.store.list_products(&query).await?;

    Ok(ok(Paginated::new(items, total, &query.pagination)))
}

pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let product = state
        .store
        .find_product(&product_id)
        .await?
        .ok_or_else(|| product_not_found(&product_id))?;

    Ok(ok(product))
}

pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Extension(CurrentAdmin(admin)): Extension<CurrentAdmin>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let input = NewProduct::parse(parse_body(&body)?)?;
    let product = input.into_product(new_id(), Utc::now());

    state.store.insert_product(&product).await?;
    info!("Product {} created by {}", product.id, admin.email);

    record(
        state.store.as_ref(),
        &admin.id,
        NotificationTitle::ProductAdded,
        Some(Subject::Product(&product)),
    )
    .await;

    Ok(created(product))
}

pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Extension(CurrentAdmin(admin)): Extension<CurrentAdmin>,
    Path(product_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload = parse_body(&body)?;
    let mut product = state
        .store
        .find_product(&product_id)
        .await?
        .ok_or_else(|| product_not_found(&product_id))?;

    ProductPatch::parse(payload, &product)?.apply(&mut product, Utc::now());

    if !state.store.replace_product(&product).await? {
        return Err(product_not_found(&product_id));
    }

    record(
        state.store.as_ref(),
        &admin.id,
        NotificationTitle::ProductUpdated,
        Some(Subject::Product(&product)),
    )
    .await;

    Ok(ok(product))
}

pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Extension(CurrentAdmin(admin)): Extension<CurrentAdmin>,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let product = state
        .store
        .delete_product(&product_id)
        .await?
        .ok_or_else(|| product_not_found(&product_id))?;
    info!("Product {product_id} deleted by {}", admin.email);

    let images = &product.images;
    for path in [&images.front, &images.back, &images.side, &images.detail]
        .into_iter()
        .flatten()
    {
        remove_upload(&state.config.upload_dir, path).await;
    }

    record(
        state.store.as_ref(),
        &admin.id,
        NotificationTitle::ProductDeleted,
        Some(Subject::Product(&product)),
    )
    .await;

    Ok(ok(product))
}
