use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension,
    body::Bytes,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use catalog::{notifications::NotificationTitle, products::Product, sections::Section};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::products::product_not_found;
use crate::{
    activity::record,
    auth::CurrentAdmin,
    error::AppError,
    state::AppState,
    store::{Pagination, Store},
    templates::Subject,
    utils::{Paginated, ok, parse_body},
    validation::{query::page_query, section::SectionItems},
};

/// A section with one page of its products resolved.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionView {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub items: Paginated<Product>,
    #[serde(with = "catalog::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "catalog::timestamp")]
    pub updated_at: DateTime<Utc>,
}

async fn resolve(
    store: &dyn Store,
    section: Section,
    pagination: &Pagination,
) -> Result<SectionView, AppError> {
    let ids = pagination.slice(&section.items);
    let products = store.find_products(&ids).await?;

    Ok(SectionView {
        id: section.id,
        name: section.name,
        description: section.description,
        items: Paginated::new(products, section.items.len() as u64, pagination),
        created_at: section.created_at,
        updated_at: section.updated_at,
    })
}

fn section_not_found(id: &str) -> AppError {
    AppError::not_found("sectionId", format!("Section {id} not found"))
}

async fn find_section(store: &dyn Store, id: &str) -> Result<Section, AppError> {
    store
        .find_section(id)
        .await?
        .ok_or_else(|| section_not_found(id))
}

pub async fn list_sections(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let pagination = page_query(&params)?;
    let mut views = Vec::new();

    for section in state.store.list_sections().await? {
        views.push(resolve(state.store.as_ref(), section, &pagination).await?);
    }

    Ok(ok(views))
}

pub async fn get_section(
    State(state): State<Arc<AppState>>,
    Path(section_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let pagination = page_query(&params)?;
    let section = find_section(state.store.as_ref(), &section_id).await?;

    Ok(ok(resolve(state.store.as_ref(), section, &pagination).await?))
}

/// Replaces the section's items. Every id must name an existing product; the
/// first one that does not aborts the update before anything is written.
pub async fn replace_section_items(
    State(state): State<Arc<AppState>>,
    Extension(CurrentAdmin(admin)): Extension<CurrentAdmin>,
    Path(section_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload = parse_body(&body)?;
    let store = state.store.as_ref();
    find_section(store, &section_id).await?;

    let SectionItems { items } = SectionItems::parse(payload)?;
    let found = store.find_products(&items).await?;
    if let Some(missing) = items
        .iter()
        .find(|id| !found.iter().any(|product| &product.id == *id))
    {
        return Err(product_not_found(missing));
    }

    let section = store
        .set_section_items(&section_id, &items)
        .await?
        .ok_or_else(|| section_not_found(&section_id))?;

    record(
        store,
        &admin.id,
        NotificationTitle::SectionUpdated,
        Some(Subject::Section(&section)),
    )
    .await;

    Ok(ok(section))
}

pub async fn remove_section_item(
    State(state): State<Arc<AppState>>,
    Extension(CurrentAdmin(admin)): Extension<CurrentAdmin>,
    Path((section_id, product_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store.as_ref();
    let section = find_section(store, &section_id).await?;

    if !section.contains(&product_id) {
        return Err(AppError::not_found(
            "productId",
            format!("Product {product_id} is not in section {}", section.name),
        ));
    }

    let section = store
        .remove_section_item(&section_id, &product_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(
                "productId",
                format!("Product {product_id} is not in section {section_id}"),
            )
        })?;

    record(
        store,
        &admin.id,
        NotificationTitle::SectionItemRemoved,
        Some(Subject::Section(&section)),
    )
    .await;

    Ok(ok(section))
}
