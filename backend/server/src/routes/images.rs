//! Image uploads.
//!
//! Files land under the configured upload directory and are served back
//! read-only from `/uploads`:
//!
//! - product images: `products/<productId>-<angle>.<ext>`
//! - avatars: `avatars/<adminId>.<ext>`
//!
//! A new upload for the same slot with a different extension removes the
//! previous file.
use std::{
    path::{Path as FsPath, PathBuf},
    sync::Arc,
};

use axum::{
    Extension,
    body::Bytes,
    extract::{Multipart, Path, State},
    response::IntoResponse,
};
use catalog::{
    Vocabulary,
    admins::AdminProfile,
    notifications::NotificationTitle,
    products::ImageAngle,
};
use chrono::Utc;
use tokio::fs;
use tracing::{info, warn};

use super::{auth::admin_not_found, products::product_not_found};
use crate::{
    activity::record,
    auth::CurrentAdmin,
    error::AppError,
    state::AppState,
    templates::Subject,
    utils::ok,
    validation::{EMPTY, INVALID_ENUM, INVALID_TYPE, REQUIRED},
};

pub const UPLOADS_ROUTE: &str = "/uploads";
pub const IMAGE_FIELD: &str = "image";
const PRODUCTS_DIR: &str = "products";
const AVATARS_DIR: &str = "avatars";

fn extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Where a public `/uploads/...` path lives on disk.
fn disk_path(upload_dir: &FsPath, public: &str) -> Option<PathBuf> {
    let relative = public.strip_prefix(UPLOADS_ROUTE)?.trim_start_matches('/');

    if relative.is_empty() || relative.split('/').any(|part| part == "..") {
        return None;
    }

    Some(upload_dir.join(relative))
}

pub async fn remove_upload(upload_dir: &FsPath, public: &str) {
    let Some(path) = disk_path(upload_dir, public) else {
        return;
    };

    if let Err(e) = fs::remove_file(&path).await {
        warn!("Failed to remove {}: {e}", path.display());
    }
}

struct Upload {
    extension: &'static str,
    bytes: Bytes,
}

async fn read_image(mut multipart: Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid(IMAGE_FIELD, INVALID_TYPE, e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let extension = extension(&content_type).ok_or_else(|| {
            AppError::invalid(
                IMAGE_FIELD,
                INVALID_TYPE,
                "image must be a JPEG, PNG or WebP file",
            )
        })?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::invalid(IMAGE_FIELD, INVALID_TYPE, e.body_text()))?;
        if bytes.is_empty() {
            return Err(AppError::invalid(IMAGE_FIELD, EMPTY, "image is empty"));
        }

        return Ok(Upload { extension, bytes });
    }

    Err(AppError::invalid(
        IMAGE_FIELD,
        REQUIRED,
        "Send the file in a multipart field named image",
    ))
}

/// Writes the upload and returns its public path.
async fn store_upload(
    upload_dir: &FsPath,
    folder: &str,
    stem: &str,
    upload: &Upload,
) -> Result<String, AppError> {
    let dir = upload_dir.join(folder);
    fs::create_dir_all(&dir).await.map_err(AppError::internal)?;

    let file_name = format!("{stem}.{}", upload.extension);
    fs::write(dir.join(&file_name), &upload.bytes)
        .await
        .map_err(AppError::internal)?;

    Ok(format!("{UPLOADS_ROUTE}/{folder}/{file_name}"))
}

pub async fn upload_product_image(
    State(state): State<Arc<AppState>>,
    Extension(CurrentAdmin(admin)): Extension<CurrentAdmin>,
    Path((angle, product_id)): Path<(String, String)>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let angle = ImageAngle::parse(&angle).ok_or_else(|| {
        AppError::invalid(
            "angle",
            INVALID_ENUM,
            format!("angle must be one of: {}", ImageAngle::names().join(", ")),
        )
    })?;

    let mut product = state
        .store
        .find_product(&product_id)
        .await?
        .ok_or_else(|| product_not_found(&product_id))?;

    let upload = read_image(multipart).await?;
    let upload_dir = &state.config.upload_dir;
    let stem = format!("{}-{}", product.id, angle.as_str());
    let path = store_upload(upload_dir, PRODUCTS_DIR, &stem, &upload).await?;

    if let Some(previous) = product.images.replace(angle, path.clone()) {
        if previous != path {
            remove_upload(upload_dir, &previous).await;
        }
    }
    product.updated_at = Utc::now();

    if !state.store.replace_product(&product).await? {
        return Err(product_not_found(&product_id));
    }
    info!("Stored {path} for product {product_id}");

    record(
        state.store.as_ref(),
        &admin.id,
        NotificationTitle::ProductImageUpdated,
        Some(Subject::Product(&product)),
    )
    .await;

    Ok(ok(product))
}

pub async fn upload_avatar(
    State(state): State<Arc<AppState>>,
    Extension(CurrentAdmin(mut admin)): Extension<CurrentAdmin>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let upload = read_image(multipart).await?;
    let upload_dir = &state.config.upload_dir;
    let path = store_upload(upload_dir, AVATARS_DIR, &admin.id, &upload).await?;

    if let Some(previous) = admin.avatar.replace(path.clone()) {
        if previous != path {
            remove_upload(upload_dir, &previous).await;
        }
    }
    admin.updated_at = Utc::now();

    if !state.store.replace_admin(&admin).await? {
        remove_upload(upload_dir, &path).await;
        return Err(admin_not_found(&admin.id));
    }

    let profile = AdminProfile::from(&admin);
    record(
        state.store.as_ref(),
        &admin.id,
        NotificationTitle::ProfileUpdated,
        Some(Subject::Admin(&profile)),
    )
    .await;

    Ok(ok(profile))
}
