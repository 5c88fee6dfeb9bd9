use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension,
    body::Bytes,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use catalog::{
    admins::{Admin, AdminProfile, AdminStatus, Role},
    notifications::NotificationTitle,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::{
    activity::record,
    auth::{CurrentAdmin, hash_password, verify_password},
    error::AppError,
    state::AppState,
    store::new_id,
    templates::{Subject, role_title, status_title},
    utils::{Paginated, created, ok, parse_body},
    validation::{
        INCORRECT_PASSWORD,
        admin::{AdminUpdate, Login, PasswordChange, ProfileUpdate, Signup},
        query::admin_query,
    },
};

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub status: AdminStatus,
}

fn bad_credentials() -> AppError {
    AppError::Unauthorized("Invalid email or password".to_string())
}

pub fn admin_not_found(id: &str) -> AppError {
    AppError::not_found("adminId", format!("Admin {id} not found"))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let Login { email, password } = Login::parse(parse_body(&body)?)?;

    let admin = state
        .store
        .find_admin_by_email(&email)
        .await?
        .ok_or_else(bad_credentials)?;

    if !verify_password(password, admin.password.clone()).await? {
        return Err(bad_credentials());
    }
    if admin.status != AdminStatus::Active {
        return Err(AppError::AccountStatus(admin.status));
    }

    let token = state.keys.issue(&admin.email)?;
    info!("{} logged in", admin.email);

    Ok(ok(LoginResponse {
        token,
        status: admin.status,
    }))
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    Extension(CurrentAdmin(manager)): Extension<CurrentAdmin>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let signup = Signup::parse(parse_body(&body)?)?;
    let password = hash_password(signup.password, state.config.bcrypt_cost).await?;

    let now = Utc::now();
    let admin = Admin {
        id: new_id(),
        email: signup.email,
        password,
        full_name: signup.full_name,
        role: signup.role.unwrap_or(Role::Admin),
        status: AdminStatus::Active,
        avatar: None,
        created_at: now,
        updated_at: now,
    };
    state.store.insert_admin(&admin).await?;
    info!("{} added {}", manager.email, admin.email);

    let profile = AdminProfile::from(&admin);
    record(
        state.store.as_ref(),
        &manager.id,
        NotificationTitle::AdminAdded,
        Some(Subject::Admin(&profile)),
    )
    .await;

    Ok(created(profile))
}

pub async fn list_admins(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let query = admin_query(&params)?;
    let (items, total) = state.store.list_admins(&query).await?;

    let page = Paginated::new(items, total, &query.pagination).map(|admin| AdminProfile::from(&admin));

    Ok(ok(page))
}

pub async fn me(Extension(CurrentAdmin(admin)): Extension<CurrentAdmin>) -> impl IntoResponse {
    ok(AdminProfile::from(&admin))
}

pub async fn get_admin(
    State(state): State<Arc<AppState>>,
    Path(admin_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let admin = state
        .store
        .find_admin(&admin_id)
        .await?
        .ok_or_else(|| admin_not_found(&admin_id))?;

    Ok(ok(AdminProfile::from(&admin)))
}

pub async fn update_my_profile(
    State(state): State<Arc<AppState>>,
    Extension(CurrentAdmin(mut admin)): Extension<CurrentAdmin>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let update = ProfileUpdate::parse(parse_body(&body)?)?;

    admin.full_name = update.full_name;
    admin.updated_at = Utc::now();
    if !state.store.replace_admin(&admin).await? {
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

pub async fn update_password(
    State(state): State<Arc<AppState>>,
    Extension(CurrentAdmin(mut admin)): Extension<CurrentAdmin>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let change = PasswordChange::parse(parse_body(&body)?)?;

    if !verify_password(change.current_password, admin.password.clone()).await? {
        return Err(AppError::invalid(
            "currentPassword",
            INCORRECT_PASSWORD,
            "Current password is incorrect",
        ));
    }

    admin.password = hash_password(change.new_password, state.config.bcrypt_cost).await?;
    admin.updated_at = Utc::now();
    if !state.store.replace_admin(&admin).await? {
        return Err(admin_not_found(&admin.id));
    }
    info!("{} changed their password", admin.email);

    let profile = AdminProfile::from(&admin);
    record(
        state.store.as_ref(),
        &admin.id,
        NotificationTitle::PasswordUpdated,
        Some(Subject::Admin(&profile)),
    )
    .await;

    Ok(ok(json!({ "message": "Password updated" })))
}

/// A manager changes another admin's role and/or status. One notification is
/// written per attribute that actually changed.
pub async fn update_admin(
    State(state): State<Arc<AppState>>,
    Extension(CurrentAdmin(manager)): Extension<CurrentAdmin>,
    Path(admin_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let update = AdminUpdate::parse(parse_body(&body)?)?;

    if admin_id == manager.id {
        return Err(AppError::Forbidden(
            "Managers cannot change their own role or status".to_string(),
        ));
    }

    let mut admin = state
        .store
        .find_admin(&admin_id)
        .await?
        .ok_or_else(|| admin_not_found(&admin_id))?;

    let mut titles = Vec::new();
    if let Some(role) = update.role {
        titles.extend(role_title(admin.role, role));
        admin.role = role;
    }
    if let Some(status) = update.status {
        titles.extend(status_title(admin.status, status));
        admin.status = status;
    }

    if !titles.is_empty() {
        admin.updated_at = Utc::now();
        if !state.store.replace_admin(&admin).await? {
            return Err(admin_not_found(&admin_id));
        }
    }

    let profile = AdminProfile::from(&admin);
    for title in titles {
        record(
            state.store.as_ref(),
            &manager.id,
            title,
            Some(Subject::Admin(&profile)),
        )
        .await;
    }

    Ok(ok(profile))
}
