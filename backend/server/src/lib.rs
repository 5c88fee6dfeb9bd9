//! Back-office API for the knitwear shop.
//!
//! Admins manage the product catalog, the curated storefront sections and
//! each other's accounts; every change lands in a shared notification feed.
//! The storefront reads products and sections anonymously and reports page
//! views.
//!
//! # Routes
//!
//! Three groups share one router:
//! - public: health, login, catalog reads, traffic
//! - admin: everything else, behind [`auth::require_admin`]
//! - manager: signup and role/status changes, behind [`auth::require_manager`]
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{
        HeaderName, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use catalog::{
    admins::{Admin, AdminStatus, Role},
    sections::SEED_SECTIONS,
};
use chrono::Utc;
use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use thiserror::Error;
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod activity;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod memory;
pub mod routes;
pub mod search;
pub mod state;
pub mod store;
pub mod templates;
pub mod utils;
pub mod validation;

use auth::{ACCESS_TOKEN_HEADER, hash_password, require_admin, require_manager};
use config::{Config, ConfigError};
use error::AppError;
use routes::{
    auth::{
        get_admin, list_admins, login, me, signup, update_admin, update_my_profile,
        update_password,
    },
    health,
    images::{UPLOADS_ROUTE, upload_avatar, upload_product_image},
    notifications::{list_activity, list_notifications, mark_all_read, mark_notification_read},
    products::{create_product, delete_product, get_product, list_products, update_product},
    sections::{get_section, list_sections, remove_section_item, replace_section_items},
    traffic::{monthly_traffic, record_visit},
};
use state::AppState;
use store::{StoreError, new_id};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Bootstrap failed: {0}")]
    Bootstrap(#[from] AppError),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn cors(config: &Config) -> CorsLayer {
    let origin = match &config.cors_origin {
        Some(origin) => AllowOrigin::exact(origin.clone()),
        None => AllowOrigin::from(Any),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static(ACCESS_TOKEN_HEADER),
        ])
        .max_age(Duration::from_secs(60 * 60))
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    let public = Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/login", post(login))
        .route("/api/product", get(list_products))
        .route("/api/product/:product_id", get(get_product))
        .route("/api/section", get(list_sections))
        .route("/api/section/:section_id", get(get_section))
        .route("/api/traffic", get(monthly_traffic).post(record_visit));

    let manager = Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/:admin_id", put(update_admin))
        .route_layer(from_fn_with_state(state.clone(), require_manager));

    let admin = Router::new()
        .route("/api/auth", get(list_admins))
        .route("/api/auth/me", get(me))
        .route("/api/auth/update-my-profile", put(update_my_profile))
        .route("/api/auth/update-password", put(update_password))
        .route("/api/auth/:admin_id", get(get_admin))
        .route("/api/product", post(create_product))
        .route(
            "/api/product/:product_id",
            put(update_product).delete(delete_product),
        )
        .route("/api/section/:section_id", put(replace_section_items))
        .route(
            "/api/section/:section_id/:product_id",
            delete(remove_section_item),
        )
        .route("/api/notification", get(list_notifications))
        .route("/api/notification/mark-all-read", put(mark_all_read))
        .route(
            "/api/notification/:notification_id",
            put(mark_notification_read),
        )
        .route("/api/activity", get(list_activity))
        .route(
            "/api/image/upload/product/:angle/:product_id",
            post(upload_product_image).layer(upload_limit.clone()),
        )
        .route(
            "/api/image/upload/avatar",
            post(upload_avatar).layer(upload_limit),
        )
        .merge(manager)
        .route_layer(from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .merge(public)
        .merge(admin)
        .nest_service(UPLOADS_ROUTE, ServeDir::new(&state.config.upload_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors(&state.config))
        .with_state(state)
}

/// Seeds the fixed sections and creates the configured manager account.
pub async fn bootstrap(state: &AppState) -> Result<(), AppError> {
    let inserted = state.store.seed_sections(&SEED_SECTIONS).await?;
    if inserted > 0 {
        info!("Seeded {inserted} sections");
    }

    let account = &state.config.manager;
    let email = account.email.trim().to_lowercase();

    match state.store.find_admin_by_email(&email).await? {
        Some(existing) if !existing.is_manager() => {
            warn!("Bootstrap account {email} exists but is not a manager");
        }
        Some(_) => info!("Manager account {email} already exists"),
        None => {
            let now = Utc::now();
            let manager = Admin {
                id: new_id(),
                email: email.clone(),
                password: hash_password(account.password.clone(), state.config.bcrypt_cost).await?,
                full_name: account.full_name.clone(),
                role: Role::Manager,
                status: AdminStatus::Active,
                avatar: None,
                created_at: now,
                updated_at: now,
            };
            state.store.insert_admin(&manager).await?;
            info!("Created manager account {email}");
        }
    }

    Ok(())
}

pub async fn start_server() -> Result<(), ServerError> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = AppState::new(config).await?;
    bootstrap(&state).await?;

    info!("Starting server...");
    let app = build_router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
