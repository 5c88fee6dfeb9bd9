#![allow(dead_code)]

use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{Value, json};
use server::{
    bootstrap, build_router,
    config::{Config, ManagerAccount},
    memory::MemoryStore,
    state::AppState,
};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const MANAGER_EMAIL: &str = "mia@example.com";
pub const MANAGER_PASSWORD: &str = "manager-password";

pub struct TestApp {
    pub base: String,
    pub client: Client,
    pub state: Arc<AppState>,
    pub uploads: TempDir,
}

fn config(uploads: &TempDir) -> Config {
    Config {
        port: 0,
        mongo_url: String::new(),
        mongo_database: "knitwear-test".to_string(),
        mongo_transactions: false,
        jwt_secret: "test-secret".to_string(),
        token_ttl_hours: 1,
        manager: ManagerAccount {
            email: MANAGER_EMAIL.to_string(),
            password: MANAGER_PASSWORD.to_string(),
            full_name: "Mia Manager".to_string(),
        },
        upload_dir: uploads.path().to_path_buf(),
        max_upload_bytes: 64 * 1024,
        cors_origin: None,
        bcrypt_cost: 4,
    }
}

/// Serves the full router over an in-memory store on an ephemeral port.
pub async fn spawn_app() -> TestApp {
    let uploads = tempfile::tempdir().expect("tempdir");
    let state = AppState::with_store(config(&uploads), Arc::new(MemoryStore::new()));
    bootstrap(&state).await.expect("bootstrap");

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("local addr");
    let app = build_router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    TestApp {
        base: format!("http://{address}"),
        client: Client::new(),
        state,
        uploads,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let body = expect_status(
            self.post("/api/auth/login")
                .json(&json!({ "email": email, "password": password }))
                .send()
                .await
                .expect("login request"),
            StatusCode::OK,
        )
        .await;

        body["data"]["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    pub async fn manager_token(&self) -> String {
        self.login(MANAGER_EMAIL, MANAGER_PASSWORD).await
    }

    /// Signs up a plain admin through the manager and logs them in.
    pub async fn admin_token(&self, email: &str) -> String {
        let manager = self.manager_token().await;
        expect_status(
            self.post("/api/auth/signup")
                .bearer_auth(&manager)
                .json(&json!({
                    "email": email,
                    "password": "admin-password",
                    "fullName": "Alex Admin"
                }))
                .send()
                .await
                .expect("signup request"),
            StatusCode::CREATED,
        )
        .await;

        self.login(email, "admin-password").await
    }

    pub async fn create_product(&self, token: &str, body: &Value) -> Value {
        let body = expect_status(
            self.post("/api/product")
                .bearer_auth(token)
                .json(body)
                .send()
                .await
                .expect("create product request"),
            StatusCode::CREATED,
        )
        .await;

        body["data"].clone()
    }

    pub async fn sections(&self) -> Vec<Value> {
        let body = expect_status(
            self.get("/api/section").send().await.expect("sections request"),
            StatusCode::OK,
        )
        .await;

        body["data"].as_array().expect("section list").clone()
    }
}

pub async fn expect_status(response: Response, status: StatusCode) -> Value {
    let actual = response.status();
    let body: Value = response.json().await.expect("json body");
    assert_eq!(actual, status, "unexpected status, body: {body}");
    body
}

pub fn error_fields(body: &Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .expect("errors array")
        .iter()
        .map(|error| error["field"].as_str().unwrap_or_default().to_string())
        .collect()
}

pub fn sizes(names: &[&str]) -> Value {
    Value::Array(
        names
            .iter()
            .map(|name| json!({ "name": name, "quantity": 5, "availability": "in_stock" }))
            .collect(),
    )
}

pub fn product_body(name: &str, unisex: bool) -> Value {
    let mut run = vec!["XS", "S", "M", "L", "XL", "XXL"];
    if unisex {
        run.extend(["34", "36", "38", "40", "42", "44"]);
    }

    json!({
        "name": name,
        "description": "Ribbed crew neck",
        "descriptionText": "A lightweight merino crew neck with ribbed cuffs.",
        "unisex": unisex,
        "woolPercentage": 80,
        "price": 95.0,
        "releaseDate": "2026-08-15",
        "availability": "in_stock",
        "seasons": ["autumn"],
        "colors": [{ "name": "charcoal", "sizes": sizes(&run) }]
    })
}
