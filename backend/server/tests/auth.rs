mod common;

use common::{MANAGER_EMAIL, error_fields, expect_status, spawn_app};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_login_outcomes() {
    let app = spawn_app().await;

    let body = expect_status(
        app.post("/api/auth/login")
            .json(&json!({ "email": MANAGER_EMAIL, "password": "wrong-password" }))
            .send()
            .await
            .unwrap(),
        StatusCode::FORBIDDEN,
    )
    .await;
    assert_eq!(body["success"], false);
    assert_eq!(body["statusCode"], 403);
    assert_eq!(error_fields(&body), vec!["authentication"]);

    let body = expect_status(
        app.post("/api/auth/login")
            .json(&json!({ "email": "nobody@example.com", "password": "whatever" }))
            .send()
            .await
            .unwrap(),
        StatusCode::FORBIDDEN,
    )
    .await;
    assert_eq!(error_fields(&body), vec!["authentication"]);

    let body = expect_status(
        app.post("/api/auth/login")
            .json(&json!({ "email": "MIA@example.com ", "password": "manager-password" }))
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "active");
    assert!(body["data"]["token"].as_str().is_some());
}

#[tokio::test]
async fn test_login_validation() {
    let app = spawn_app().await;

    let body = expect_status(
        app.post("/api/auth/login").json(&json!({})).send().await.unwrap(),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(error_fields(&body), vec!["email", "password"]);

    let body = expect_status(
        app.post("/api/auth/login")
            .header("content-type", "application/json")
            .body("{\"email\":")
            .send()
            .await
            .unwrap(),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(error_fields(&body), vec!["body"]);
}

#[tokio::test]
async fn test_suspended_and_deleted_accounts() {
    let app = spawn_app().await;
    let manager = app.manager_token().await;
    let token = app.admin_token("sam@example.com").await;

    let me = expect_status(
        app.get("/api/auth/me").bearer_auth(&token).send().await.unwrap(),
        StatusCode::OK,
    )
    .await;
    let id = me["data"]["_id"].as_str().unwrap().to_string();
    assert!(me["data"].get("password").is_none());

    expect_status(
        app.put(&format!("/api/auth/{id}"))
            .bearer_auth(&manager)
            .json(&json!({ "status": "suspended" }))
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;

    let body = expect_status(
        app.post("/api/auth/login")
            .json(&json!({ "email": "sam@example.com", "password": "admin-password" }))
            .send()
            .await
            .unwrap(),
        StatusCode::UNAUTHORIZED,
    )
    .await;
    assert_eq!(body["errors"][0]["field"], "status");
    assert_eq!(
        body["errors"][0]["message"],
        "Your account has been suspended"
    );

    // Tokens issued before the suspension stop working too.
    expect_status(
        app.get("/api/auth/me").bearer_auth(&token).send().await.unwrap(),
        StatusCode::FORBIDDEN,
    )
    .await;

    expect_status(
        app.put(&format!("/api/auth/{id}"))
            .bearer_auth(&manager)
            .json(&json!({ "status": "deleted" }))
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;

    let body = expect_status(
        app.post("/api/auth/login")
            .json(&json!({ "email": "sam@example.com", "password": "admin-password" }))
            .send()
            .await
            .unwrap(),
        StatusCode::UNAUTHORIZED,
    )
    .await;
    assert_eq!(body["errors"][0]["message"], "This account has been deleted");
}

#[tokio::test]
async fn test_token_required() {
    let app = spawn_app().await;

    let body = expect_status(
        app.get("/api/auth/me").send().await.unwrap(),
        StatusCode::FORBIDDEN,
    )
    .await;
    assert_eq!(error_fields(&body), vec!["authentication"]);

    expect_status(
        app.get("/api/auth/me")
            .bearer_auth("not-a-token")
            .send()
            .await
            .unwrap(),
        StatusCode::FORBIDDEN,
    )
    .await;

    let token = app.manager_token().await;
    let body = expect_status(
        app.get("/api/auth/me")
            .header("x-access-token", &token)
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["data"]["email"], MANAGER_EMAIL);
    assert_eq!(body["data"]["role"], "manager");
}

#[tokio::test]
async fn test_manager_only_routes() {
    let app = spawn_app().await;
    let admin = app.admin_token("alex@example.com").await;

    let body = expect_status(
        app.post("/api/auth/signup")
            .bearer_auth(&admin)
            .json(&json!({
                "email": "new@example.com",
                "password": "long-enough",
                "fullName": "New Person"
            }))
            .send()
            .await
            .unwrap(),
        StatusCode::FORBIDDEN,
    )
    .await;
    assert_eq!(error_fields(&body), vec!["authorization"]);

    let manager = app.manager_token().await;
    let body = expect_status(
        app.post("/api/auth/signup")
            .bearer_auth(&manager)
            .json(&json!({
                "email": "ALEX@example.com",
                "password": "long-enough",
                "fullName": "Alex Again"
            }))
            .send()
            .await
            .unwrap(),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(body["errors"][0]["field"], "email");
    assert_eq!(body["errors"][0]["code"], "duplicate");
}

#[tokio::test]
async fn test_role_change_and_listing() {
    let app = spawn_app().await;
    let manager = app.manager_token().await;
    let admin = app.admin_token("alex@example.com").await;

    let me = expect_status(
        app.get("/api/auth/me").bearer_auth(&admin).send().await.unwrap(),
        StatusCode::OK,
    )
    .await;
    let id = me["data"]["_id"].as_str().unwrap().to_string();

    let body = expect_status(
        app.put(&format!("/api/auth/{id}"))
            .bearer_auth(&manager)
            .json(&json!({ "role": "manager" }))
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["data"]["role"], "manager");

    let body = expect_status(
        app.get("/api/auth?role=manager&search=alex")
            .bearer_auth(&admin)
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["data"]["totalItems"], 1);
    assert_eq!(body["data"]["items"][0]["email"], "alex@example.com");

    let body = expect_status(
        app.get("/api/notification?search=upgraded")
            .bearer_auth(&manager)
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["data"]["totalItems"], 1);
    assert_eq!(body["data"]["items"][0]["title"], "Admin Upgraded");
}

#[tokio::test]
async fn test_profile_and_password() {
    let app = spawn_app().await;
    let token = app.admin_token("alex@example.com").await;

    let body = expect_status(
        app.put("/api/auth/update-my-profile")
            .bearer_auth(&token)
            .json(&json!({ "fullName": "  Alex Renamed " }))
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["data"]["fullName"], "Alex Renamed");

    let body = expect_status(
        app.put("/api/auth/update-password")
            .bearer_auth(&token)
            .json(&json!({ "currentPassword": "not-it", "newPassword": "brand-new-password" }))
            .send()
            .await
            .unwrap(),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(error_fields(&body), vec!["currentPassword"]);

    expect_status(
        app.put("/api/auth/update-password")
            .bearer_auth(&token)
            .json(&json!({
                "currentPassword": "admin-password",
                "newPassword": "brand-new-password"
            }))
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;

    app.login("alex@example.com", "brand-new-password").await;
}
