use serde_json::{json, Value};

use crate::helpers::spawn_app;

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app().await;
    let response = app.get("/api/health", None).await;
    assert_eq!(200, response.status().as_u16());
    assert_eq!("ok", response.text().await.unwrap());
}

#[tokio::test]
async fn register_returns_public_user() {
    let app = spawn_app().await;
    let response = app.register("Alice Liddell", "alice@example.com", "pw1").await;
    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "id": 1, "full_name": "Alice Liddell", "email": "alice@example.com" })
    );
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = spawn_app().await;
    app.register("Alice", "alice@example.com", "pw1").await;
    let response = app.register("Other Alice", "alice@example.com", "pw2").await;
    assert_eq!(409, response.status().as_u16());

    let tokens = app.login_tokens("alice@example.com", "pw1").await;
    let users: Value = app
        .get("/api/users", Some(&tokens.access))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(users.as_array().unwrap().len(), 1);
    assert_eq!(users[0]["full_name"], "Alice");
}

#[tokio::test]
async fn invalid_registrations_are_unprocessable() {
    let app = spawn_app().await;
    let cases = [
        json!({
            "full_name": "Alice",
            "email": "alice@example.com",
            "password": "pw1",
            "password_confirmation": "pw2",
        }),
        json!({
            "full_name": "Alice",
            "email": "not-an-email",
            "password": "pw1",
            "password_confirmation": "pw1",
        }),
        json!({ "full_name": "Alice", "email": "alice@example.com" }),
    ];

    for body in cases {
        let response = app
            .client
            .post(&format!("{}/api/users", &app.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(422, response.status().as_u16(), "body: {body}");
        let error: Value = response.json().await.expect("JSON error body");
        assert!(error["detail"].is_string(), "body: {body}");
    }
}

#[tokio::test]
async fn malformed_registration_body_is_unprocessable() {
    let app = spawn_app().await;
    let response = app
        .client
        .post(&format!("{}/api/users", &app.address))
        .header("content-type", "application/json")
        .body(r#"{"full_name": "Alice", "email": "#)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(422, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn non_numeric_user_id_is_unprocessable() {
    let app = spawn_app().await;
    app.register("Alice", "alice@example.com", "pw1").await;
    let tokens = app.login_tokens("alice@example.com", "pw1").await;

    let response = app.get("/api/users/abc", Some(&tokens.access)).await;
    assert_eq!(422, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert!(body["detail"].is_string());

    let response = app.delete("/api/users/abc", &tokens.access).await;
    assert_eq!(422, response.status().as_u16());
}

#[tokio::test]
async fn get_user_by_id() {
    let app = spawn_app().await;
    app.register("Alice", "alice@example.com", "pw1").await;
    let tokens = app.login_tokens("alice@example.com", "pw1").await;

    let response = app.get("/api/users/1", Some(&tokens.access)).await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["email"], "alice@example.com");
    assert!(body.get("password_hash").is_none());

    let response = app.get("/api/users/99", Some(&tokens.access)).await;
    assert_eq!(404, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "User not found with id 99");

    let response = app.get("/api/users/1", None).await;
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn delete_user_then_get_is_not_found() {
    let app = spawn_app().await;
    app.register("Alice", "alice@example.com", "pw1").await;
    app.register("Bob", "bob@example.com", "pw2").await;
    let tokens = app.login_tokens("alice@example.com", "pw1").await;

    let response = app.delete("/api/users/42", &tokens.access).await;
    assert_eq!(404, response.status().as_u16());

    let response = app.delete("/api/users/2", &tokens.access).await;
    assert_eq!(204, response.status().as_u16());

    let response = app.get("/api/users/2", Some(&tokens.access)).await;
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn change_password_flow() {
    let app = spawn_app().await;
    app.register("Alice", "alice@example.com", "pw1").await;
    let tokens = app.login_tokens("alice@example.com", "pw1").await;

    let response = app
        .change_password(
            &tokens.access,
            json!({ "old_password": "pw1", "new_password": "a", "new_password_confirmation": "b" }),
        )
        .await;
    assert_eq!(422, response.status().as_u16());

    let response = app
        .change_password(
            &tokens.access,
            json!({ "old_password": "nope", "new_password": "pw2", "new_password_confirmation": "pw2" }),
        )
        .await;
    assert_eq!(401, response.status().as_u16());
    assert_eq!(200, app.login("alice@example.com", "pw1").await.status().as_u16());

    let response = app
        .change_password(
            &tokens.access,
            json!({ "old_password": "pw1", "new_password": "pw2", "new_password_confirmation": "pw2" }),
        )
        .await;
    assert_eq!(204, response.status().as_u16());

    assert_eq!(401, app.login("alice@example.com", "pw1").await.status().as_u16());
    assert_eq!(200, app.login("alice@example.com", "pw2").await.status().as_u16());

    // Tokens issued before the change keep working.
    let response = app.get("/api/users", Some(&tokens.access)).await;
    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn change_password_for_deleted_caller_is_forbidden() {
    let app = spawn_app().await;
    app.register("Alice", "alice@example.com", "pw1").await;
    let tokens = app.login_tokens("alice@example.com", "pw1").await;
    app.delete("/api/users/1", &tokens.access).await;

    let response = app
        .change_password(
            &tokens.access,
            json!({ "old_password": "pw1", "new_password": "pw2", "new_password_confirmation": "pw2" }),
        )
        .await;
    assert_eq!(403, response.status().as_u16());
}
