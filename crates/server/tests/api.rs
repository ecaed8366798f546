use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{Engine, MailMessage, Mailer};
use migration::MigratorTrait;
use server::{ServerState, router};

#[derive(Default)]
struct Outbox(Mutex<Vec<MailMessage>>);

#[async_trait]
impl Mailer for Outbox {
    async fn send(&self, message: MailMessage) -> Result<(), engine::EngineError> {
        self.0.lock().unwrap().push(message);
        Ok(())
    }
}

async fn app() -> (Router, Arc<Outbox>) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    let outbox = Arc::new(Outbox::default());
    let state = ServerState {
        engine: Arc::new(engine),
        mailer: outbox.clone(),
    };
    (router(state), outbox)
}

fn basic(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register_alice(app: &Router) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/users",
        None,
        Some(json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "correct-horse"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    basic("alice", "correct-horse")
}

fn days_ago(days: i64) -> String {
    (chrono::Utc::now() - chrono::Duration::days(days)).to_rfc3339()
}

#[tokio::test]
async fn protected_routes_require_credentials() {
    let (app, _) = app().await;
    register_alice(&app).await;

    let (status, _) = send(&app, "GET", "/transactions", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let wrong = basic("alice", "wrong-password");
    let (status, _) = send(&app, "GET", "/transactions", Some(&wrong), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let (app, _) = app().await;
    register_alice(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/users",
        None,
        Some(json!({
            "username": "alice",
            "email": "other@example.com",
            "password": "correct-horse"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"][0]["message"], "username or email already registered");
}

#[tokio::test]
async fn transaction_lifecycle() {
    let (app, _) = app().await;
    let auth = register_alice(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/transactions",
        Some(&auth),
        Some(json!({
            "kind": 1,
            "date": days_ago(1),
            "description": "  Salary  ",
            "amount_minor": 300000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "transaction created successfully");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", &format!("/transactions/{id}"), Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["description"], "Salary");
    assert_eq!(body["data"]["kind"], "income");
    assert_eq!(body["data"]["amount_minor"], 300000);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/transactions/{id}"),
        Some(&auth),
        Some(json!({
            "kind": 2,
            "date": days_ago(2),
            "description": "Rent",
            "amount_minor": 120000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "transaction updated successfully");

    let (status, body) = send(&app, "GET", "/transactions/type/2", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &format!("/transactions/{id}"), Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", &format!("/transactions/{id}"), Some(&auth), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, body) = send(&app, "GET", "/transactions", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_transaction_reports_every_field() {
    let (app, _) = app().await;
    let auth = register_alice(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/transactions",
        Some(&auth),
        Some(json!({ "kind": 1, "description": "", "amount_minor": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["errors"].as_array().unwrap().len() >= 3);
}

#[tokio::test]
async fn malformed_body_answers_with_the_envelope() {
    let (app, _) = app().await;
    let auth = register_alice(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/transactions",
        Some(&auth),
        Some(json!({
            "kind": 1,
            "description": "Salary",
            "amount_minor": "a lot"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("amount_minor"));

    let request = Request::builder()
        .method("POST")
        .uri("/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn unknown_type_code_is_a_bad_request() {
    let (app, _) = app().await;
    let auth = register_alice(&app).await;

    let (status, body) = send(&app, "GET", "/transactions/type/9", Some(&auth), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn summary_rejects_reversed_period() {
    let (app, _) = app().await;
    let auth = register_alice(&app).await;

    let (status, body) = send(
        &app,
        "GET",
        "/summary?start=2024-02-01&end=2024-01-01",
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn summary_totals_the_period() {
    let (app, _) = app().await;
    let auth = register_alice(&app).await;

    for (kind, amount) in [(1, 5000), (2, 1500)] {
        let (status, _) = send(
            &app,
            "POST",
            "/transactions",
            Some(&auth),
            Some(json!({
                "kind": kind,
                "date": days_ago(1),
                "description": "entry",
                "amount_minor": amount
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let today = chrono::Utc::now().date_naive();
    let start = today - chrono::Duration::days(7);
    let uri = format!("/summary?start={start}&end={today}");
    let (status, body) = send(&app, "GET", &uri, Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_income_minor"], 5000);
    assert_eq!(body["data"]["total_expense_minor"], 1500);
    assert_eq!(body["data"]["final_balance_minor"], 3500);
    assert_eq!(body["data"]["days"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn password_reset_through_mail_token() {
    let (app, outbox) = app().await;
    register_alice(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/users/password-reset",
        None,
        Some(json!({ "email": "alice@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let token = {
        let sent = outbox.0.lock().unwrap();
        assert_eq!(sent.len(), 1);
        sent[0]
            .body
            .split_whitespace()
            .find(|word| word.len() == 64)
            .unwrap()
            .to_string()
    };

    let (status, _) = send(
        &app,
        "POST",
        "/users/password-reset/confirm",
        None,
        Some(json!({ "token": token, "new_password": "battery-staple" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let auth = basic("alice", "battery-staple");
    let (status, _) = send(&app, "GET", "/transactions", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
}
