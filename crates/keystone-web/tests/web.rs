//! Router-level tests over an in-memory database.
//!
//! The mailer points at a closed local port; notification failures are
//! logged and swallowed, which is exactly the production behavior when the
//! mail server is unreachable.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use keystone_auth::ServiceCredential;
use keystone_core::{Database, NewContact};
use keystone_smtp::TlsMode;
use keystone_web::config::{Config, MailConfig};
use keystone_web::mailer::Mailer;
use keystone_web::routes;
use keystone_web::state::AppState;

const ADMIN_TOKEN: &str = "test-admin-token";

async fn test_state() -> AppState {
    let mail = MailConfig {
        smtp_host: "127.0.0.1".to_string(),
        // Nothing listens here; sends fail fast and are swallowed.
        smtp_port: 1,
        tls: TlsMode::None,
        timeout: Duration::from_secs(1),
        username: None,
        password: None,
        credential: ServiceCredential::new("", "", ""),
        default_from: "noreply@example.com".to_string(),
        admin_email: "owner@example.com".to_string(),
    };
    let config = Config {
        http_host: "127.0.0.1".to_string(),
        http_port: 0,
        database_path: ":memory:".to_string(),
        admin_token: Some(ADMIN_TOKEN.to_string()),
        mail: mail.clone(),
    };

    AppState {
        db: Arc::new(Database::open_memory().await.expect("open db")),
        mailer: Arc::new(Mailer::new(mail)),
        config: Arc::new(config),
    }
}

async fn app() -> (Router, AppState) {
    let state = test_state().await;
    (routes::router(state.clone()), state)
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

fn form_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/contact")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin_request(method: &str, uri: &str, token: Option<&str>, json: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match json {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn sample_contact(name: &str) -> NewContact {
    NewContact {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: String::new(),
        subject: "Rental inquiry".to_string(),
        message: "Is the beach house available in June?".to_string(),
    }
}

#[tokio::test]
async fn pages_render() {
    let (app, _state) = app().await;

    for uri in ["/", "/team", "/story", "/contact"] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "GET {}", uri);
        assert!(body_text(response).await.contains("Keystone Properties"));
    }
}

#[tokio::test]
async fn valid_submission_is_stored_and_normalized() {
    let (app, state) = app().await;

    let response = app
        .oneshot(form_request(
            "name=Jane+Doe&email=JANE%40Example.com&phone=&subject=Beach+house+inquiry\
             &message=Please+send+details+about+the+beach+house.",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Thank you"));

    let stored = state.db.list_contacts(false).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Jane Doe");
    assert_eq!(stored[0].email, "jane@example.com", "email is lowercased");
    assert!(!stored[0].is_read);
}

#[tokio::test]
async fn invalid_submission_re_renders_with_errors() {
    let (app, state) = app().await;

    let response = app
        .oneshot(form_request(
            "name=Jane+Doe&email=not-an-address&subject=Hello+there&message=short",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("valid email address"));
    assert!(body.contains("at least 10 characters"));

    assert!(state.db.list_contacts(false).await.unwrap().is_empty());
}

#[tokio::test]
async fn admin_routes_require_bearer_token() {
    let (app, state) = app().await;
    state.db.insert_contact(&sample_contact("Alice")).await.unwrap();

    let response = app
        .clone()
        .oneshot(admin_request("GET", "/api/admin/messages", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(admin_request("GET", "/api/admin/messages", Some("wrong"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(admin_request("GET", "/api/admin/messages", Some(ADMIN_TOKEN), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("\"name\":\"Alice\""));
}

#[tokio::test]
async fn admin_read_flag_and_unread_count() {
    let (app, state) = app().await;
    let id = state.db.insert_contact(&sample_contact("Alice")).await.unwrap();

    let response = app
        .clone()
        .oneshot(admin_request(
            "PUT",
            &format!("/api/admin/messages/{}/read", id),
            Some(ADMIN_TOKEN),
            Some(r#"{"read":true}"#),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("\"read\":true"));

    let response = app
        .oneshot(admin_request(
            "GET",
            "/api/admin/messages/unread-count",
            Some(ADMIN_TOKEN),
            None,
        ))
        .await
        .unwrap();
    assert!(body_text(response).await.contains("\"unread\":0"));
}

#[tokio::test]
async fn admin_notes_and_search() {
    let (app, state) = app().await;
    let id = state.db.insert_contact(&sample_contact("Alice")).await.unwrap();
    state.db.insert_contact(&sample_contact("Bob")).await.unwrap();

    let response = app
        .clone()
        .oneshot(admin_request(
            "PUT",
            &format!("/api/admin/messages/{}/notes", id),
            Some(ADMIN_TOKEN),
            Some(r#"{"notes":"Called back on Monday"}"#),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(admin_request(
            "GET",
            "/api/admin/messages?q=alice%40example.com",
            Some(ADMIN_TOKEN),
            None,
        ))
        .await
        .unwrap();
    let body = body_text(response).await;
    assert!(body.contains("\"name\":\"Alice\""));
    assert!(!body.contains("\"name\":\"Bob\""));

    let response = app
        .oneshot(admin_request(
            "GET",
            "/api/admin/messages/9999",
            Some(ADMIN_TOKEN),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
