//! HTTP surface tests: routing, the auth middleware's public-route rules
//! and the response envelope, driven through the assembled router without
//! binding a socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use assetverse_server::api;
use assetverse_server::core::{Config, ServerState};
use assetverse_server::db::DbService;
use assetverse_server::db::repository::AccountRepository;
use assetverse_server::payments::{CheckoutProvider, MockProvider, NewSession};
use shared::types::Role;

const HR: &str = "hr@example.com";

async fn test_state() -> ServerState {
    let db = DbService::memory().await.expect("open memory db");
    let provider = Arc::new(MockProvider::new());
    ServerState::with_parts(
        Config::from_env(),
        db.db,
        provider as Arc<dyn CheckoutProvider>,
    )
}

fn app(state: &ServerState) -> axum::Router {
    api::build_app(state).with_state(state.clone())
}

async fn grant(state: &ServerState, email: &str, role: Role) {
    let accounts = AccountRepository::new(state.db.clone());
    let account = accounts
        .find_or_create(email)
        .await
        .expect("create account");
    let id = account.id.expect("account id").to_string();
    accounts.update_role(&id, role).await.expect("grant role");
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn health_is_public() {
    let state = test_state().await;

    let response = app(&state)
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn parcel_listing_is_public() {
    let state = test_state().await;

    let response = app(&state)
        .oneshot(
            Request::builder()
                .uri("/api/parcels")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E0000");
    assert!(body["data"].as_array().expect("data array").is_empty());
}

#[tokio::test]
async fn writes_require_a_bearer_token() {
    let state = test_state().await;

    let response = app(&state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/parcels")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"target_employee_email": "e@example.com"}).to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E3001");
}

#[tokio::test]
async fn hr_creates_a_parcel_over_http() {
    let state = test_state().await;
    grant(&state, HR, Role::Hr).await;
    let token = state.jwt_service.generate_token(HR).expect("token");

    let response = app(&state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/parcels")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::from(
                    json!({"target_employee_email": "e@example.com"}).to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E0000");
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["hr_email"], HR);
}

#[tokio::test]
async fn plain_users_cannot_create_parcels() {
    let state = test_state().await;
    // No role grant: first sign-in creates a plain `user` account
    let token = state
        .jwt_service
        .generate_token("visitor@example.com")
        .expect("token");

    let response = app(&state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/parcels")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::from(
                    json!({"target_employee_email": "e@example.com"}).to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E2001");
}

#[tokio::test]
async fn reconcile_accepts_unauthenticated_callbacks() {
    let db = DbService::memory().await.expect("open memory db");
    let provider = Arc::new(MockProvider::new());
    let state = ServerState::with_parts(
        Config::from_env(),
        db.db,
        provider.clone() as Arc<dyn CheckoutProvider>,
    );
    grant(&state, HR, Role::Hr).await;

    let session = provider
        .create_session(NewSession {
            package_name: "pro".to_string(),
            price: 9900,
            employee_limit: 50,
            customer_email: HR.to_string(),
        })
        .await
        .expect("seed session");

    let response = app(&state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/payments/reconcile")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({"session_id": session.id}).to_string()))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E0000");
    assert_eq!(body["data"]["already_applied"], false);
    assert!(body.get("warning").is_none());
}

#[tokio::test]
async fn malformed_status_filter_is_rejected() {
    let state = test_state().await;

    let response = app(&state)
        .oneshot(
            Request::builder()
                .uri("/api/parcels?statuses=pending,shipped")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E0002");
}
