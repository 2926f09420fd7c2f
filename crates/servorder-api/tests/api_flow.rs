//! End-to-end HTTP flows over the in-memory repositories

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use servorder_api::{build_router, AppState, Repositories};
use servorder_core::domain::OrderStatus;
use servorder_core::notifier::{NotificationError, StatusNotice, StatusNotifier};
use servorder_infrastructure::MemoryStore;
use servorder_shared::config::{AppSettings, JwtSettings, SecuritySettings};

const ADMIN_EMAIL: &str = "root@servorder.test";
const ADMIN_PASSWORD: &str = "Gr4nite-Harbor-Lantern!";

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, OrderStatus)>>,
    fail: bool,
}

#[async_trait]
impl StatusNotifier for RecordingNotifier {
    async fn notify(&self, notice: &StatusNotice) -> Result<(), NotificationError> {
        if self.fail {
            return Err(NotificationError::Transport("gateway down".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((notice.phone.clone(), notice.status));
        Ok(())
    }
}

struct TestApp {
    router: Router,
    notifier: Arc<RecordingNotifier>,
}

async fn spawn_app(fail_notifications: bool, login_attempts_per_minute: u32) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let repos = Repositories {
        companies: store.clone(),
        stores: store.clone(),
        users: store.clone(),
        clients: store.clone(),
        orders: store,
    };
    let notifier = Arc::new(RecordingNotifier {
        fail: fail_notifications,
        ..Default::default()
    });
    let jwt = JwtSettings {
        secret: "integration-test-secret-0123456789abcdef".to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 3600,
    };
    let security = SecuritySettings {
        login_attempts_per_minute,
        ..Default::default()
    };
    let state = AppState::new(
        repos,
        Some(notifier.clone() as Arc<dyn StatusNotifier>),
        &jwt,
        &security,
        "55",
        None,
    );
    state
        .user_service
        .bootstrap_super_admin("Root", ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .unwrap();

    let settings = AppSettings {
        env: "test".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        name: "servorder-test".to_string(),
        cors_origins: Vec::new(),
        request_timeout_secs: 5,
    };

    TestApp {
        router: build_router(state, &settings),
        notifier,
    }
}

impl TestApp {
    async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["data"]["access_token"].as_str().unwrap().to_string()
    }

    /// Creates a company, a store and a client; returns (company, store, client) ids.
    async fn seed_tenant(&self, token: &str) -> (String, String, String) {
        let (status, company) = self
            .call(Method::POST, "/api/v1/companies", Some(token), Some(json!({ "name": "Acme Repairs" })))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", company);
        let company_id = company["data"]["id"].as_str().unwrap().to_string();

        let (status, store) = self
            .call(
                Method::POST,
                "/api/v1/stores",
                Some(token),
                Some(json!({ "company_id": company_id, "name": "Downtown" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", store);
        let store_id = store["data"]["id"].as_str().unwrap().to_string();

        let (status, client) = self
            .call(
                Method::POST,
                "/api/v1/clients",
                Some(token),
                Some(json!({ "store_id": store_id, "name": "Maria Silva", "phone": "(11) 98765-4321" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", client);
        let client_id = client["data"]["id"].as_str().unwrap().to_string();

        (company_id, store_id, client_id)
    }

    async fn create_order(&self, token: &str, store_id: &str, client_id: &str) -> Value {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/v1/service-orders",
                Some(token),
                Some(json!({
                    "store_id": store_id,
                    "client_id": client_id,
                    "description": "Screen replacement",
                    "items": [
                        { "description": "Screen", "quantity": 1, "unit_price_cents": 25000 },
                        { "description": "Labor", "quantity": 2, "unit_price_cents": 5000 }
                    ]
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"].clone()
    }
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = spawn_app(false, 10).await;
    let (status, body) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _) = app.call(Method::GET, "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = spawn_app(false, 10).await;
    let (status, body) = app.call(Method::GET, "/api/v1/companies", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = spawn_app(false, 10).await;
    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": ADMIN_EMAIL, "password": "not-the-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_is_rate_limited_per_email() {
    let app = spawn_app(false, 2).await;
    let attempt = json!({ "email": ADMIN_EMAIL, "password": "wrong-password" });

    for _ in 0..2 {
        let (status, _) = app
            .call(Method::POST, "/api/v1/auth/login", None, Some(attempt.clone()))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, body) = app
        .call(Method::POST, "/api/v1/auth/login", None, Some(attempt))
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "RATE_LIMITED");
}

#[tokio::test]
async fn test_me_returns_current_user_without_hash() {
    let app = spawn_app(false, 10).await;
    let token = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = app.call(Method::GET, "/api/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], ADMIN_EMAIL);
    assert_eq!(body["data"]["role"], "SUPER_ADMIN");
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_invalid_body_is_validation_error() {
    let app = spawn_app(false, 10).await;
    let token = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = app
        .call(Method::POST, "/api/v1/companies", Some(&token), Some(json!({ "name": "" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_order_lifecycle_notifies_client() {
    let app = spawn_app(false, 10).await;
    let token = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (_, store_id, client_id) = app.seed_tenant(&token).await;

    let created = app.create_order(&token, &store_id, &client_id).await;
    assert_eq!(created["order"]["number"], 1);
    assert_eq!(created["order"]["status"], "RECEIVED");
    assert_eq!(created["order"]["total_cents"], 35000);
    assert_eq!(created["change"]["notification"], "SENT");
    let order_id = created["order"]["id"].as_str().unwrap().to_string();

    for next in ["IN_PROGRESS", "PAUSED", "IN_PROGRESS", "FINISHED", "PAID"] {
        let (status, body) = app
            .call(
                Method::PATCH,
                &format!("/api/v1/service-orders/{}/status", order_id),
                Some(&token),
                Some(json!({ "status": next })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["data"]["order"]["status"], next);
        assert_eq!(body["data"]["change"]["notification"], "SENT");
    }

    let (status, history) = app
        .call(
            Method::GET,
            &format!("/api/v1/service-orders/{}/history", order_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let entries = history["data"].as_array().unwrap();
    assert_eq!(entries.len(), 6);
    assert!(entries[0]["from_status"].is_null());
    assert_eq!(entries[5]["to_status"], "PAID");

    let sent = app.notifier.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 6);
    assert!(sent.iter().all(|(phone, _)| phone == "5511987654321"));
    assert_eq!(sent.last().map(|(_, status)| *status), Some(OrderStatus::Paid));
}

#[tokio::test]
async fn test_invalid_transition_is_rejected() {
    let app = spawn_app(false, 10).await;
    let token = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (_, store_id, client_id) = app.seed_tenant(&token).await;
    let created = app.create_order(&token, &store_id, &client_id).await;
    let order_id = created["order"]["id"].as_str().unwrap();

    let (status, body) = app
        .call(
            Method::PATCH,
            &format!("/api/v1/service-orders/{}/status", order_id),
            Some(&token),
            Some(json!({ "status": "PAID" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "INVALID_STATE");
}

#[tokio::test]
async fn test_gateway_failure_does_not_fail_status_change() {
    let app = spawn_app(true, 10).await;
    let token = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (_, store_id, client_id) = app.seed_tenant(&token).await;
    let created = app.create_order(&token, &store_id, &client_id).await;
    assert_eq!(created["change"]["notification"], "FAILED");
    let order_id = created["order"]["id"].as_str().unwrap();

    let (status, body) = app
        .call(
            Method::PATCH,
            &format!("/api/v1/service-orders/{}/status", order_id),
            Some(&token),
            Some(json!({ "status": "IN_PROGRESS", "note": "Bench 3" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["order"]["status"], "IN_PROGRESS");
    assert_eq!(body["data"]["change"]["notification"], "FAILED");
    assert!(body["data"]["change"]["notification_error"].is_string());
}

#[tokio::test]
async fn test_employee_is_confined_to_their_store() {
    let app = spawn_app(false, 10).await;
    let admin = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (company_id, store_id, client_id) = app.seed_tenant(&admin).await;

    let (status, other_store) = app
        .call(
            Method::POST,
            "/api/v1/stores",
            Some(&admin),
            Some(json!({ "company_id": company_id, "name": "Uptown" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let other_store_id = other_store["data"]["id"].as_str().unwrap();

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/users",
            Some(&admin),
            Some(json!({
                "name": "Joao Tecnico",
                "email": "joao@servorder.test",
                "password": "Quartz-Meadow-Violin-42",
                "role": "EMPLOYEE",
                "company_id": company_id,
                "store_id": other_store_id
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let created = app.create_order(&admin, &store_id, &client_id).await;
    let order_id = created["order"]["id"].as_str().unwrap();

    let employee = app.login("joao@servorder.test", "Quartz-Meadow-Violin-42").await;

    let (status, _) = app
        .call(Method::GET, &format!("/api/v1/service-orders/{}", order_id), Some(&employee), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, page) = app
        .call(Method::GET, "/api/v1/service-orders", Some(&employee), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["data"]["total"], 0);

    let (status, _) = app
        .call(Method::POST, "/api/v1/companies", Some(&employee), Some(json!({ "name": "Rogue Co" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_dashboard_summary_counts_by_status() {
    let app = spawn_app(false, 10).await;
    let token = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (_, store_id, client_id) = app.seed_tenant(&token).await;

    app.create_order(&token, &store_id, &client_id).await;
    let second = app.create_order(&token, &store_id, &client_id).await;
    assert_eq!(second["order"]["number"], 2);

    let (status, body) = app
        .call(
            Method::GET,
            &format!("/api/v1/dashboard?store_id={}", store_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_orders"], 2);
    assert_eq!(body["data"]["open_orders"], 2);
    assert_eq!(body["data"]["revenue_cents"], 0);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = spawn_app(false, 10).await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

fn assert_error_envelope(body: &Value, code: &str) {
    assert_eq!(body["success"], false, "{}", body);
    assert!(body["data"].is_null());
    assert_eq!(body["error"]["code"], code);
    assert!(body["error"]["message"].is_string());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_malformed_path_id_uses_error_envelope() {
    let app = spawn_app(false, 10).await;
    let token = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = app
        .call(Method::GET, "/api/v1/service-orders/not-a-uuid", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_envelope(&body, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_bad_query_value_uses_error_envelope() {
    let app = spawn_app(false, 10).await;
    let token = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = app
        .call(Method::GET, "/api/v1/service-orders?status=BOGUS", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_envelope(&body, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unknown_route_uses_error_envelope() {
    let app = spawn_app(false, 10).await;

    let (status, body) = app.call(Method::GET, "/api/v1/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error_envelope(&body, "NOT_FOUND");

    let (status, body) = app.call(Method::GET, "/elsewhere", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error_envelope(&body, "NOT_FOUND");
}

#[tokio::test]
async fn test_wrong_method_uses_error_envelope() {
    let app = spawn_app(false, 10).await;
    let token = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = app
        .call(Method::PATCH, "/api/v1/companies", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_error_envelope(&body, "METHOD_NOT_ALLOWED");

    let (status, body) = app.call(Method::POST, "/health", None, None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_error_envelope(&body, "METHOD_NOT_ALLOWED");
}

#[tokio::test]
async fn test_own_password_only_changes_through_auth_password() {
    let app = spawn_app(false, 10).await;
    let admin = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (company_id, store_id, _) = app.seed_tenant(&admin).await;

    let (status, created) = app
        .call(
            Method::POST,
            "/api/v1/users",
            Some(&admin),
            Some(json!({
                "name": "Ana Atendente",
                "email": "ana@servorder.test",
                "password": "Quartz-Meadow-Violin-42",
                "role": "EMPLOYEE",
                "company_id": company_id,
                "store_id": store_id
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    let employee_id = created["data"]["id"].as_str().unwrap().to_string();

    let employee = app.login("ana@servorder.test", "Quartz-Meadow-Violin-42").await;
    let (status, body) = app
        .call(
            Method::PUT,
            &format!("/api/v1/users/{}", employee_id),
            Some(&employee),
            Some(json!({ "password": "Hijacked-Walrus-Tundra-77" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error_envelope(&body, "FORBIDDEN");

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "ana@servorder.test", "password": "Hijacked-Walrus-Tundra-77" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/auth/password",
            Some(&employee),
            Some(json!({
                "current_password": "Quartz-Meadow-Violin-42",
                "new_password": "Copper-Lantern-Orchid-58"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    app.login("ana@servorder.test", "Copper-Lantern-Orchid-58").await;
}
