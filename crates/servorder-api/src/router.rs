//! Route table and middleware stack

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;

use servorder_shared::config::AppSettings;

use crate::error::ApiError;
use crate::handlers::{self, auth, clients, companies, dashboard, health, service_orders, stores, users};
use crate::state::AppState;

pub fn build_router(state: AppState, settings: &AppSettings) -> Router {
    let api = Router::new()
        // Auth routes
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/me", get(auth::me))
        .route("/auth/password", post(auth::change_password))
        // Companies
        .route("/companies", get(companies::list).post(companies::create))
        .route(
            "/companies/{id}",
            get(companies::get).put(companies::update).delete(companies::delete),
        )
        // Stores
        .route("/stores", get(stores::list).post(stores::create))
        .route(
            "/stores/{id}",
            get(stores::get).put(stores::update).delete(stores::delete),
        )
        // Users
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/{id}",
            get(users::get).put(users::update).delete(users::delete),
        )
        // Clients
        .route("/clients", get(clients::list).post(clients::create))
        .route(
            "/clients/{id}",
            get(clients::get).put(clients::update).delete(clients::delete),
        )
        // Service orders
        .route(
            "/service-orders",
            get(service_orders::list).post(service_orders::create),
        )
        .route(
            "/service-orders/{id}",
            get(service_orders::get)
                .put(service_orders::update)
                .delete(service_orders::delete),
        )
        .route("/service-orders/{id}/status", patch(service_orders::change_status))
        .route("/service-orders/{id}/history", get(service_orders::history))
        // Dashboard
        .route("/dashboard", get(dashboard::summary))
        .method_not_allowed_fallback(handlers::method_not_allowed);

    let router = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .nest("/api/v1", api)
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .with_state(state);

    with_middleware(router, settings)
}

fn with_middleware(router: Router, settings: &AppSettings) -> Router {
    router
        .layer(cors_layer(&settings.cors_origins))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(settings.request_timeout_secs),
        ))
        .layer(middleware::map_response(envelope_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// The timeout layer answers with a bare 408; give it the usual error body.
async fn envelope_timeout(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        ApiError::Timeout.into_response()
    } else {
        response
    }
}

/// An empty origin list allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn settings(request_timeout_secs: u64) -> AppSettings {
        AppSettings {
            env: "test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            name: "servorder-test".to_string(),
            cors_origins: Vec::new(),
            request_timeout_secs,
        }
    }

    #[tokio::test]
    async fn test_slow_handler_gets_timeout_envelope() {
        let slow = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                "late"
            }),
        );
        let router = with_middleware(slow, &settings(1));

        let request = Request::builder().uri("/slow").body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "TIMEOUT");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_fast_handler_passes_through() {
        let fast = Router::new().route("/fast", get(|| async { "ok" }));
        let router = with_middleware(fast, &settings(5));

        let request = Request::builder().uri("/fast").body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }
}
