#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    middleware,
    Router,
};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use brasas_pos_api::{
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db::{self, DbConfig},
    handlers::AppServices,
    AppState,
};

const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_purposes_only_32chars";

/// Test harness: the full router backed by a private in-memory SQLite
/// database, with a signed-in admin token ready to use.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub token: String,
    pub auth_service: Arc<AuthService>,
}

impl TestApp {
    pub async fn new() -> Self {
        // A single pooled connection keeps the in-memory database alive and
        // private to this instance.
        let pool = db::establish_connection_with_config(&DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        })
        .await
        .expect("failed to create test database");

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            TEST_JWT_SECRET.to_string(),
            "127.0.0.1".to_string(),
            0,
        );

        let db_arc = Arc::new(pool);
        let auth_cfg = AuthConfig::new(TEST_JWT_SECRET.to_string(), Duration::from_secs(3600));
        let auth_service = Arc::new(AuthService::new(auth_cfg, db_arc.clone()));
        let services = AppServices::new(db_arc.clone(), auth_service.clone());

        let state = AppState {
            db: db_arc,
            config: cfg,
            services,
        };

        let admin = auth_service
            .create_user("Admin", "admin@brasas.local", "123456")
            .await
            .expect("failed to seed test admin");
        let token = auth_service
            .generate_token(&admin)
            .expect("failed to mint test token");

        let auth_for_layer = auth_service.clone();
        let router = Router::new()
            .nest("/api/v1", brasas_pos_api::api_v1_routes())
            .layer(middleware::from_fn_with_state(
                auth_for_layer,
                |axum::extract::State(auth): axum::extract::State<Arc<AuthService>>,
                 mut req: Request<Body>,
                 next: middleware::Next| async move {
                    req.extensions_mut().insert(auth);
                    next.run(req).await
                },
            ))
            .with_state(state.clone());

        Self {
            router,
            state,
            token,
            auth_service,
        }
    }

    /// Issue a request with the admin bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.request_with_token(method, uri, body, Some(&self.token))
            .await
    }

    /// Issue a request with an explicit (or no) bearer token.
    pub async fn request_with_token(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("request build"),
            None => builder.body(Body::empty()).expect("request build"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request should not fail at the transport level");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body collect")
            .to_bytes();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }
}

/// Decimals serialize as JSON strings; accept numbers too for convenience.
pub fn as_decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().expect("decimal string"),
        Value::Number(n) => n.to_string().parse().expect("decimal number"),
        other => panic!("expected decimal-compatible value, got {other:?}"),
    }
}
