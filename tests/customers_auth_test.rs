mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::{json, Value};
use uuid::Uuid;

#[tokio::test]
async fn customer_crud_round_trip() {
    let app = TestApp::new().await;

    let (status, created) = app
        .post(
            "/api/v1/customers",
            json!({
                "name": "  Ana Ruiz  ",
                "phone": "3001234567",
                "email": "ana.ruiz@gmail.com",
                "address": "Calle 10 #20-30",
                "notes": "Paga los viernes"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    // String fields are trimmed before validation and storage.
    assert_eq!(created["name"], "Ana Ruiz");
    let id = created["id"].as_str().unwrap();

    let (status, fetched) = app.get(&format!("/api/v1/customers/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["phone"], "3001234567");
    assert_eq!(fetched["email"], "ana.ruiz@gmail.com");

    let (status, updated) = app
        .patch(
            &format!("/api/v1/customers/{id}"),
            json!({ "notes": "Al día" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["notes"], "Al día");
    assert_eq!(updated["name"], "Ana Ruiz");

    let (status, _) = app.delete(&format!("/api/v1/customers/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("/api/v1/customers/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_customers_are_rejected() {
    let app = TestApp::new().await;

    let (status, _) = app.post("/api/v1/customers", json!({ "name": "A" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/customers",
            json!({ "name": "Ana Ruiz", "phone": "12345" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/customers",
            json!({ "name": "Ana Ruiz", "email": "not-an-email" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/customers",
            json!({ "name": "Ana Ruiz", "nickname": "Anita" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_customers_yield_not_found() {
    let app = TestApp::new().await;
    let missing = Uuid::new_v4();

    let (status, _) = app.get(&format!("/api/v1/customers/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .patch(
            &format!("/api/v1/customers/{missing}"),
            json!({ "name": "Nadie" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&format!("/api/v1/customers/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sign_in_returns_a_working_token() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request_with_token(
            Method::POST,
            "/api/v1/auth/signin",
            Some(json!({ "email": "admin@brasas.local", "password": "123456" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    let token = body["access_token"].as_str().unwrap().to_string();

    let (status, profile) = app
        .request_with_token(Method::GET, "/api/v1/auth/profile", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["username"], "Admin");
    assert_eq!(profile["email"], "admin@brasas.local");
    // The password hash must never be serialized.
    assert_eq!(profile.get("password"), None);
    assert_eq!(profile.get("passwordHash"), None);
}

#[tokio::test]
async fn bad_credentials_fail_identically() {
    let app = TestApp::new().await;

    let (status, wrong_password) = app
        .request_with_token(
            Method::POST,
            "/api/v1/auth/signin",
            Some(json!({ "email": "admin@brasas.local", "password": "wrong" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown_email) = app
        .request_with_token(
            Method::POST,
            "/api/v1/auth/signin",
            Some(json!({ "email": "nobody@brasas.local", "password": "123456" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // No user-enumeration oracle: both failures carry the same message.
    assert!(wrong_password["message"].is_string());
    assert_eq!(wrong_password["message"], unknown_email["message"]);
}

#[tokio::test]
async fn profile_requires_a_token() {
    let app = TestApp::new().await;

    let (status, _) = app
        .request_with_token(Method::GET, "/api/v1/auth/profile", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_sign_in_payloads_are_validation_failures() {
    let app = TestApp::new().await;

    let (status, _) = app
        .request_with_token(
            Method::POST,
            "/api/v1/auth/signin",
            Some(json!({ "email": "not-an-email", "password": "123456" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request_with_token(
            Method::POST,
            "/api/v1/auth/signin",
            Some(json!({ "email": "admin@brasas.local", "password": "123456", "remember": true })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_customer_keeps_their_sales() {
    let app = TestApp::new().await;

    let (_, product) = app
        .post(
            "/api/v1/products",
            json!({ "name": "Pollo Asado", "price": 22000, "stock": 5 }),
        )
        .await;
    let product_id = product["id"].as_str().unwrap().to_string();

    let (_, customer) = app
        .post("/api/v1/customers", json!({ "name": "Ana Ruiz" }))
        .await;
    let customer_id = customer["id"].as_str().unwrap().to_string();

    let (status, sale) = app
        .post(
            "/api/v1/sales",
            json!({
                "products": [{ "product": product_id, "quantity": 1 }],
                "customer": customer_id,
                "total": 22000,
                "isDebt": false
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let sale_id = sale["id"].as_str().unwrap().to_string();

    let (status, _) = app.delete(&format!("/api/v1/customers/{customer_id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The historical sale survives with a dangling customer reference.
    let (status, fetched) = app.get(&format!("/api/v1/sales/{sale_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["customer"], Value::String(customer_id.clone()));

    // But the per-customer query now resolves to not-found.
    let (status, _) = app
        .get(&format!("/api/v1/sales/customer/{customer_id}"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
