mod common;

use axum::http::{Method, StatusCode};
use common::{as_decimal, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn created_product_is_retrievable_with_identical_fields() {
    let app = TestApp::new().await;

    let (status, created) = app
        .post(
            "/api/v1/products",
            json!({ "name": "Pollo Asado", "price": 22000, "stock": 50 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = app.get(&format!("/api/v1/products/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Pollo Asado");
    assert_eq!(as_decimal(&fetched["price"]), dec!(22000));
    assert_eq!(fetched["stock"], 50);
}

#[tokio::test]
async fn stock_defaults_to_zero() {
    let app = TestApp::new().await;

    let (status, created) = app
        .post(
            "/api/v1/products",
            json!({ "name": "Pollo Broaster", "price": 20000 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["stock"], 0);
}

#[tokio::test]
async fn invalid_products_are_rejected() {
    let app = TestApp::new().await;

    // Name below the minimum length (after trimming).
    let (status, _) = app
        .post("/api/v1/products", json!({ "name": "  ab  ", "price": 100 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/products",
            json!({ "name": "Pollo Asado", "price": -1 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/products",
            json!({ "name": "Pollo Asado", "price": 100, "stock": -5 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/products",
            json!({ "name": "Pollo Asado", "price": 100, "flavour": "smoky" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_changes_only_the_provided_fields() {
    let app = TestApp::new().await;

    let (_, created) = app
        .post(
            "/api/v1/products",
            json!({ "name": "Pollo Asado", "price": 22000, "stock": 50 }),
        )
        .await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = app
        .patch(&format!("/api/v1/products/{id}"), json!({ "price": 24000 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Pollo Asado");
    assert_eq!(as_decimal(&updated["price"]), dec!(24000));
    assert_eq!(updated["stock"], 50);
}

#[tokio::test]
async fn adjust_stock_applies_exact_deltas() {
    let app = TestApp::new().await;

    let (_, created) = app
        .post(
            "/api/v1/products",
            json!({ "name": "Pollo Asado", "price": 22000, "stock": 10 }),
        )
        .await;
    let id = created["id"].as_str().unwrap();

    let (status, adjusted) = app
        .patch(&format!("/api/v1/products/{id}/stock"), json!({ "quantity": -4 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(adjusted["stock"], 6);

    let (status, adjusted) = app
        .patch(&format!("/api/v1/products/{id}/stock"), json!({ "quantity": 14 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(adjusted["stock"], 20);
}

#[tokio::test]
async fn adjust_stock_never_goes_negative() {
    let app = TestApp::new().await;

    let (_, created) = app
        .post(
            "/api/v1/products",
            json!({ "name": "Pollo Asado", "price": 22000, "stock": 3 }),
        )
        .await;
    let id = created["id"].as_str().unwrap();

    let (status, _) = app
        .patch(&format!("/api/v1/products/{id}/stock"), json!({ "quantity": -4 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The failed adjustment must leave stock untouched.
    let (_, fetched) = app.get(&format!("/api/v1/products/{id}")).await;
    assert_eq!(fetched["stock"], 3);
}

#[tokio::test]
async fn missing_products_yield_not_found() {
    let app = TestApp::new().await;
    let missing = Uuid::new_v4();

    let (status, _) = app.get(&format!("/api/v1/products/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .patch(
            &format!("/api/v1/products/{missing}"),
            json!({ "price": 100 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&format!("/api/v1/products/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .patch(
            &format!("/api/v1/products/{missing}/stock"),
            json!({ "quantity": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn requests_without_a_token_are_unauthorized() {
    let app = TestApp::new().await;

    let (status, _) = app
        .request_with_token(Method::GET, "/api/v1/products", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request_with_token(Method::GET, "/api/v1/products", None, Some("not-a-jwt"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
