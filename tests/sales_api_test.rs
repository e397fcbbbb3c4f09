mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{as_decimal, TestApp};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::{json, Value};
use uuid::Uuid;

use brasas_pos_api::entities::sale;

async fn create_product(app: &TestApp, name: &str, price: i64, stock: i64) -> String {
    let (status, body) = app
        .post(
            "/api/v1/products",
            json!({ "name": name, "price": price, "stock": stock }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "product create failed: {body}");
    body["id"].as_str().expect("product id").to_string()
}

async fn create_customer(app: &TestApp, name: &str) -> String {
    let (status, body) = app
        .post("/api/v1/customers", json!({ "name": name }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "customer create failed: {body}");
    body["id"].as_str().expect("customer id").to_string()
}

#[tokio::test]
async fn record_sale_returns_the_persisted_sale() {
    let app = TestApp::new().await;
    let product_id = create_product(&app, "Grilled Chicken", 25000, 10).await;
    let customer_id = create_customer(&app, "Ana Ruiz").await;

    let (status, body) = app
        .post(
            "/api/v1/sales",
            json!({
                "products": [{ "product": product_id, "quantity": 2 }],
                "customer": customer_id,
                "total": 50000,
                "isDebt": false
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "sale create failed: {body}");
    assert!(body["id"].as_str().is_some());
    assert!(body["createdAt"].as_str().is_some());
    assert_eq!(body["products"].as_array().unwrap().len(), 1);
    assert_eq!(body["products"][0]["quantity"], 2);
    assert_eq!(body["products"][0]["product"], Value::String(product_id.clone()));
    assert_eq!(as_decimal(&body["total"]), dec!(50000));
    assert_eq!(body["customer"], Value::String(customer_id));
    assert_eq!(body["isDebt"], Value::Bool(false));

    // Recording a sale must not touch product stock.
    let (_, product) = app.get(&format!("/api/v1/products/{product_id}")).await;
    assert_eq!(product["stock"], 10);
}

#[tokio::test]
async fn sale_with_unknown_customer_is_rejected_and_nothing_is_persisted() {
    let app = TestApp::new().await;
    let product_id = create_product(&app, "Grilled Chicken", 25000, 10).await;

    let (status, _) = app
        .post(
            "/api/v1/sales",
            json!({
                "products": [{ "product": product_id, "quantity": 1 }],
                "customer": Uuid::new_v4(),
                "total": 25000,
                "isDebt": false
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, sales) = app.get("/api/v1/sales").await;
    assert_eq!(sales.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn sale_with_unknown_product_is_rejected_and_nothing_is_persisted() {
    let app = TestApp::new().await;
    let product_id = create_product(&app, "Grilled Chicken", 25000, 10).await;
    let customer_id = create_customer(&app, "Ana Ruiz").await;

    let (status, _) = app
        .post(
            "/api/v1/sales",
            json!({
                "products": [
                    { "product": product_id, "quantity": 1 },
                    { "product": Uuid::new_v4(), "quantity": 1 }
                ],
                "customer": customer_id,
                "total": 25000,
                "isDebt": false
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, sales) = app.get("/api/v1/sales").await;
    assert_eq!(sales.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn sale_without_lines_is_a_validation_failure() {
    let app = TestApp::new().await;
    let customer_id = create_customer(&app, "Ana Ruiz").await;

    let (status, _) = app
        .post(
            "/api/v1/sales",
            json!({
                "products": [],
                "customer": customer_id,
                "total": 0,
                "isDebt": false
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_fields_are_rejected() {
    let app = TestApp::new().await;
    let product_id = create_product(&app, "Grilled Chicken", 25000, 10).await;
    let customer_id = create_customer(&app, "Ana Ruiz").await;

    let (status, _) = app
        .post(
            "/api/v1/sales",
            json!({
                "products": [{ "product": product_id, "quantity": 1 }],
                "customer": customer_id,
                "total": 25000,
                "isDebt": false,
                "discount": 10
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn line_order_is_preserved() {
    let app = TestApp::new().await;
    let first = create_product(&app, "Pollo Asado", 22000, 5).await;
    let second = create_product(&app, "Pollo Frito", 18000, 5).await;
    let third = create_product(&app, "Pollo Broaster", 20000, 5).await;
    let customer_id = create_customer(&app, "Ana Ruiz").await;

    let (status, body) = app
        .post(
            "/api/v1/sales",
            json!({
                "products": [
                    { "product": first, "quantity": 1 },
                    { "product": second, "quantity": 2 },
                    { "product": third, "quantity": 3 }
                ],
                "customer": customer_id,
                "total": 118000,
                "isDebt": false
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let sale_id = body["id"].as_str().unwrap();
    let (_, fetched) = app.get(&format!("/api/v1/sales/{sale_id}")).await;
    let products: Vec<&str> = fetched["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|line| line["product"].as_str().unwrap())
        .collect();
    assert_eq!(products, vec![first.as_str(), second.as_str(), third.as_str()]);
}

#[tokio::test]
async fn debt_lifecycle_is_tracked_by_the_debts_query() {
    let app = TestApp::new().await;
    let product_id = create_product(&app, "Grilled Chicken", 25000, 10).await;
    let customer_id = create_customer(&app, "Ana Ruiz").await;

    let (status, body) = app
        .post(
            "/api/v1/sales",
            json!({
                "products": [{ "product": product_id, "quantity": 2 }],
                "customer": customer_id,
                "total": 50000,
                "isDebt": true,
                "debtAmount": 50000
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["isDebt"], Value::Bool(true));
    assert_eq!(as_decimal(&body["debtAmount"]), dec!(50000));
    let sale_id = body["id"].as_str().unwrap().to_string();

    let (_, debts) = app.get("/api/v1/sales/debts").await;
    let debt_ids: Vec<&str> = debts
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert!(debt_ids.contains(&sale_id.as_str()));

    // Settling the debt removes the sale from the debts listing.
    let (status, updated) = app
        .patch(&format!("/api/v1/sales/{sale_id}"), json!({ "isDebt": false }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["isDebt"], Value::Bool(false));

    let (_, debts) = app.get("/api/v1/sales/debts").await;
    assert!(debts
        .as_array()
        .unwrap()
        .iter()
        .all(|s| s["id"].as_str().unwrap() != sale_id));
}

#[tokio::test]
async fn today_query_excludes_older_sales() {
    let app = TestApp::new().await;
    let product_id = create_product(&app, "Grilled Chicken", 25000, 10).await;
    let customer_id = create_customer(&app, "Ana Ruiz").await;

    let (status, body) = app
        .post(
            "/api/v1/sales",
            json!({
                "products": [{ "product": product_id, "quantity": 1 }],
                "customer": customer_id,
                "total": 25000,
                "isDebt": false
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let today_sale_id = body["id"].as_str().unwrap().to_string();

    // Backdate a second sale well past yesterday's local midnight.
    let old_sale_id = Uuid::new_v4();
    let record = sale::ActiveModel {
        id: Set(old_sale_id),
        customer_id: Set(Uuid::parse_str(&customer_id).unwrap()),
        total: Set(dec!(10000)),
        is_debt: Set(false),
        debt_amount: Set(None),
        debt_date: Set(None),
        created_at: Set(Utc::now() - chrono::Duration::days(2)),
    };
    record
        .insert(&*app.state.db)
        .await
        .expect("backdated sale insert");

    let (_, today) = app.get("/api/v1/sales/today").await;
    let ids: Vec<&str> = today
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&today_sale_id.as_str()));
    assert!(!ids.contains(&old_sale_id.to_string().as_str()));

    // Both are visible in the unfiltered listing.
    let (_, all) = app.get("/api/v1/sales").await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn customer_query_returns_only_their_sales() {
    let app = TestApp::new().await;
    let product_id = create_product(&app, "Grilled Chicken", 25000, 10).await;
    let ana = create_customer(&app, "Ana Ruiz").await;
    let pedro = create_customer(&app, "Pedro López").await;

    for (customer, total) in [(&ana, 25000), (&pedro, 50000)] {
        let (status, _) = app
            .post(
                "/api/v1/sales",
                json!({
                    "products": [{ "product": product_id, "quantity": 1 }],
                    "customer": customer,
                    "total": total,
                    "isDebt": false
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, sales) = app.get(&format!("/api/v1/sales/customer/{ana}")).await;
    assert_eq!(status, StatusCode::OK);
    let sales = sales.as_array().unwrap();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0]["customer"], Value::String(ana.clone()));

    let (status, _) = app
        .get(&format!("/api/v1/sales/customer/{}", Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_sales_yield_not_found_never_silent_success() {
    let app = TestApp::new().await;
    let missing = Uuid::new_v4();

    let (status, _) = app.get(&format!("/api/v1/sales/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .patch(&format!("/api/v1/sales/{missing}"), json!({ "isDebt": false }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&format!("/api/v1/sales/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleted_sale_is_gone() {
    let app = TestApp::new().await;
    let product_id = create_product(&app, "Grilled Chicken", 25000, 10).await;
    let customer_id = create_customer(&app, "Ana Ruiz").await;

    let (_, body) = app
        .post(
            "/api/v1/sales",
            json!({
                "products": [{ "product": product_id, "quantity": 1 }],
                "customer": customer_id,
                "total": 25000,
                "isDebt": false
            }),
        )
        .await;
    let sale_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = app.delete(&format!("/api/v1/sales/{sale_id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("/api/v1/sales/{sale_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
