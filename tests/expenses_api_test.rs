mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{as_decimal, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

async fn create_expense(
    app: &TestApp,
    description: &str,
    category: &str,
    amount: i64,
    date: &str,
) -> String {
    let (status, body) = app
        .post(
            "/api/v1/expenses",
            json!({
                "description": description,
                "category": category,
                "amount": amount,
                "date": date
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "expense create failed: {body}");
    body["id"].as_str().expect("expense id").to_string()
}

#[tokio::test]
async fn expense_crud_round_trip() {
    let app = TestApp::new().await;

    let id = create_expense(
        &app,
        "Bolsas para domicilio",
        "insumos",
        35000,
        "2025-08-01T10:00:00Z",
    )
    .await;

    let (status, fetched) = app.get(&format!("/api/v1/expenses/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["description"], "Bolsas para domicilio");
    assert_eq!(fetched["category"], "insumos");
    assert_eq!(as_decimal(&fetched["amount"]), dec!(35000));

    let (status, updated) = app
        .patch(
            &format!("/api/v1/expenses/{id}"),
            json!({ "amount": 40000, "notes": "precio nuevo" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_decimal(&updated["amount"]), dec!(40000));
    assert_eq!(updated["notes"], "precio nuevo");

    let (status, _) = app.delete(&format!("/api/v1/expenses/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("/api/v1/expenses/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_category_is_rejected() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post(
            "/api/v1/expenses",
            json!({
                "description": "Cosa rara",
                "category": "juguetes",
                "amount": 100,
                "date": "2025-08-01T10:00:00Z"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_expenses_yield_not_found() {
    let app = TestApp::new().await;
    let missing = Uuid::new_v4();

    let (status, _) = app.get(&format!("/api/v1/expenses/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .patch(&format!("/api/v1/expenses/{missing}"), json!({ "amount": 1 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&format!("/api/v1/expenses/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn today_listing_uses_utc_day_boundaries() {
    let app = TestApp::new().await;

    let now = Utc::now();
    let today_id = create_expense(
        &app,
        "Compra del día",
        "pollo",
        100,
        &now.to_rfc3339(),
    )
    .await;
    let old_id = create_expense(
        &app,
        "Compra vieja",
        "pollo",
        100,
        &(now - Duration::days(3)).to_rfc3339(),
    )
    .await;

    let (status, listed) = app.get("/api/v1/expenses/today/list").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&today_id.as_str()));
    assert!(!ids.contains(&old_id.as_str()));
}

#[tokio::test]
async fn range_listing_includes_both_boundary_instants() {
    let app = TestApp::new().await;

    let at_start = create_expense(
        &app,
        "Justo al inicio",
        "pollo",
        10,
        "2025-07-01T00:00:00.000Z",
    )
    .await;
    let at_end = create_expense(
        &app,
        "Justo al final",
        "pollo",
        20,
        "2025-07-03T23:59:59.999Z",
    )
    .await;
    let before = create_expense(
        &app,
        "Antes del rango",
        "pollo",
        30,
        "2025-06-30T23:59:59.999Z",
    )
    .await;
    let after = create_expense(
        &app,
        "Después del rango",
        "pollo",
        40,
        "2025-07-04T00:00:00.000Z",
    )
    .await;

    let (status, listed) = app
        .get("/api/v1/expenses/range/list?startDate=2025-07-01&endDate=2025-07-03")
        .await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&at_start.as_str()));
    assert!(ids.contains(&at_end.as_str()));
    assert!(!ids.contains(&before.as_str()));
    assert!(!ids.contains(&after.as_str()));
}

#[tokio::test]
async fn range_listing_rejects_malformed_dates() {
    let app = TestApp::new().await;

    let (status, _) = app
        .get("/api/v1/expenses/range/list?startDate=01-07-2025&endDate=2025-07-03")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listings_are_sorted_by_date_descending() {
    let app = TestApp::new().await;

    create_expense(&app, "Primera compra", "pollo", 10, "2025-07-01T08:00:00Z").await;
    create_expense(&app, "Tercera compra", "pollo", 30, "2025-07-03T08:00:00Z").await;
    create_expense(&app, "Segunda compra", "pollo", 20, "2025-07-02T08:00:00Z").await;

    let (_, listed) = app.get("/api/v1/expenses").await;
    let descriptions: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["description"].as_str().unwrap())
        .collect();
    assert_eq!(
        descriptions,
        vec!["Tercera compra", "Segunda compra", "Primera compra"]
    );
}

#[tokio::test]
async fn total_is_zero_for_an_empty_ledger() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/v1/expenses/stats/total").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_decimal(&body["total"]), dec!(0));
}

#[tokio::test]
async fn totals_accumulate_per_category() {
    let app = TestApp::new().await;

    create_expense(&app, "Pollo lote 1", "pollo", 100, "2025-07-01T08:00:00Z").await;
    create_expense(&app, "Pollo lote 2", "pollo", 50, "2025-07-02T08:00:00Z").await;
    create_expense(&app, "Imprevisto", "otros", 20, "2025-07-02T09:00:00Z").await;

    let (status, body) = app.get("/api/v1/expenses/stats/total").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_decimal(&body["total"]), dec!(170));

    let (status, grouped) = app.get("/api/v1/expenses/stats/by-category").await;
    assert_eq!(status, StatusCode::OK);
    let grouped = grouped.as_array().unwrap();
    assert_eq!(grouped.len(), 2);

    let find = |category: &str| {
        grouped
            .iter()
            .find(|row| row["category"] == category)
            .unwrap_or_else(|| panic!("missing category {category}"))
    };
    assert_eq!(as_decimal(&find("pollo")["total"]), dec!(150));
    assert_eq!(as_decimal(&find("otros")["total"]), dec!(20));
}
