use crate::auth::AuthenticatedUser;
use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    AppJson,
};
use crate::{
    errors::ApiError,
    services::sales::{RecordSaleInput, SaleLineInput, SaleWithLines, UpdateSaleInput},
    AppState,
};
use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn validate_decimal_min_zero(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("decimal_min_zero"));
    }
    Ok(())
}

/// Creates the router for sale endpoints
pub fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sales).post(create_sale))
        .route("/today", get(list_today_sales))
        .route("/debts", get(list_debt_sales))
        .route("/customer/:id", get(list_sales_for_customer))
        .route(
            "/:id",
            get(get_sale).patch(update_sale).delete(delete_sale),
        )
}

/// Record a sale
#[utoipa::path(
    post,
    path = "/api/v1/sales",
    request_body = CreateSaleRequest,
    responses(
        (status = 201, description = "Sale recorded", body = SaleResponse),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Referenced customer or product not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Sales"
)]
pub async fn create_sale(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateSaleRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = RecordSaleInput {
        lines: payload
            .products
            .into_iter()
            .map(|line| SaleLineInput {
                product_id: line.product,
                quantity: line.quantity,
            })
            .collect(),
        customer_id: payload.customer,
        total: payload.total,
        is_debt: payload.is_debt,
        debt_amount: payload.debt_amount,
        debt_date: payload.debt_date,
    };

    let sale = state
        .services
        .sales
        .record_sale(input)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(SaleResponse::from(sale)))
}

/// List all sales
#[utoipa::path(
    get,
    path = "/api/v1/sales",
    responses((status = 200, description = "Sales retrieved", body = Vec<SaleResponse>)),
    security(("Bearer" = [])),
    tag = "Sales"
)]
pub async fn list_sales(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let sales = state
        .services
        .sales
        .list_sales()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(to_responses(sales)))
}

/// List the sales recorded today (local calendar day)
#[utoipa::path(
    get,
    path = "/api/v1/sales/today",
    responses((status = 200, description = "Today's sales", body = Vec<SaleResponse>)),
    security(("Bearer" = [])),
    tag = "Sales"
)]
pub async fn list_today_sales(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let sales = state
        .services
        .sales
        .list_today_sales()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(to_responses(sales)))
}

/// List the sales flagged as debt
#[utoipa::path(
    get,
    path = "/api/v1/sales/debts",
    responses((status = 200, description = "Debt sales", body = Vec<SaleResponse>)),
    security(("Bearer" = [])),
    tag = "Sales"
)]
pub async fn list_debt_sales(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let sales = state
        .services
        .sales
        .list_debt_sales()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(to_responses(sales)))
}

/// List the sales of one customer
#[utoipa::path(
    get,
    path = "/api/v1/sales/customer/:id",
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer sales", body = Vec<SaleResponse>),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Sales"
)]
pub async fn list_sales_for_customer(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let sales = state
        .services
        .sales
        .list_sales_for_customer(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(to_responses(sales)))
}

/// Get a sale by ID
#[utoipa::path(
    get,
    path = "/api/v1/sales/:id",
    params(("id" = Uuid, Path, description = "Sale ID")),
    responses(
        (status = 200, description = "Sale retrieved", body = SaleResponse),
        (status = 404, description = "Sale not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Sales"
)]
pub async fn get_sale(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let sale = state
        .services
        .sales
        .get_sale(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(SaleResponse::from(sale)))
}

/// Update the payment terms of a sale (e.g. settle a debt)
#[utoipa::path(
    patch,
    path = "/api/v1/sales/:id",
    params(("id" = Uuid, Path, description = "Sale ID")),
    request_body = UpdateSaleRequest,
    responses(
        (status = 200, description = "Sale updated", body = SaleResponse),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Sale not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Sales"
)]
pub async fn update_sale(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateSaleRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = UpdateSaleInput {
        is_debt: payload.is_debt,
        debt_amount: payload.debt_amount,
        debt_date: payload.debt_date,
    };

    let sale = state
        .services
        .sales
        .update_sale(id, input)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(SaleResponse::from(sale)))
}

/// Delete a sale
#[utoipa::path(
    delete,
    path = "/api/v1/sales/:id",
    params(("id" = Uuid, Path, description = "Sale ID")),
    responses(
        (status = 204, description = "Sale deleted"),
        (status = 404, description = "Sale not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Sales"
)]
pub async fn delete_sale(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .sales
        .delete_sale(id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

fn to_responses(sales: Vec<SaleWithLines>) -> Vec<SaleResponse> {
    sales.into_iter().map(SaleResponse::from).collect()
}

/// One product/quantity pair of a sale request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SaleLineRequest {
    /// Referenced product ID
    pub product: Uuid,
    #[validate(range(min = 1))]
    #[schema(example = 2)]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateSaleRequest {
    /// Ordered line items; the service rejects an empty sequence
    #[validate]
    pub products: Vec<SaleLineRequest>,
    /// Referenced customer ID
    pub customer: Uuid,
    /// Declared total; stored verbatim
    #[validate(custom = "validate_decimal_min_zero")]
    #[schema(example = "50000")]
    pub total: Decimal,
    pub is_debt: bool,
    #[serde(default)]
    #[validate(custom = "validate_decimal_min_zero")]
    pub debt_amount: Option<Decimal>,
    #[serde(default)]
    pub debt_date: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateSaleRequest {
    pub is_debt: Option<bool>,
    #[serde(default)]
    #[validate(custom = "validate_decimal_min_zero")]
    pub debt_amount: Option<Decimal>,
    #[serde(default)]
    pub debt_date: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleLineResponse {
    pub product: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleResponse {
    pub id: Uuid,
    pub products: Vec<SaleLineResponse>,
    #[schema(example = "50000")]
    pub total: Decimal,
    /// Referenced customer ID
    pub customer: Uuid,
    pub is_debt: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt_date: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<SaleWithLines> for SaleResponse {
    fn from(record: SaleWithLines) -> Self {
        Self {
            id: record.sale.id,
            products: record
                .lines
                .into_iter()
                .map(|line| SaleLineResponse {
                    product: line.product_id,
                    quantity: line.quantity,
                })
                .collect(),
            total: record.sale.total,
            customer: record.sale.customer_id,
            is_debt: record.sale.is_debt,
            debt_amount: record.sale.debt_amount,
            debt_date: record.sale.debt_date,
            created_at: record.sale.created_at,
        }
    }
}
