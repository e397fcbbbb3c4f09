use crate::auth::AuthenticatedUser;
use crate::entities::expense::ExpenseCategory;
use crate::handlers::common::{
    created_response, map_service_error, no_content_response, normalize_optional_string,
    normalize_string, success_response, validate_input, AppJson,
};
use crate::{
    errors::ApiError,
    services::ledger::{CategoryTotal, CreateExpenseInput, UpdateExpenseInput},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn validate_decimal_min_zero(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("decimal_min_zero"));
    }
    Ok(())
}

/// Creates the router for expense endpoints
pub fn expense_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_expenses).post(create_expense))
        .route("/today/list", get(list_today_expenses))
        .route("/range/list", get(list_expenses_in_range))
        .route("/stats/total", get(total_expenses))
        .route("/stats/by-category", get(totals_by_category))
        .route(
            "/:id",
            get(get_expense).patch(update_expense).delete(delete_expense),
        )
}

/// Record an expense
#[utoipa::path(
    post,
    path = "/api/v1/expenses",
    request_body = CreateExpenseRequest,
    responses(
        (status = 201, description = "Expense created", body = ExpenseResponse),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Expenses"
)]
pub async fn create_expense(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateExpenseRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let payload = payload.normalized();
    validate_input(&payload)?;

    let input = CreateExpenseInput {
        description: payload.description,
        category: payload.category,
        amount: payload.amount,
        date: payload.date,
        notes: payload.notes,
    };

    let expense = state
        .services
        .ledger
        .create_expense(input)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(ExpenseResponse::from(expense)))
}

/// List all expenses, newest first
#[utoipa::path(
    get,
    path = "/api/v1/expenses",
    responses((status = 200, description = "Expenses retrieved", body = Vec<ExpenseResponse>)),
    security(("Bearer" = [])),
    tag = "Expenses"
)]
pub async fn list_expenses(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let expenses = state
        .services
        .ledger
        .list_expenses()
        .await
        .map_err(map_service_error)?;

    let expenses: Vec<ExpenseResponse> = expenses.into_iter().map(ExpenseResponse::from).collect();
    Ok(success_response(expenses))
}

/// Get an expense by ID
#[utoipa::path(
    get,
    path = "/api/v1/expenses/:id",
    params(("id" = Uuid, Path, description = "Expense ID")),
    responses(
        (status = 200, description = "Expense retrieved", body = ExpenseResponse),
        (status = 404, description = "Expense not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Expenses"
)]
pub async fn get_expense(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let expense = state
        .services
        .ledger
        .get_expense(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(ExpenseResponse::from(expense)))
}

/// Partially update an expense
#[utoipa::path(
    patch,
    path = "/api/v1/expenses/:id",
    params(("id" = Uuid, Path, description = "Expense ID")),
    request_body = UpdateExpenseRequest,
    responses(
        (status = 200, description = "Expense updated", body = ExpenseResponse),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Expense not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Expenses"
)]
pub async fn update_expense(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateExpenseRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let payload = payload.normalized();
    validate_input(&payload)?;

    let input = UpdateExpenseInput {
        description: payload.description,
        category: payload.category,
        amount: payload.amount,
        date: payload.date,
        notes: payload.notes,
    };

    let expense = state
        .services
        .ledger
        .update_expense(id, input)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(ExpenseResponse::from(expense)))
}

/// Delete an expense
#[utoipa::path(
    delete,
    path = "/api/v1/expenses/:id",
    params(("id" = Uuid, Path, description = "Expense ID")),
    responses(
        (status = 204, description = "Expense deleted"),
        (status = 404, description = "Expense not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Expenses"
)]
pub async fn delete_expense(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .ledger
        .delete_expense(id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

/// List the expenses dated today (UTC day)
#[utoipa::path(
    get,
    path = "/api/v1/expenses/today/list",
    responses((status = 200, description = "Today's expenses", body = Vec<ExpenseResponse>)),
    security(("Bearer" = [])),
    tag = "Expenses"
)]
pub async fn list_today_expenses(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let expenses = state
        .services
        .ledger
        .list_today_expenses()
        .await
        .map_err(map_service_error)?;

    let expenses: Vec<ExpenseResponse> = expenses.into_iter().map(ExpenseResponse::from).collect();
    Ok(success_response(expenses))
}

/// List the expenses within an inclusive date range
#[utoipa::path(
    get,
    path = "/api/v1/expenses/range/list",
    params(DateRangeParams),
    responses(
        (status = 200, description = "Expenses in range", body = Vec<ExpenseResponse>),
        (status = 400, description = "Malformed date", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Expenses"
)]
pub async fn list_expenses_in_range(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (start, end) = params.bounds()?;

    let expenses = state
        .services
        .ledger
        .list_expenses_in_range(start, end)
        .await
        .map_err(map_service_error)?;

    let expenses: Vec<ExpenseResponse> = expenses.into_iter().map(ExpenseResponse::from).collect();
    Ok(success_response(expenses))
}

/// Total of all expenses
#[utoipa::path(
    get,
    path = "/api/v1/expenses/stats/total",
    responses((status = 200, description = "Total expenses", body = TotalResponse)),
    security(("Bearer" = [])),
    tag = "Expenses"
)]
pub async fn total_expenses(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let total = state
        .services
        .ledger
        .total_expenses()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(TotalResponse { total }))
}

/// Totals grouped by category
#[utoipa::path(
    get,
    path = "/api/v1/expenses/stats/by-category",
    responses((status = 200, description = "Totals per category", body = Vec<CategoryTotal>)),
    security(("Bearer" = [])),
    tag = "Expenses"
)]
pub async fn totals_by_category(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let totals = state
        .services
        .ledger
        .totals_by_category()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(totals))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateExpenseRequest {
    #[validate(length(min = 1))]
    #[schema(example = "Bolsas para domicilio")]
    pub description: String,
    pub category: ExpenseCategory,
    #[validate(custom = "validate_decimal_min_zero")]
    #[schema(example = "35000")]
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

impl CreateExpenseRequest {
    fn normalized(mut self) -> Self {
        self.description = normalize_string(self.description);
        self.notes = normalize_optional_string(self.notes);
        self
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateExpenseRequest {
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<ExpenseCategory>,
    #[serde(default)]
    #[validate(custom = "validate_decimal_min_zero")]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

impl UpdateExpenseRequest {
    fn normalized(mut self) -> Self {
        self.description = self.description.map(normalize_string);
        self.notes = normalize_optional_string(self.notes);
        self
    }
}

/// Date range, inclusive on both ends: `[startDate 00:00:00.000Z,
/// endDate 23:59:59.999Z]`.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DateRangeParams {
    /// Range start, `YYYY-MM-DD`
    pub start_date: String,
    /// Range end, `YYYY-MM-DD`
    pub end_date: String,
}

impl DateRangeParams {
    fn bounds(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), ApiError> {
        let start_day = parse_day(&self.start_date, "startDate")?;
        let end_day = parse_day(&self.end_date, "endDate")?;

        let start = start_day
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc())
            .ok_or_else(|| ApiError::ValidationError("Invalid startDate".to_string()))?;
        let end = end_day
            .and_hms_milli_opt(23, 59, 59, 999)
            .map(|naive| naive.and_utc())
            .ok_or_else(|| ApiError::ValidationError("Invalid endDate".to_string()))?;

        if start > end {
            return Err(ApiError::ValidationError(
                "startDate must not be after endDate".to_string(),
            ));
        }

        Ok((start, end))
    }
}

fn parse_day(value: &str, field: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::ValidationError(format!("{field} must be formatted as YYYY-MM-DD")))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TotalResponse {
    #[schema(example = "185000")]
    pub total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseResponse {
    pub id: Uuid,
    pub description: String,
    pub category: ExpenseCategory,
    #[schema(example = "35000")]
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<crate::entities::ExpenseModel> for ExpenseResponse {
    fn from(model: crate::entities::ExpenseModel) -> Self {
        Self {
            id: model.id,
            description: model.description,
            category: model.category,
            amount: model.amount,
            date: model.date,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
