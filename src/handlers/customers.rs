use crate::auth::AuthenticatedUser;
use crate::handlers::common::{
    created_response, map_service_error, no_content_response, normalize_optional_string,
    normalize_string, success_response, validate_input, AppJson,
};
use crate::{
    errors::ApiError,
    services::directory::{CreateCustomerInput, UpdateCustomerInput},
    AppState,
};
use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Colombian mobile numbers: ten digits starting with 3, optional +57 prefix.
static CO_PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\+57)?\s?3\d{9}$").expect("valid phone regex")
});

/// Creates the router for customer endpoints
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route(
            "/:id",
            get(get_customer)
                .patch(update_customer)
                .delete(delete_customer),
        )
}

/// Create a new customer
#[utoipa::path(
    post,
    path = "/api/v1/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = CustomerResponse),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Customers"
)]
pub async fn create_customer(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCustomerRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let payload = payload.normalized();
    validate_input(&payload)?;

    let input = CreateCustomerInput {
        name: payload.name,
        phone: payload.phone,
        address: payload.address,
        email: payload.email,
        notes: payload.notes,
    };

    let customer = state
        .services
        .directory
        .create_customer(input)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(CustomerResponse::from(customer)))
}

/// List all customers
#[utoipa::path(
    get,
    path = "/api/v1/customers",
    responses(
        (status = 200, description = "Customers retrieved", body = Vec<CustomerResponse>)
    ),
    security(("Bearer" = [])),
    tag = "Customers"
)]
pub async fn list_customers(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let customers = state
        .services
        .directory
        .list_customers()
        .await
        .map_err(map_service_error)?;

    let customers: Vec<CustomerResponse> =
        customers.into_iter().map(CustomerResponse::from).collect();
    Ok(success_response(customers))
}

/// Get a customer by ID
#[utoipa::path(
    get,
    path = "/api/v1/customers/:id",
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer retrieved", body = CustomerResponse),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Customers"
)]
pub async fn get_customer(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let customer = state
        .services
        .directory
        .get_customer(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(CustomerResponse::from(customer)))
}

/// Partially update a customer
#[utoipa::path(
    patch,
    path = "/api/v1/customers/:id",
    params(("id" = Uuid, Path, description = "Customer ID")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = CustomerResponse),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Customers"
)]
pub async fn update_customer(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateCustomerRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let payload = payload.normalized();
    validate_input(&payload)?;

    let input = UpdateCustomerInput {
        name: payload.name,
        phone: payload.phone,
        address: payload.address,
        email: payload.email,
        notes: payload.notes,
    };

    let customer = state
        .services
        .directory
        .update_customer(id, input)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(CustomerResponse::from(customer)))
}

/// Delete a customer
#[utoipa::path(
    delete,
    path = "/api/v1/customers/:id",
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Customers"
)]
pub async fn delete_customer(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .directory
        .delete_customer(id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 2, max = 100))]
    #[schema(example = "Ana Ruiz")]
    pub name: String,
    #[serde(default)]
    #[validate(regex(path = "CO_PHONE_REGEX", message = "not a valid phone number"))]
    #[schema(example = "3001234567")]
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

impl CreateCustomerRequest {
    fn normalized(mut self) -> Self {
        self.name = normalize_string(self.name);
        self.phone = normalize_optional_string(self.phone);
        self.address = normalize_optional_string(self.address);
        self.email = normalize_optional_string(self.email);
        self.notes = normalize_optional_string(self.notes);
        self
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(regex(path = "CO_PHONE_REGEX", message = "not a valid phone number"))]
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

impl UpdateCustomerRequest {
    fn normalized(mut self) -> Self {
        self.name = self.name.map(normalize_string);
        self.phone = normalize_optional_string(self.phone);
        self.address = normalize_optional_string(self.address);
        self.email = normalize_optional_string(self.email);
        self.notes = normalize_optional_string(self.notes);
        self
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub id: Uuid,
    #[schema(example = "Ana Ruiz")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<crate::entities::CustomerModel> for CustomerResponse {
    fn from(model: crate::entities::CustomerModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            phone: model.phone,
            address: model.address,
            email: model.email,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_regex_accepts_mobiles_with_and_without_prefix() {
        assert!(CO_PHONE_REGEX.is_match("3001234567"));
        assert!(CO_PHONE_REGEX.is_match("+573001234567"));
        assert!(CO_PHONE_REGEX.is_match("+57 3001234567"));
        assert!(!CO_PHONE_REGEX.is_match("12345"));
        assert!(!CO_PHONE_REGEX.is_match("4001234567"));
    }
}
