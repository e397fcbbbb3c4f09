use crate::auth::{AuthenticatedUser, TokenResponse};
use crate::handlers::common::{normalize_string, success_response, validate_input, AppJson};
use crate::{errors::ApiError, AppState};
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for authentication endpoints. Sign-in is the only
/// route in the API that does not require a bearer token.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signin", post(sign_in))
        .route("/profile", get(profile))
}

/// Exchange email and password for an access token
#[utoipa::path(
    post,
    path = "/api/v1/auth/signin",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenResponse),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn sign_in(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignInRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = payload.normalized();
    validate_input(&payload)?;

    let tokens = state
        .services
        .auth
        .sign_in(&payload.email, &payload.password)
        .await?;

    Ok(success_response(tokens))
}

/// Current caller identity
#[utoipa::path(
    get,
    path = "/api/v1/auth/profile",
    responses(
        (status = 200, description = "Current identity", body = UserResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Auth"
)]
pub async fn profile(
    user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let account = state.services.auth.get_user(user.user_id).await?;

    Ok(success_response(UserResponse {
        id: account.id,
        username: account.username,
        email: account.email,
        created_at: account.created_at,
    }))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SignInRequest {
    #[validate(email)]
    #[schema(example = "admin@brasas.local")]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

impl SignInRequest {
    fn normalized(mut self) -> Self {
        self.email = normalize_string(self.email);
        self
    }
}

/// Identity of an authenticated caller; never carries the password hash.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "Admin")]
    pub username: String,
    #[schema(example = "admin@brasas.local")]
    pub email: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
