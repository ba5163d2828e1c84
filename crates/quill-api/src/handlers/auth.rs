//! Authentication API handlers
//!
//! Sign-up, sign-in, refresh-token rotation and logout.
//!
//! Author: hephaex@gmail.com

use crate::auth::{extract_cookie, AuthError, Identity, IssuedTokens, REFRESH_COOKIE};
use crate::error::AppError;
use crate::extract::ValidatedJson;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use quill_core::AccountPublic;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

/// Sign-up request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignUpRequest {
    #[validate(email(message = "email must be a valid address"))]
    #[schema(example = "writer@example.com")]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

/// Sign-in request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignInRequest {
    #[validate(email(message = "email must be a valid address"))]
    #[schema(example = "writer@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

/// Refresh request; the token may come from the cookie instead
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Logout request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LogoutRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
}

/// Token pair response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<IssuedTokens> for TokenResponse {
    fn from(tokens: IssuedTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }
    }
}

/// Logout response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogoutResponse {
    pub message: String,
}

/// Register a new account
///
/// # Responses
///
/// * `201 Created` - Account registered
/// * `400 Bad Request` - Invalid input or email already registered
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "auth",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account registered", body = AccountPublic),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<SignUpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let account = state
        .sessions
        .sign_up(&request.email, &request.password)
        .await?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// Sign in with email and password
///
/// Returns an access/refresh token pair and sets the refresh cookie.
///
/// # Responses
///
/// * `200 OK` - Tokens issued
/// * `400 Bad Request` - Malformed input
/// * `401 Unauthorized` - Invalid credentials
#[utoipa::path(
    post,
    path = "/auth/signin",
    tag = "auth",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenResponse),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 401, description = "Invalid credentials", body = crate::error::ApiError),
    )
)]
pub async fn signin_handler(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<SignInRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tokens = state
        .sessions
        .sign_in(&request.email, &request.password)
        .await?;
    let cookie = state.refresh_cookie.set(&tokens.refresh_token);

    Ok(([(header::SET_COOKIE, cookie)], Json(TokenResponse::from(tokens))))
}

/// Rotate the refresh token
///
/// The token is read from the body, falling back to the refresh cookie.
/// The presented token stops working once a new pair is issued.
///
/// # Responses
///
/// * `200 OK` - New tokens issued
/// * `401 Unauthorized` - Missing, invalid, rotated or revoked refresh token
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "auth",
    request_body(content = RefreshRequest, description = "Refresh token (optional when the cookie is sent)"),
    responses(
        (status = 200, description = "Tokens rotated", body = TokenResponse),
        (status = 401, description = "Invalid refresh token", body = crate::error::ApiError),
    )
)]
pub async fn refresh_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let presented = body
        .and_then(|Json(request)| request.refresh_token)
        .filter(|token| !token.trim().is_empty())
        .or_else(|| extract_cookie(&headers, REFRESH_COOKIE))
        .ok_or(AuthError::MissingToken)?;

    let tokens = state.sessions.refresh(presented.trim()).await?;
    let cookie = state.refresh_cookie.set(&tokens.refresh_token);

    Ok(([(header::SET_COOKIE, cookie)], Json(TokenResponse::from(tokens))))
}

/// Log out the current account
///
/// Clears the stored refresh token and expires the cookie. The email must
/// match the authenticated account.
///
/// # Responses
///
/// * `200 OK` - Logged out
/// * `401 Unauthorized` - Missing or invalid access token
/// * `403 Forbidden` - Email belongs to a different account
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Logged out", body = LogoutResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
        (status = 403, description = "Different account", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ValidatedJson(request): ValidatedJson<LogoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.sessions.logout(&identity, &request.email).await?;

    Ok((
        [(header::SET_COOKIE, state.refresh_cookie.clear())],
        Json(LogoutResponse {
            message: "Logged out successfully".to_string(),
        }),
    ))
}
