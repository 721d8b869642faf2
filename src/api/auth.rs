//! Authentication API endpoints
//!
//! Registration, login, logout, and the current-user lookup. Register and
//! login are public; logout and `/me` sit behind the session gate.
//! Successful register and login responses carry the session token twice,
//! in the JSON body for API clients and as an HttpOnly cookie for browsers.

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{self, ApiError, AppState, AuthenticatedUser};
use crate::api::responses::UserResponse;
use crate::models::{CreateUserInput, UserRole};
use crate::services::{AuthServiceError, LoginInput};

/// Session cookie lifetime, kept in step with the server-side expiry
const SESSION_COOKIE_MAX_AGE: u64 = 7 * 24 * 60 * 60;

/// Request body for user registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub role: UserRole,
}

/// Request body for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for successful authentication
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

/// Build public auth routes (no auth required)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Build protected auth routes (require authentication)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(get_current_user))
}

fn session_cookie(token: &str) -> String {
    format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        token, SESSION_COOKIE_MAX_AGE
    )
}

/// Set-Cookie headers for a freshly issued session
fn session_headers(token: &str) -> Result<HeaderMap, ApiError> {
    let value = HeaderValue::from_str(&session_cookie(token)).map_err(|e| {
        tracing::error!("Session cookie is not a valid header value: {}", e);
        ApiError::internal_error("An internal error occurred")
    })?;
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, value);
    Ok(headers)
}

/// POST /api/v1/auth/register - Create an account and log it in
async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let password = body.password.clone();
    let input = CreateUserInput {
        email: body.email,
        full_name: body.full_name,
        password: body.password,
        role: body.role,
    };

    let user = state
        .auth_service
        .register(input)
        .await
        .map_err(map_auth_error)?;

    // New accounts get a session immediately
    let (user, session) = state
        .auth_service
        .login(LoginInput::new(&user.email, &password))
        .await
        .map_err(map_auth_error)?;

    let headers = session_headers(&session.id)?;
    let response = AuthResponse {
        user: user.into(),
        token: session.id,
    };

    Ok((StatusCode::CREATED, headers, Json(response)))
}

/// POST /api/v1/auth/login - Exchange credentials for a session
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, session) = state
        .auth_service
        .login(LoginInput::new(body.email, body.password))
        .await
        .map_err(map_auth_error)?;

    let headers = session_headers(&session.id)?;
    let response = AuthResponse {
        user: user.into(),
        token: session.id,
    };

    Ok((headers, Json(response)))
}

/// POST /api/v1/auth/logout - Delete the caller's session
///
/// Deletes whichever token authenticated the request and tells the
/// browser to drop its cookie.
async fn logout(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = middleware::session_token(&headers)
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    state
        .auth_service
        .logout(&token)
        .await
        .map_err(map_auth_error)?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_static("session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"),
    );

    Ok((StatusCode::NO_CONTENT, response_headers))
}

/// GET /api/v1/auth/me - The account behind the presented token
async fn get_current_user(user: AuthenticatedUser) -> Json<UserResponse> {
    Json(user.0.into())
}

fn map_auth_error(e: AuthServiceError) -> ApiError {
    match e {
        AuthServiceError::AuthenticationError(msg) => ApiError::unauthorized(msg),
        AuthServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        AuthServiceError::UserExists(msg) => ApiError::conflict(msg),
        AuthServiceError::InternalError(err) => {
            tracing::error!("Auth operation failed: {:#}", err);
            ApiError::internal_error("An internal error occurred")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_shape() {
        let cookie = session_cookie("tok-123");
        assert!(cookie.starts_with("session=tok-123; "));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.ends_with(&format!("Max-Age={}", SESSION_COOKIE_MAX_AGE)));
    }

    #[test]
    fn test_register_request_parses_role() {
        let body: RegisterRequest = serde_json::from_str(
            r#"{"email":"a@b.c","full_name":"A","password":"longenough","role":"sp_team"}"#,
        )
        .unwrap();
        assert_eq!(body.role, UserRole::SpTeam);
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let mapped = map_auth_error(AuthServiceError::InternalError(anyhow::anyhow!(
            "connection refused"
        )));
        assert_eq!(mapped.error.code, "INTERNAL_ERROR");
        assert_eq!(mapped.error.message, "An internal error occurred");
    }

    #[test]
    fn test_duplicate_account_maps_to_conflict() {
        let mapped = map_auth_error(AuthServiceError::UserExists("a@b.c".into()));
        assert_eq!(mapped.error.code, "CONFLICT");
    }
}
