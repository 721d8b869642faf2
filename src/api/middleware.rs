//! API middleware
//!
//! The session-gating middleware, the `AuthenticatedUser` extractor it
//! feeds, and the `ApiError` envelope every handler returns.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::User;
use crate::services::{
    ApplicationService, AuthService, CampaignService, NotificationService, VideoService,
};

/// Shared service handles cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub campaign_service: Arc<CampaignService>,
    pub application_service: Arc<ApplicationService>,
    pub video_service: Arc<VideoService>,
    pub notification_service: Arc<NotificationService>,
}

/// The user resolved from the request's session token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// JSON error envelope: `{"error": {"code", "message", "details?"}}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// HTTP status carried by each error code
fn status_for(code: &str) -> StatusCode {
    match code {
        "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
        "FORBIDDEN" => StatusCode::FORBIDDEN,
        "NOT_FOUND" => StatusCode::NOT_FOUND,
        "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
        "CONFLICT" => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.error.code);
        (status, Json(self)).into_response()
    }
}

/// Pull the session token out of a request's headers.
///
/// An `Authorization: Bearer` header wins over the `session` cookie, so
/// API clients can override whatever cookie a browser sends along. The
/// logout handler uses the same lookup to find the session to delete.
pub(crate) fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .map(str::trim)
                .find_map(|cookie| cookie.strip_prefix("session="))
                .map(str::to_string)
        })
}

/// Session gate for the protected route tree.
///
/// Resolves the token to a user and stashes it in request extensions for
/// the `AuthenticatedUser` extractor.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = session_token(request.headers())
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let user = match state.auth_service.validate_session(&token).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(ApiError::unauthorized("Invalid or expired session")),
        Err(e) => {
            tracing::error!("Session validation failed: {:#}", e);
            return Err(ApiError::internal_error("An internal error occurred"));
        }
    };

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

// Extractor reading the user require_auth stored in extensions
impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(entries: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in entries {
            headers.insert(name.clone(), value.parse().unwrap());
        }
        headers
    }

    #[test]
    fn test_token_from_bearer_header() {
        let headers = headers_with(&[(header::AUTHORIZATION, "Bearer tok-123")]);
        assert_eq!(session_token(&headers), Some("tok-123".to_string()));
    }

    #[test]
    fn test_token_from_session_cookie() {
        let headers = headers_with(&[(header::COOKIE, "session=tok-456")]);
        assert_eq!(session_token(&headers), Some("tok-456".to_string()));
    }

    #[test]
    fn test_bearer_wins_over_cookie() {
        let headers = headers_with(&[
            (header::AUTHORIZATION, "Bearer from-header"),
            (header::COOKIE, "session=from-cookie"),
        ]);
        assert_eq!(session_token(&headers), Some("from-header".to_string()));
    }

    #[test]
    fn test_no_credentials_yields_none() {
        assert!(session_token(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_non_bearer_authorization_ignored() {
        let headers = headers_with(&[(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")]);
        assert!(session_token(&headers).is_none());
    }

    #[test]
    fn test_session_cookie_found_among_others() {
        let headers = headers_with(&[(header::COOKIE, "theme=dark; session=tok-789; lang=en")]);
        assert_eq!(session_token(&headers), Some("tok-789".to_string()));
    }

    #[test]
    fn test_error_codes_and_statuses() {
        assert_eq!(ApiError::unauthorized("x").error.code, "UNAUTHORIZED");
        assert_eq!(ApiError::forbidden("x").error.code, "FORBIDDEN");
        assert_eq!(ApiError::not_found("x").error.code, "NOT_FOUND");
        assert_eq!(
            ApiError::validation_error("x").error.code,
            "VALIDATION_ERROR"
        );
        assert_eq!(ApiError::conflict("x").error.code, "CONFLICT");
        assert_eq!(ApiError::internal_error("x").error.code, "INTERNAL_ERROR");

        assert_eq!(status_for("UNAUTHORIZED"), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for("VALIDATION_ERROR"), StatusCode::BAD_REQUEST);
        assert_eq!(status_for("CONFLICT"), StatusCode::CONFLICT);
        assert_eq!(status_for("ANYTHING_ELSE"), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_details_serialized_only_when_present() {
        let json = serde_json::to_value(ApiError::not_found("missing")).unwrap();
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert!(json["error"].get("details").is_none());

        let json = serde_json::to_value(ApiError::with_details(
            "VALIDATION_ERROR",
            "bad field",
            serde_json::json!({"field": "email"}),
        ))
        .unwrap();
        assert_eq!(json["error"]["details"]["field"], "email");
    }
}
