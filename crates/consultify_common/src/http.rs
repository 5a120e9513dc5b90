// --- File: crates/consultify_common/src/http.rs ---
use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{ConsultifyError, HttpStatusCode};

// Include the client module
pub mod client;

/// Extension trait for ConsultifyError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    /// Converts the error into an Axum HTTP response.
    fn into_http_response(self) -> Response;
}

impl IntoHttpResponse for ConsultifyError {
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "code": status_code.as_u16(),
            }
        }));

        (status_code, body).into_response()
    }
}

impl IntoResponse for ConsultifyError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
///
/// Returns `AuthError` when the header is absent, not valid UTF-8, uses
/// another scheme, or carries an empty token.
pub fn bearer_token(headers: &HeaderMap) -> Result<String, ConsultifyError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ConsultifyError::AuthError("Missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| ConsultifyError::AuthError("Malformed Authorization header".to_string()))?;

    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .ok_or_else(|| ConsultifyError::AuthError("Expected a Bearer token".to_string()))?;

    if token.is_empty() {
        return Err(ConsultifyError::AuthError("Empty Bearer token".to_string()));
    }
    Ok(token.to_string())
}
