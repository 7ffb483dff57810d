//! Error-to-HTTP mapping.
//!
//! Every failure becomes a `{ "message": ... }` JSON body. Validation and
//! business-rule violations are 400, authentication failures 401,
//! authorization failures 403, missing entities 404, storage failures 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use storefront::auth::AuthError;
use storefront::errors::ServiceError;

/// A failure on its way out of the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Business-layer failure.
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// Token failure.
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// Malformed request body or parameters.
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Service(err) => match err {
                ServiceError::Validation(_) | ServiceError::BusinessRule(_) => {
                    StatusCode::BAD_REQUEST
                }
                ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                ServiceError::Forbidden => StatusCode::FORBIDDEN,
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Backend details stay in the logs.
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront::errors::StoreError;

    #[test]
    fn status_codes_follow_the_error_taxonomy() {
        let cases = [
            (
                ApiError::Service(ServiceError::validation("bad")),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Service(ServiceError::business("no")),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Service(ServiceError::Unauthorized("nope".to_string())),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ApiError::Service(ServiceError::Forbidden),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::Service(ServiceError::NotFound("Product")),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::Service(ServiceError::Store(StoreError::Backend("db".to_string()))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ApiError::Auth(AuthError::MissingToken), StatusCode::UNAUTHORIZED),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status(), expected);
        }
    }
}
