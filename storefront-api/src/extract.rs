//! Request extractors for authenticated and admin callers.
//!
//! The bearer token carries the account id; the account itself is loaded
//! fresh on every request, so role changes and blocks take effect
//! immediately rather than at next login.

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use storefront::auth::AuthError;
use storefront::errors::ServiceError;
use storefront::types::UserId;
use storefront::user::User;

use crate::error::ApiError;
use crate::state::AppState;

/// JSON body extractor that reports malformed bodies as a 400 with the
/// API's `{"message"}` error shape instead of axum's plain-text 422.
#[derive(Debug, Clone)]
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// The authenticated account behind the request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// The authenticated account, verified to be an admin.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

async fn authenticate(parts: &Parts, state: &AppState) -> Result<User, ApiError> {
    let token = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingToken)?;
    let claims = state.tokens.verify(token)?;

    let user = state
        .store
        .user(UserId::from(claims.sub))
        .await
        .map_err(ServiceError::from)?
        .ok_or(AuthError::InvalidToken)?;
    if !user.is_active {
        return Err(ApiError::Service(ServiceError::Unauthorized(
            "Account is blocked. Contact support".to_string(),
        )));
    }
    Ok(user)
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).await.map(Self)
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state).await?;
        if !user.is_admin() {
            return Err(ApiError::Service(ServiceError::Forbidden));
        }
        Ok(Self(user))
    }
}
