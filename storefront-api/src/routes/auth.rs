//! `/api/auth` - registration, login, profile and address book.

use axum::extract::{Path, State};
use axum::routing::{post, put};
use axum::Router;
use storefront::accounts::{
    AuthResponse, LoginRequest, PasswordChange, ProfileUpdate, RegisterRequest,
};
use storefront::types::AddressId;
use storefront::user::{AddressDraft, User};

use crate::error::ApiError;
use crate::extract::{CurrentUser, Json};
use crate::state::AppState;

/// Routes under `/api/auth`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", put(update_profile).get(profile))
        .route("/password", put(change_password))
        .route("/addresses", post(add_address))
        .route(
            "/addresses/{id}",
            put(update_address).delete(remove_address),
        )
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    Ok(Json(state.accounts.register(request).await?))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    Ok(Json(state.accounts.login(request).await?))
}

async fn profile(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.accounts.update_profile(&user, update).await?))
}

async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(change): Json<PasswordChange>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.accounts.change_password(&user, change).await?;
    Ok(Json(serde_json::json!({ "message": "Password updated" })))
}

async fn add_address(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(draft): Json<AddressDraft>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.accounts.add_address(&user, draft).await?))
}

async fn update_address(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<AddressId>,
    Json(draft): Json<AddressDraft>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.accounts.update_address(&user, id, draft).await?))
}

async fn remove_address(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<AddressId>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.accounts.remove_address(&user, id).await?))
}
