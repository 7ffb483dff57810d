//! `/api/admin` - user management and the stats endpoint.

use axum::extract::{Path, Query, State};
use axum::routing::{get, put};
use axum::Router;
use serde::Deserialize;
use storefront::accounts::{AdminUserUpdate, UserDetail};
use storefront::dashboard::DashboardStats;
use storefront::store::{Page, UserQuery};
use storefront::types::UserId;
use storefront::user::{Role, User};

use crate::error::ApiError;
use crate::extract::{AdminUser, Json};
use crate::state::AppState;

/// Routes under `/api/admin`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/users/{id}/toggle-status", put(toggle_status))
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    search: Option<String>,
    role: Option<Role>,
    active: Option<bool>,
    #[serde(default)]
    page: u64,
    #[serde(default)]
    limit: u64,
}

async fn stats(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Json<DashboardStats>, ApiError> {
    Ok(Json(state.dashboard.stats().await?))
}

async fn list_users(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<User>>, ApiError> {
    let query = UserQuery {
        search: params.search,
        role: params.role,
        active: params.active,
        page: params.page,
        limit: params.limit,
    };
    Ok(Json(state.accounts.list_users(&query).await?))
}

async fn get_user(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<UserId>,
) -> Result<Json<UserDetail>, ApiError> {
    Ok(Json(state.accounts.get_user(id).await?))
}

async fn update_user(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<UserId>,
    Json(update): Json<AdminUserUpdate>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.accounts.update_user(id, update).await?))
}

async fn delete_user(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<UserId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.accounts.delete_user(id).await?;
    Ok(Json(serde_json::json!({ "message": "User deleted" })))
}

async fn toggle_status(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<UserId>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.accounts.toggle_status(id).await?))
}
