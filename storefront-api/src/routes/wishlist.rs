//! `/api/wishlist` - the authenticated user's wishlist.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;
use storefront::types::ProductId;
use storefront::wishlist::WishlistEntry;

use crate::error::ApiError;
use crate::extract::{CurrentUser, Json};
use crate::state::AppState;

/// Routes under `/api/wishlist`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(view).delete(clear))
        .route("/{product_id}", axum::routing::post(add).delete(remove))
}

async fn view(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<WishlistEntry>>, ApiError> {
    Ok(Json(state.wishlists.view(user.id).await?))
}

async fn add(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Vec<WishlistEntry>>, ApiError> {
    Ok(Json(state.wishlists.add(user.id, product_id).await?))
}

async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Vec<WishlistEntry>>, ApiError> {
    Ok(Json(state.wishlists.remove(user.id, product_id).await?))
}

async fn clear(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.wishlists.clear(user.id).await?;
    Ok(Json(serde_json::json!({ "message": "Wishlist cleared" })))
}
