//! `/api/cart` - the authenticated user's cart.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use storefront::cart::CartView;
use storefront::errors::ServiceError;
use storefront::types::{ProductId, Quantity};

use crate::error::ApiError;
use crate::extract::{CurrentUser, Json};
use crate::state::AppState;

/// Routes under `/api/cart`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(view).post(add_item).delete(clear))
        .route("/{product_id}", axum::routing::put(update_item).delete(remove_item))
}

// Quantities arrive as raw integers so out-of-range values surface as a 400
// with the domain message rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
struct AddItem {
    product_id: ProductId,
    quantity: u32,
}

#[derive(Debug, Deserialize)]
struct SetQuantity {
    quantity: u32,
}

async fn view(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<CartView>, ApiError> {
    Ok(Json(state.carts.view(user.id).await?))
}

async fn add_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<AddItem>,
) -> Result<Json<CartView>, ApiError> {
    let quantity = Quantity::new(body.quantity).map_err(ServiceError::from)?;
    Ok(Json(
        state
            .carts
            .add_item(user.id, body.product_id, quantity)
            .await?,
    ))
}

async fn update_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<ProductId>,
    Json(body): Json<SetQuantity>,
) -> Result<Json<CartView>, ApiError> {
    let quantity = Quantity::new(body.quantity).map_err(ServiceError::from)?;
    Ok(Json(
        state
            .carts
            .update_item(user.id, product_id, quantity)
            .await?,
    ))
}

async fn remove_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<CartView>, ApiError> {
    Ok(Json(state.carts.remove_item(user.id, product_id).await?))
}

async fn clear(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<CartView>, ApiError> {
    Ok(Json(state.carts.clear(user.id).await?))
}
