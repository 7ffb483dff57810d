//! `/api/orders` - checkout, the user's own orders, and the admin order
//! surface (listing, status updates, dashboard).

use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use storefront::checkout::{CheckoutRequest, OrderWithBuyer, StatusUpdate};
use storefront::dashboard::DashboardStats;
use storefront::order::{Order, OrderStatus};
use storefront::store::{OrderQuery, Page};
use storefront::types::OrderId;

use crate::error::ApiError;
use crate::extract::{AdminUser, CurrentUser, Json};
use crate::state::AppState;

/// Routes under `/api/orders`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(place).get(list))
        .route("/myorders", get(my_orders))
        .route("/stats/dashboard", get(dashboard))
        .route("/{id}", get(fetch))
        .route("/{id}/cancel", put(cancel))
        .route("/{id}/status", put(update_status))
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    status: Option<OrderStatus>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    page: u64,
    #[serde(default)]
    limit: u64,
}

async fn place(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(state.orders.place_order(&user, request).await?))
}

async fn my_orders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(state.orders.my_orders(&user).await?))
}

async fn fetch(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(state.orders.get(&user, id).await?))
}

async fn cancel(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(state.orders.cancel(&user, id).await?))
}

async fn list(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<OrderWithBuyer>>, ApiError> {
    let query = OrderQuery {
        status: params.status,
        start_date: params.start_date,
        end_date: params.end_date,
        page: params.page,
        limit: params.limit,
    };
    Ok(Json(state.orders.list(&query).await?))
}

async fn update_status(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<OrderId>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(state.orders.update_status(id, update).await?))
}

async fn dashboard(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Json<DashboardStats>, ApiError> {
    Ok(Json(state.dashboard.stats().await?))
}
