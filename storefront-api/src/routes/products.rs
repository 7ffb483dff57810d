//! `/api/products` - public catalog browsing, reviews, and admin product
//! management.

use axum::extract::{Multipart, Path, Query, State};
use axum::routing::{delete, get, post};
use axum::Router;
use serde::Deserialize;
use storefront::catalog::ReviewDraft;
use storefront::product::{Category, Product, ProductDraft, Review};
use storefront::store::{Page, ProductQuery, ProductSort};
use storefront::types::{Brand, ImageId, Money, ProductId, ReviewId};

use crate::error::ApiError;
use crate::extract::{AdminUser, CurrentUser, Json};
use crate::state::AppState;

/// Routes under `/api/products`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/featured", get(featured))
        .route("/categories/all", get(categories))
        .route("/brands/all", get(brands))
        .route("/{id}", get(fetch).put(update).delete(remove))
        .route("/{id}/images", post(upload_images))
        .route("/{id}/images/{image_id}", delete(delete_image))
        .route("/{id}/reviews", post(add_review))
        .route("/{id}/reviews/{review_id}", delete(delete_review))
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    keyword: Option<String>,
    category: Option<Category>,
    brand: Option<String>,
    min_price: Option<Money>,
    max_price: Option<Money>,
    min_rating: Option<f64>,
    #[serde(default)]
    sort: ProductSort,
    #[serde(default)]
    page: u64,
    #[serde(default)]
    limit: u64,
}

impl From<ListParams> for ProductQuery {
    fn from(params: ListParams) -> Self {
        Self {
            keyword: params.keyword,
            category: params.category,
            brand: params.brand,
            min_price: params.min_price,
            max_price: params.max_price,
            min_rating: params.min_rating,
            sort: params.sort,
            page: params.page,
            limit: params.limit,
        }
    }
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Product>>, ApiError> {
    Ok(Json(state.catalog.list(&params.into()).await?))
}

async fn featured(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.catalog.featured().await?))
}

async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.catalog.categories().await?))
}

async fn brands(State(state): State<AppState>) -> Result<Json<Vec<Brand>>, ApiError> {
    Ok(Json(state.catalog.brands().await?))
}

async fn fetch(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.catalog.get(id, None).await?))
}

async fn create(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Json(draft): Json<ProductDraft>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.catalog.create(draft).await?))
}

async fn update(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<ProductId>,
    Json(draft): Json<ProductDraft>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.catalog.update(id, draft).await?))
}

async fn remove(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<ProductId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.catalog.delete(id).await?;
    Ok(Json(serde_json::json!({ "message": "Product deleted" })))
}

async fn upload_images(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<ProductId>,
    mut multipart: Multipart,
) -> Result<Json<Product>, ApiError> {
    let mut uploads = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::BadRequest(err.to_string()))?
    {
        let bytes = field
            .bytes()
            .await
            .map_err(|err| ApiError::BadRequest(err.to_string()))?;
        uploads.push(bytes.to_vec());
    }
    Ok(Json(state.catalog.upload_images(id, uploads).await?))
}

async fn delete_image(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path((id, image_id)): Path<(ProductId, ImageId)>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.catalog.delete_image(id, image_id).await?))
}

async fn add_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<ProductId>,
    Json(draft): Json<ReviewDraft>,
) -> Result<Json<Review>, ApiError> {
    Ok(Json(state.catalog.add_review(&user, id, draft).await?))
}

async fn delete_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((id, review_id)): Path<(ProductId, ReviewId)>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.catalog.delete_review(&user, id, review_id).await?))
}
