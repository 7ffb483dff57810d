//! Catalog operations: public browsing plus admin product management.
//!
//! The public surface only ever sees active products. Admin writes always
//! recompute the derived fields before persisting, so `final_price` and the
//! review aggregates stay consistent with their inputs.

use crate::errors::{ServiceError, ServiceResult};
use crate::media::{MediaHost, MAX_IMAGE_BYTES};
use crate::product::{Category, Product, ProductDraft, ProductImage, Review};
use crate::store::{Page, ProductQuery, Store};
use crate::types::{Brand, ImageId, ProductId, Rating, ReviewComment, ReviewId};
use crate::user::User;
use serde::Deserialize;
use std::sync::Arc;

/// How many products the featured shelf shows.
pub const FEATURED_LIMIT: usize = 8;

/// Input for submitting a product review.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewDraft {
    /// Star rating, 1-5.
    pub rating: Rating,
    /// Free-text comment.
    pub comment: ReviewComment,
}

/// Catalog browsing and product management.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn Store>,
    media: Arc<dyn MediaHost>,
}

impl CatalogService {
    /// Create the service over a document store and a media host.
    pub fn new(store: Arc<dyn Store>, media: Arc<dyn MediaHost>) -> Self {
        Self { store, media }
    }

    /// Filtered, paginated listing over active products.
    pub async fn list(&self, query: &ProductQuery) -> ServiceResult<Page<Product>> {
        Ok(self.store.list_products(query).await?)
    }

    /// Fetch one product. Inactive products are hidden from non-admins.
    pub async fn get(&self, id: ProductId, actor: Option<&User>) -> ServiceResult<Product> {
        let product = self
            .store
            .product(id)
            .await?
            .ok_or(ServiceError::NotFound("Product"))?;
        if !product.is_active && !actor.is_some_and(User::is_admin) {
            return Err(ServiceError::NotFound("Product"));
        }
        Ok(product)
    }

    /// The featured shelf: featured active products, best rated first.
    pub async fn featured(&self) -> ServiceResult<Vec<Product>> {
        Ok(self.store.featured_products(FEATURED_LIMIT).await?)
    }

    /// Distinct categories among active products.
    pub async fn categories(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.store.categories().await?)
    }

    /// Distinct brands among active products.
    pub async fn brands(&self) -> ServiceResult<Vec<Brand>> {
        Ok(self.store.brands().await?)
    }

    /// Admin: create a product. Images are attached separately.
    pub async fn create(&self, draft: ProductDraft) -> ServiceResult<Product> {
        let product = Product::create(draft);
        self.store.insert_product(product.clone()).await?;
        tracing::info!(product = %product.id, name = %product.name, "product created");
        Ok(product)
    }

    /// Admin: overwrite a product's editable fields.
    pub async fn update(&self, id: ProductId, draft: ProductDraft) -> ServiceResult<Product> {
        let mut product = self
            .store
            .product(id)
            .await?
            .ok_or(ServiceError::NotFound("Product"))?;
        product.apply_draft(draft);
        self.store.update_product(product.clone()).await?;
        Ok(product)
    }

    /// Admin: delete a product and release its hosted images. Image deletion
    /// is best-effort; a media-host failure never blocks the delete.
    pub async fn delete(&self, id: ProductId) -> ServiceResult<()> {
        let product = self
            .store
            .product(id)
            .await?
            .ok_or(ServiceError::NotFound("Product"))?;
        self.store.delete_product(id).await?;
        for image in &product.images {
            if let Err(err) = self.media.delete(&image.reference).await {
                tracing::warn!(product = %id, reference = %image.reference, error = %err,
                    "failed to delete hosted image");
            }
        }
        tracing::info!(product = %id, "product deleted");
        Ok(())
    }

    /// Admin: upload images and attach them to a product. At most
    /// [`Product::MAX_IMAGES`] images total; each upload is capped at
    /// [`MAX_IMAGE_BYTES`].
    pub async fn upload_images(
        &self,
        id: ProductId,
        uploads: Vec<Vec<u8>>,
    ) -> ServiceResult<Product> {
        let mut product = self
            .store
            .product(id)
            .await?
            .ok_or(ServiceError::NotFound("Product"))?;

        if uploads.is_empty() {
            return Err(ServiceError::validation("No images supplied"));
        }
        if product.images.len() + uploads.len() > Product::MAX_IMAGES {
            return Err(ServiceError::validation(format!(
                "A product can have at most {} images",
                Product::MAX_IMAGES
            )));
        }
        for bytes in &uploads {
            if bytes.len() > MAX_IMAGE_BYTES {
                return Err(ServiceError::validation("Image exceeds the 5 MB limit"));
            }
        }

        for bytes in uploads {
            let hosted = self
                .media
                .upload(bytes)
                .await
                .map_err(|err| ServiceError::business(err.to_string()))?;
            product.images.push(ProductImage {
                id: ImageId::new(),
                reference: hosted.reference,
                url: hosted.url,
            });
        }
        product.recompute_derived();
        self.store.update_product(product.clone()).await?;
        Ok(product)
    }

    /// Admin: detach one image and delete it at the host (best-effort).
    pub async fn delete_image(&self, id: ProductId, image: ImageId) -> ServiceResult<Product> {
        let mut product = self
            .store
            .product(id)
            .await?
            .ok_or(ServiceError::NotFound("Product"))?;
        let position = product
            .images
            .iter()
            .position(|i| i.id == image)
            .ok_or(ServiceError::NotFound("Image"))?;
        let removed = product.images.remove(position);
        product.recompute_derived();
        self.store.update_product(product.clone()).await?;

        if let Err(err) = self.media.delete(&removed.reference).await {
            tracing::warn!(product = %id, reference = %removed.reference, error = %err,
                "failed to delete hosted image");
        }
        Ok(product)
    }

    /// Submit a review. One review per user per product.
    pub async fn add_review(
        &self,
        actor: &User,
        id: ProductId,
        draft: ReviewDraft,
    ) -> ServiceResult<Review> {
        let mut product = self
            .store
            .product(id)
            .await?
            .filter(|p| p.is_active)
            .ok_or(ServiceError::NotFound("Product"))?;
        let review_id = product.add_review(
            actor.id,
            actor.name.to_string(),
            draft.rating,
            draft.comment,
        )?;
        self.store.update_product(product.clone()).await?;
        let review = product
            .reviews
            .into_iter()
            .find(|r| r.id == review_id)
            .ok_or(ServiceError::NotFound("Review"))?;
        Ok(review)
    }

    /// Delete a review. Allowed for its author and for admins.
    pub async fn delete_review(
        &self,
        actor: &User,
        id: ProductId,
        review: ReviewId,
    ) -> ServiceResult<Product> {
        let mut product = self
            .store
            .product(id)
            .await?
            .ok_or(ServiceError::NotFound("Product"))?;
        let existing = product
            .reviews
            .iter()
            .find(|r| r.id == review)
            .ok_or(ServiceError::NotFound("Review"))?;
        if existing.user != actor.id && !actor.is_admin() {
            return Err(ServiceError::Forbidden);
        }
        product.remove_review(review);
        self.store.update_product(product.clone()).await?;
        Ok(product)
    }
}
