//! Wishlists: one per user, a duplicate-free set of product references.

use crate::errors::{ServiceError, ServiceResult};
use crate::store::Store;
use crate::types::{Money, ProductId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A wishlist document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wishlist {
    /// Owning user. One wishlist per user.
    pub user: UserId,
    /// Referenced products, insertion-ordered, no duplicates.
    pub products: Vec<ProductId>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Wishlist {
    /// A fresh empty wishlist for `user`.
    pub fn empty(user: UserId) -> Self {
        Self {
            user,
            products: Vec::new(),
            updated_at: Utc::now(),
        }
    }
}

/// Summary of a wishlisted product, joined at read time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WishlistEntry {
    /// Referenced product.
    pub product: ProductId,
    /// Current name.
    pub name: String,
    /// Current list price.
    pub price: Money,
    /// Current final price.
    pub final_price: Money,
    /// Current first image URL.
    pub image: String,
    /// Current aggregate rating.
    pub rating: f64,
    /// Current stock level.
    pub stock: u32,
}

/// Wishlist operations.
#[derive(Clone)]
pub struct WishlistService {
    store: Arc<dyn Store>,
}

impl WishlistService {
    /// Create the service over a document store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// The user's wishlist joined against the current catalog. Created lazily.
    pub async fn view(&self, user: UserId) -> ServiceResult<Vec<WishlistEntry>> {
        let wishlist = match self.store.wishlist(user).await? {
            Some(wishlist) => wishlist,
            None => {
                let wishlist = Wishlist::empty(user);
                self.store.upsert_wishlist(wishlist.clone()).await?;
                wishlist
            }
        };
        self.resolve(&wishlist).await
    }

    /// Add a product. Unknown products are a 404; duplicates are rejected.
    pub async fn add(&self, user: UserId, product_id: ProductId) -> ServiceResult<Vec<WishlistEntry>> {
        if self.store.product(product_id).await?.is_none() {
            return Err(ServiceError::NotFound("Product"));
        }
        let mut wishlist = self
            .store
            .wishlist(user)
            .await?
            .unwrap_or_else(|| Wishlist::empty(user));
        if wishlist.products.contains(&product_id) {
            return Err(ServiceError::business("Product already in wishlist"));
        }
        wishlist.products.push(product_id);
        wishlist.updated_at = Utc::now();
        self.store.upsert_wishlist(wishlist.clone()).await?;
        self.resolve(&wishlist).await
    }

    /// Remove a product reference.
    pub async fn remove(
        &self,
        user: UserId,
        product_id: ProductId,
    ) -> ServiceResult<Vec<WishlistEntry>> {
        let mut wishlist = self
            .store
            .wishlist(user)
            .await?
            .ok_or(ServiceError::NotFound("Wishlist"))?;
        let before = wishlist.products.len();
        wishlist.products.retain(|p| *p != product_id);
        if wishlist.products.len() == before {
            return Err(ServiceError::NotFound("Product"));
        }
        wishlist.updated_at = Utc::now();
        self.store.upsert_wishlist(wishlist.clone()).await?;
        self.resolve(&wishlist).await
    }

    /// Drop every reference.
    pub async fn clear(&self, user: UserId) -> ServiceResult<()> {
        let mut wishlist = self
            .store
            .wishlist(user)
            .await?
            .unwrap_or_else(|| Wishlist::empty(user));
        wishlist.products.clear();
        wishlist.updated_at = Utc::now();
        self.store.upsert_wishlist(wishlist).await?;
        Ok(())
    }

    async fn resolve(&self, wishlist: &Wishlist) -> ServiceResult<Vec<WishlistEntry>> {
        let mut entries = Vec::with_capacity(wishlist.products.len());
        for product_id in &wishlist.products {
            let Some(product) = self.store.product(*product_id).await? else {
                continue;
            };
            entries.push(WishlistEntry {
                product: product.id,
                name: product.name.to_string(),
                price: product.price,
                final_price: product.final_price,
                image: product.primary_image_url(),
                rating: product.rating,
                stock: product.stock,
            });
        }
        Ok(entries)
    }
}
