//! Shopping carts: one per user, priced at read time.
//!
//! A cart stores only product references and quantities. Totals are computed
//! against *current* catalog prices whenever the cart is read - nothing is
//! snapshotted until checkout.

use crate::errors::{ServiceError, ServiceResult};
use crate::store::Store;
use crate::types::{Money, ProductId, Quantity, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A cart line: a product reference and a quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Referenced product.
    pub product: ProductId,
    /// Quantity, 1-10.
    pub quantity: Quantity,
}

/// A cart document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Owning user. One cart per user.
    pub user: UserId,
    /// Ordered line items.
    pub items: Vec<CartItem>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// A fresh empty cart for `user`.
    pub fn empty(user: UserId) -> Self {
        Self {
            user,
            items: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Drop all line items.
    pub fn clear(&mut self) {
        self.items.clear();
        self.updated_at = Utc::now();
    }
}

/// One line of a priced cart view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    /// Referenced product.
    pub product: ProductId,
    /// Current product name.
    pub name: String,
    /// Current first image URL.
    pub image: String,
    /// Current final price per unit.
    pub price: Money,
    /// Current stock level, so clients can warn about shortfalls.
    pub stock: u32,
    /// Quantity in the cart.
    pub quantity: Quantity,
    /// `price * quantity`.
    pub line_total: Money,
}

/// A cart priced against the current catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartView {
    /// Priced lines. Products that have left the catalog are omitted.
    pub items: Vec<CartLine>,
    /// Total unit count.
    pub total_items: u32,
    /// Sum of line totals at current prices.
    pub total_price: Money,
}

/// Cart operations.
#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn Store>,
}

impl CartService {
    /// Create the service over a document store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// The user's cart, priced at current catalog prices. Created lazily.
    pub async fn view(&self, user: UserId) -> ServiceResult<CartView> {
        let cart = match self.store.cart(user).await? {
            Some(cart) => cart,
            None => {
                let cart = Cart::empty(user);
                self.store.upsert_cart(cart.clone()).await?;
                cart
            }
        };
        self.price(&cart).await
    }

    /// Add `quantity` units of a product, merging with an existing line.
    pub async fn add_item(
        &self,
        user: UserId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> ServiceResult<CartView> {
        let product = self
            .store
            .product(product_id)
            .await?
            .filter(|p| p.is_active)
            .ok_or(ServiceError::NotFound("Product"))?;

        let mut cart = self
            .store
            .cart(user)
            .await?
            .unwrap_or_else(|| Cart::empty(user));

        let requested = match cart.items.iter().find(|i| i.product == product_id) {
            Some(existing) => Quantity::new(existing.quantity.value() + quantity.value())?,
            None => quantity,
        };
        if product.stock < requested.value() {
            return Err(ServiceError::business(format!(
                "Insufficient stock for {}",
                product.name
            )));
        }

        match cart.items.iter_mut().find(|i| i.product == product_id) {
            Some(existing) => existing.quantity = requested,
            None => cart.items.push(CartItem {
                product: product_id,
                quantity: requested,
            }),
        }
        cart.updated_at = Utc::now();
        self.store.upsert_cart(cart.clone()).await?;
        self.price(&cart).await
    }

    /// Set a line's quantity exactly.
    pub async fn update_item(
        &self,
        user: UserId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> ServiceResult<CartView> {
        let product = self
            .store
            .product(product_id)
            .await?
            .ok_or(ServiceError::NotFound("Product"))?;
        if product.stock < quantity.value() {
            return Err(ServiceError::business(format!(
                "Insufficient stock for {}",
                product.name
            )));
        }

        let mut cart = self
            .store
            .cart(user)
            .await?
            .ok_or(ServiceError::NotFound("Cart"))?;
        let item = cart
            .items
            .iter_mut()
            .find(|i| i.product == product_id)
            .ok_or(ServiceError::NotFound("Cart item"))?;
        item.quantity = quantity;
        cart.updated_at = Utc::now();
        self.store.upsert_cart(cart.clone()).await?;
        self.price(&cart).await
    }

    /// Remove a line.
    pub async fn remove_item(&self, user: UserId, product_id: ProductId) -> ServiceResult<CartView> {
        let mut cart = self
            .store
            .cart(user)
            .await?
            .ok_or(ServiceError::NotFound("Cart"))?;
        let before = cart.items.len();
        cart.items.retain(|i| i.product != product_id);
        if cart.items.len() == before {
            return Err(ServiceError::NotFound("Cart item"));
        }
        cart.updated_at = Utc::now();
        self.store.upsert_cart(cart.clone()).await?;
        self.price(&cart).await
    }

    /// Drop every line.
    pub async fn clear(&self, user: UserId) -> ServiceResult<CartView> {
        let mut cart = self
            .store
            .cart(user)
            .await?
            .unwrap_or_else(|| Cart::empty(user));
        cart.clear();
        self.store.upsert_cart(cart.clone()).await?;
        self.price(&cart).await
    }

    /// Join cart lines against the current catalog.
    async fn price(&self, cart: &Cart) -> ServiceResult<CartView> {
        let mut items = Vec::with_capacity(cart.items.len());
        let mut total_items = 0u32;
        let mut total_price = Money::ZERO;

        for line in &cart.items {
            // A product deleted since it was added simply drops out of the view.
            let Some(product) = self.store.product(line.product).await? else {
                continue;
            };
            let line_total = product.final_price.multiply_by(line.quantity)?;
            total_items += line.quantity.value();
            total_price = total_price.checked_add(line_total)?;
            items.push(CartLine {
                product: product.id,
                name: product.name.to_string(),
                image: product.primary_image_url(),
                price: product.final_price,
                stock: product.stock,
                quantity: line.quantity,
                line_total,
            });
        }

        Ok(CartView {
            items,
            total_items,
            total_price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cart_has_no_items() {
        let cart = Cart::empty(UserId::new());
        assert!(cart.items.is_empty());
    }

    #[test]
    fn clear_drops_all_items() {
        let mut cart = Cart::empty(UserId::new());
        cart.items.push(CartItem {
            product: ProductId::new(),
            quantity: Quantity::new(2).unwrap(),
        });
        cart.clear();
        assert!(cart.items.is_empty());
    }
}
