//! Checkout and the order workflow.
//!
//! Placing an order converts a cart into an immutable [`Order`] snapshot and
//! decrements stock per product. The decrements are conditional and atomic at
//! the store layer, so two checkouts racing on the last units cannot both
//! succeed; if a decrement fails partway through, the units already taken are
//! handed back before the error surfaces. Cancellation restores stock the
//! same way, line by line.

use crate::errors::{ServiceError, ServiceResult, StoreError};
use crate::notify::{self, Mailer};
use crate::order::{Order, OrderItem, OrderStatus, ShippingAddress};
use crate::store::{OrderQuery, Page, Store};
use crate::types::{EmailAddress, Money, OrderId, ProductId, Quantity, UserId};
use crate::user::User;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Checkout input: the shipping snapshot plus manually entered charges.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    /// Where to ship the order.
    pub shipping_address: ShippingAddress,
    /// Tax amount for the whole order.
    #[serde(default)]
    pub tax_price: Option<Money>,
    /// Shipping amount for the whole order.
    #[serde(default)]
    pub shipping_price: Option<Money>,
}

/// Input for the admin status-update operation.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    /// Target status.
    pub status: OrderStatus,
    /// Carrier tracking number, meaningful when shipping.
    #[serde(default)]
    pub tracking_number: Option<String>,
}

/// Buyer summary joined onto orders in admin listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Buyer {
    /// Account id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: EmailAddress,
}

/// An order together with its buyer, for the back office. The buyer is
/// `None` when the account has since been deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderWithBuyer {
    /// The order document.
    #[serde(flatten)]
    pub order: Order,
    /// The account that placed it, if it still exists.
    pub buyer: Option<Buyer>,
}

/// Order placement and lifecycle operations.
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn Store>,
    mailer: Arc<dyn Mailer>,
}

impl OrderService {
    /// Create the service over a document store and a mail relay.
    pub fn new(store: Arc<dyn Store>, mailer: Arc<dyn Mailer>) -> Self {
        Self { store, mailer }
    }

    /// Place an order from the user's cart.
    ///
    /// Steps: snapshot and precheck every line (no mutation yet), then
    /// decrement stock per product with compensation on partial failure,
    /// then persist the order, clear the cart and dispatch the confirmation
    /// email. Emails are fire-and-forget.
    pub async fn place_order(&self, actor: &User, request: CheckoutRequest) -> ServiceResult<Order> {
        let cart = self
            .store
            .cart(actor.id)
            .await?
            .filter(|c| !c.items.is_empty())
            .ok_or_else(|| ServiceError::business("Cart is empty"))?;

        // Snapshot pass: price every line and fail fast with a readable
        // message before any stock is touched.
        let mut order_items = Vec::with_capacity(cart.items.len());
        for line in &cart.items {
            let product = self
                .store
                .product(line.product)
                .await?
                .filter(|p| p.is_active)
                .ok_or(ServiceError::NotFound("Product"))?;
            if product.stock < line.quantity.value() {
                return Err(ServiceError::business(format!(
                    "Insufficient stock for {}",
                    product.name
                )));
            }
            order_items.push(OrderItem {
                product: product.id,
                name: product.name.to_string(),
                quantity: line.quantity,
                price: product.final_price,
                image: product.primary_image_url(),
            });
        }

        // Commit pass: conditional decrements. A failure here (a concurrent
        // checkout won the race) hands back everything taken so far.
        let mut taken: Vec<(ProductId, Quantity)> = Vec::with_capacity(order_items.len());
        for item in &order_items {
            let delta = -i64::from(item.quantity.value());
            match self.store.adjust_stock(item.product, delta).await {
                Ok(_) => taken.push((item.product, item.quantity)),
                Err(err) => {
                    self.release(&taken).await;
                    return Err(match err {
                        StoreError::InsufficientStock => ServiceError::business(format!(
                            "Insufficient stock for {}",
                            item.name
                        )),
                        other => other.into(),
                    });
                }
            }
        }

        let order = match Order::create(
            actor.id,
            order_items,
            request.shipping_address,
            request.tax_price.unwrap_or(Money::ZERO),
            request.shipping_price.unwrap_or(Money::ZERO),
        ) {
            Ok(order) => order,
            Err(err) => {
                self.release(&taken).await;
                return Err(err);
            }
        };
        if let Err(err) = self.store.insert_order(order.clone()).await {
            self.release(&taken).await;
            return Err(err.into());
        }

        let mut cart = cart;
        cart.clear();
        self.store.upsert_cart(cart).await?;

        tracing::info!(order = %order.id, user = %actor.id, total = %order.total_price, "order placed");
        notify::dispatch(
            Arc::clone(&self.mailer),
            notify::order_confirmation(&order, actor.email.clone(), actor.name.as_ref()),
        );
        Ok(order)
    }

    /// The actor's own orders, newest first.
    pub async fn my_orders(&self, actor: &User) -> ServiceResult<Vec<Order>> {
        Ok(self.store.orders_for_user(actor.id).await?)
    }

    /// Fetch one order. Visible to its owner and to admins.
    pub async fn get(&self, actor: &User, id: OrderId) -> ServiceResult<Order> {
        let order = self
            .store
            .order(id)
            .await?
            .ok_or(ServiceError::NotFound("Order"))?;
        if order.user != actor.id && !actor.is_admin() {
            return Err(ServiceError::Forbidden);
        }
        Ok(order)
    }

    /// Cancel a Processing order, restoring its stock. Owner or admin only.
    pub async fn cancel(&self, actor: &User, id: OrderId) -> ServiceResult<Order> {
        let mut order = self.get(actor, id).await?;
        order.transition_to(OrderStatus::Cancelled, None)?;
        // Persist the transition before restocking: if the write fails the
        // stock must not come back while the order is still Processing.
        self.store.update_order(order.clone()).await?;
        self.restock(&order).await;

        tracing::info!(order = %order.id, by = %actor.id, "order cancelled");
        self.notify_owner(&order, notify::order_cancelled).await;
        Ok(order)
    }

    /// Admin status update, restricted to the legal transitions of the
    /// machine. Cancelling restores stock; shipping and delivery notify the
    /// buyer.
    pub async fn update_status(&self, id: OrderId, update: StatusUpdate) -> ServiceResult<Order> {
        let mut order = self
            .store
            .order(id)
            .await?
            .ok_or(ServiceError::NotFound("Order"))?;
        order.transition_to(update.status, update.tracking_number)?;
        self.store.update_order(order.clone()).await?;
        if update.status == OrderStatus::Cancelled {
            self.restock(&order).await;
        }

        tracing::info!(order = %order.id, status = %order.order_status, "order status updated");
        match update.status {
            OrderStatus::Shipped => self.notify_owner(&order, notify::order_shipped).await,
            OrderStatus::Delivered => self.notify_owner(&order, notify::order_delivered).await,
            OrderStatus::Cancelled => self.notify_owner(&order, notify::order_cancelled).await,
            OrderStatus::Processing => {}
        }
        Ok(order)
    }

    /// Admin listing over all orders, each joined with its buyer.
    pub async fn list(&self, query: &OrderQuery) -> ServiceResult<Page<OrderWithBuyer>> {
        let page = self.store.list_orders(query).await?;
        let mut items = Vec::with_capacity(page.items.len());
        for order in page.items {
            let buyer = self.store.user(order.user).await?.map(|u| Buyer {
                id: u.id,
                name: u.name.to_string(),
                email: u.email,
            });
            items.push(OrderWithBuyer { order, buyer });
        }
        Ok(Page {
            items,
            page: page.page,
            pages: page.pages,
            total: page.total,
        })
    }

    /// Hand back stock taken by a failed checkout. Best-effort: a product
    /// deleted mid-flight is skipped, other failures are logged.
    async fn release(&self, taken: &[(ProductId, Quantity)]) {
        for &(product, quantity) in taken {
            match self
                .store
                .adjust_stock(product, i64::from(quantity.value()))
                .await
            {
                Ok(_) | Err(StoreError::NotFound) => {}
                Err(err) => {
                    tracing::warn!(%product, error = %err, "failed to release reserved stock");
                }
            }
        }
    }

    /// Restore stock for every line of a cancelled order. Lines whose product
    /// has since been deleted are skipped silently.
    async fn restock(&self, order: &Order) {
        for item in &order.order_items {
            match self
                .store
                .adjust_stock(item.product, i64::from(item.quantity.value()))
                .await
            {
                Ok(_) | Err(StoreError::NotFound) => {}
                Err(err) => {
                    tracing::warn!(product = %item.product, error = %err, "failed to restore stock");
                }
            }
        }
    }

    /// Dispatch an order notification to the buyer, if the account still
    /// exists. Lookup failures are logged, never surfaced.
    async fn notify_owner(&self, order: &Order, template: fn(&Order, EmailAddress, &str) -> notify::EmailMessage) {
        match self.store.user(order.user).await {
            Ok(Some(owner)) => notify::dispatch(
                Arc::clone(&self.mailer),
                template(order, owner.email.clone(), owner.name.as_ref()),
            ),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(order = %order.id, error = %err, "could not load buyer for notification");
            }
        }
    }
}
