//! Orders: immutable checkout snapshots plus the status state machine.
//!
//! An order captures product name, unit price and image *as they were at
//! checkout*; later catalog edits never show through. Status transitions are
//! restricted to the legal edges of the machine:
//!
//! ```text
//! Processing -> Shipped -> Delivered
//! Processing -> Cancelled
//! ```
//!
//! Delivered and Cancelled are terminal.

use crate::errors::{ServiceError, ServiceResult};
use crate::types::{
    Money, OrderId, PersonName, PhoneNumber, Pincode, ProductId, Quantity, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Placed and awaiting fulfilment. Initial state.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Delivered to the customer. Terminal.
    Delivered,
    /// Cancelled before shipping. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Whether the machine permits moving from `self` to `next`.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Processing, Self::Shipped)
                | (Self::Shipped, Self::Delivered)
                | (Self::Processing, Self::Cancelled)
        )
    }

    /// Whether no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        };
        write!(f, "{name}")
    }
}

/// A line item snapshotted into an order at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Referenced product (may no longer exist).
    pub product: ProductId,
    /// Product name at checkout.
    pub name: String,
    /// Ordered quantity.
    pub quantity: Quantity,
    /// Unit price at checkout (the product's final price at that moment).
    pub price: Money,
    /// First product image URL at checkout, empty if none.
    pub image: String,
}

impl OrderItem {
    /// Line total: unit price times quantity.
    pub fn line_total(&self) -> ServiceResult<Money> {
        self.price.multiply_by(self.quantity).map_err(Into::into)
    }
}

/// Shipping address snapshotted into an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// Recipient full name.
    pub full_name: PersonName,
    /// Contact phone, 10 digits.
    pub phone: PhoneNumber,
    /// Street address, first line.
    pub address_line1: String,
    /// Street address, second line.
    #[serde(default)]
    pub address_line2: Option<String>,
    /// City.
    pub city: String,
    /// State.
    pub state: String,
    /// Postal code, 6 digits.
    pub pincode: Pincode,
}

/// An order document. Created atomically from a cart; never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Identity.
    pub id: OrderId,
    /// The account that placed the order.
    pub user: UserId,
    /// Snapshotted line items.
    pub order_items: Vec<OrderItem>,
    /// Snapshotted shipping address.
    pub shipping_address: ShippingAddress,
    /// Sum of line totals.
    pub items_price: Money,
    /// Manually entered tax amount.
    pub tax_price: Money,
    /// Manually entered shipping amount.
    pub shipping_price: Money,
    /// `items_price + tax_price + shipping_price`, exactly.
    pub total_price: Money,
    /// Current status.
    pub order_status: OrderStatus,
    /// Carrier tracking number, set when shipped.
    pub tracking_number: Option<String>,
    /// Delivery timestamp, set on the Shipped -> Delivered transition.
    pub delivered_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Assemble a new Processing order from snapshotted parts.
    ///
    /// `items_price` is computed from the line items and `total_price` from
    /// its three inputs, so the pricing invariant holds by construction.
    pub fn create(
        user: UserId,
        order_items: Vec<OrderItem>,
        shipping_address: ShippingAddress,
        tax_price: Money,
        shipping_price: Money,
    ) -> ServiceResult<Self> {
        let mut items_price = Money::ZERO;
        for item in &order_items {
            items_price = items_price.checked_add(item.line_total()?)?;
        }
        let total_price = items_price
            .checked_add(tax_price)?
            .checked_add(shipping_price)?;
        let now = Utc::now();
        Ok(Self {
            id: OrderId::new(),
            user,
            order_items,
            shipping_address,
            items_price,
            tax_price,
            shipping_price,
            total_price,
            order_status: OrderStatus::Processing,
            tracking_number: None,
            delivered_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Drive the status machine, applying per-transition effects (tracking
    /// number on shipping, delivery timestamp on delivery). Stock restoration
    /// on cancellation is the caller's responsibility since it touches other
    /// documents.
    pub fn transition_to(
        &mut self,
        next: OrderStatus,
        tracking_number: Option<String>,
    ) -> ServiceResult<()> {
        if !self.order_status.can_transition_to(next) {
            return Err(ServiceError::business(format!(
                "Cannot move order from {} to {next}",
                self.order_status
            )));
        }
        match next {
            OrderStatus::Shipped => {
                if tracking_number.is_some() {
                    self.tracking_number = tracking_number;
                }
            }
            OrderStatus::Delivered => {
                self.delivered_at = Some(Utc::now());
            }
            OrderStatus::Processing | OrderStatus::Cancelled => {}
        }
        self.order_status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}
