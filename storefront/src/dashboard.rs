//! The admin dashboard: aggregate statistics assembled in one pass.

use crate::checkout::{Buyer, OrderWithBuyer};
use crate::errors::ServiceResult;
use crate::order::OrderStatus;
use crate::product::Product;
use crate::store::Store;
use crate::types::{Money, ProductId};
use crate::user::Role;
use chrono::{Duration, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Stock level at or below which a product counts as low-stock.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// How many low-stock products the dashboard lists.
const LOW_STOCK_LIMIT: usize = 10;

/// How many recent orders the dashboard lists.
const RECENT_ORDERS_LIMIT: usize = 10;

/// How many best-selling products the dashboard lists.
const TOP_PRODUCTS_LIMIT: usize = 5;

/// How many months the revenue series covers.
const REVENUE_MONTHS: i64 = 6;

/// One month of the revenue series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevenuePoint {
    /// Calendar month as `YYYY-MM`.
    pub month: String,
    /// Revenue from non-cancelled orders created in that month.
    pub revenue: Money,
}

/// A best-selling product with its sales figures. Name and image come from
/// the current catalog; a deleted product keeps its sales but loses both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopProduct {
    /// The product.
    pub product: ProductId,
    /// Current product name, if it still exists.
    pub name: Option<String>,
    /// Current first image URL, if it still exists.
    pub image: Option<String>,
    /// Total units across non-cancelled orders.
    pub total_sold: u64,
    /// Total revenue across those orders.
    pub revenue: Money,
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    /// Number of shopper accounts (admins excluded).
    pub total_users: u64,
    /// Number of products, active or not.
    pub total_products: u64,
    /// Number of orders in any status.
    pub total_orders: u64,
    /// Orders currently in Processing.
    pub pending_orders: u64,
    /// Revenue over non-cancelled orders.
    pub total_revenue: Money,
    /// Per-month revenue over the last six months, oldest first.
    pub monthly_revenue: Vec<RevenuePoint>,
    /// Best sellers by units sold.
    pub top_products: Vec<TopProduct>,
    /// Most recent orders, each with its buyer.
    pub recent_orders: Vec<OrderWithBuyer>,
    /// Active products at or below the low-stock threshold.
    pub low_stock_products: Vec<Product>,
}

/// Dashboard assembly.
#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn Store>,
}

impl DashboardService {
    /// Create the service over a document store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Assemble the full dashboard.
    pub async fn stats(&self) -> ServiceResult<DashboardStats> {
        let total_users = self.store.count_users_by_role(Role::User).await?;
        let total_products = self.store.count_products().await?;
        let total_orders = self.store.count_orders(None).await?;
        let pending_orders = self
            .store
            .count_orders(Some(OrderStatus::Processing))
            .await?;
        let total_revenue = self.store.total_revenue().await?;

        let since = Utc::now() - Duration::days(30 * REVENUE_MONTHS);
        let monthly_revenue = self
            .store
            .monthly_revenue(since)
            .await?
            .into_iter()
            .map(|m| RevenuePoint {
                month: format!("{:04}-{:02}", m.year, m.month),
                revenue: m.revenue,
            })
            .collect();

        let mut top_products = Vec::with_capacity(TOP_PRODUCTS_LIMIT);
        for sales in self.store.top_products(TOP_PRODUCTS_LIMIT).await? {
            let product = self.store.product(sales.product).await?;
            top_products.push(TopProduct {
                product: sales.product,
                name: product.as_ref().map(|p| p.name.to_string()),
                image: product.as_ref().map(Product::primary_image_url),
                total_sold: sales.total_sold,
                revenue: sales.revenue,
            });
        }

        let mut recent_orders = Vec::with_capacity(RECENT_ORDERS_LIMIT);
        for order in self.store.recent_orders(RECENT_ORDERS_LIMIT).await? {
            let buyer = self.store.user(order.user).await?.map(|u| Buyer {
                id: u.id,
                name: u.name.to_string(),
                email: u.email,
            });
            recent_orders.push(OrderWithBuyer { order, buyer });
        }

        let low_stock_products = self
            .store
            .low_stock_products(LOW_STOCK_THRESHOLD, LOW_STOCK_LIMIT)
            .await?;

        Ok(DashboardStats {
            total_users,
            total_products,
            total_orders,
            pending_orders,
            total_revenue,
            monthly_revenue,
            top_products,
            recent_orders,
            low_stock_products,
        })
    }
}
