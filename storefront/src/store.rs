//! Document-store traits.
//!
//! The storefront treats its persistence layer as a generic document store:
//! per-collection CRUD, filtered/paginated listings, and a handful of
//! aggregate queries that a real backend would express as aggregation
//! pipelines. Backends implement these traits; `storefront-memory` provides
//! the in-memory reference implementation.

use crate::cart::Cart;
use crate::errors::StoreResult;
use crate::order::{Order, OrderStatus};
use crate::product::{Category, Product};
use crate::types::{Brand, EmailAddress, Money, OrderId, ProductId, UserId};
use crate::user::{Role, User};
use crate::wishlist::Wishlist;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One page of a listing, with pagination bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: u64,
    /// Total number of pages.
    pub pages: u64,
    /// Total number of matching items.
    pub total: u64,
}

impl<T> Page<T> {
    /// Assemble a page from a pre-sliced item vector.
    pub fn new(items: Vec<T>, page: u64, limit: u64, total: u64) -> Self {
        let pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            items,
            page,
            pages,
            total,
        }
    }
}

/// Sort order for product listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    /// Cheapest first, by final price.
    PriceAsc,
    /// Most expensive first, by final price.
    PriceDesc,
    /// Best rated first.
    Rating,
    /// Most recently created first (the default).
    #[default]
    Newest,
}

/// Filters for product listings.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    /// Case-insensitive match over name, description and brand.
    pub keyword: Option<String>,
    /// Restrict to one category.
    pub category: Option<Category>,
    /// Restrict to one brand.
    pub brand: Option<String>,
    /// Lower bound on final price.
    pub min_price: Option<Money>,
    /// Upper bound on final price.
    pub max_price: Option<Money>,
    /// Lower bound on aggregate rating.
    pub min_rating: Option<f64>,
    /// Sort order.
    pub sort: ProductSort,
    /// 1-based page number (default 1).
    pub page: u64,
    /// Page size (default 12).
    pub limit: u64,
}

impl ProductQuery {
    /// Default page size for product listings.
    pub const DEFAULT_LIMIT: u64 = 12;
}

/// Filters for the admin order listing.
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    /// Restrict to one status.
    pub status: Option<OrderStatus>,
    /// Only orders created at or after this instant.
    pub start_date: Option<DateTime<Utc>>,
    /// Only orders created at or before this instant.
    pub end_date: Option<DateTime<Utc>>,
    /// 1-based page number (default 1).
    pub page: u64,
    /// Page size (default 20).
    pub limit: u64,
}

impl OrderQuery {
    /// Default page size for order listings.
    pub const DEFAULT_LIMIT: u64 = 20;
}

/// Filters for the admin user listing.
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    /// Case-insensitive match over name and email.
    pub search: Option<String>,
    /// Restrict to one role.
    pub role: Option<Role>,
    /// Restrict to active (unblocked) or blocked accounts.
    pub active: Option<bool>,
    /// 1-based page number (default 1).
    pub page: u64,
    /// Page size (default 20).
    pub limit: u64,
}

impl UserQuery {
    /// Default page size for user listings.
    pub const DEFAULT_LIMIT: u64 = 20;
}

/// Revenue for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyRevenue {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// Revenue from non-cancelled orders created in that month.
    pub revenue: Money,
}

/// Units sold and revenue for one product, derived from order line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProductSales {
    /// The product.
    pub product: ProductId,
    /// Total units across non-cancelled orders.
    pub total_sold: u64,
    /// Total revenue (unit price times quantity) across those orders.
    pub revenue: Money,
}

/// User collection operations.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with `Duplicate` if the email is taken.
    async fn insert_user(&self, user: User) -> StoreResult<()>;

    /// Fetch a user by id.
    async fn user(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Fetch a user by (lowercased) email.
    async fn user_by_email(&self, email: &EmailAddress) -> StoreResult<Option<User>>;

    /// Replace an existing user document.
    async fn update_user(&self, user: User) -> StoreResult<()>;

    /// Delete a user document.
    async fn delete_user(&self, id: UserId) -> StoreResult<()>;

    /// Filtered, paginated user listing, newest first.
    async fn list_users(&self, query: &UserQuery) -> StoreResult<Page<User>>;

    /// Number of accounts with the given role.
    async fn count_users_by_role(&self, role: Role) -> StoreResult<u64>;
}

/// Product collection operations.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a new product.
    async fn insert_product(&self, product: Product) -> StoreResult<()>;

    /// Fetch a product by id.
    async fn product(&self, id: ProductId) -> StoreResult<Option<Product>>;

    /// Replace an existing product document.
    async fn update_product(&self, product: Product) -> StoreResult<()>;

    /// Delete a product document.
    async fn delete_product(&self, id: ProductId) -> StoreResult<()>;

    /// Filtered, paginated listing over active products.
    async fn list_products(&self, query: &ProductQuery) -> StoreResult<Page<Product>>;

    /// Featured active products, best rated first.
    async fn featured_products(&self, limit: usize) -> StoreResult<Vec<Product>>;

    /// Distinct categories among active products.
    async fn categories(&self) -> StoreResult<Vec<Category>>;

    /// Distinct brands among active products.
    async fn brands(&self) -> StoreResult<Vec<Brand>>;

    /// Atomically adjust stock by `delta`, returning the new level.
    ///
    /// The precondition check and the write happen under one lock/update, so
    /// a decrement that would drive stock negative fails with
    /// `InsufficientStock` and mutates nothing.
    async fn adjust_stock(&self, id: ProductId, delta: i64) -> StoreResult<u32>;

    /// Active products at or below `threshold` units, at most `limit`.
    async fn low_stock_products(&self, threshold: u32, limit: usize) -> StoreResult<Vec<Product>>;

    /// Total product count.
    async fn count_products(&self) -> StoreResult<u64>;
}

/// Cart collection operations. One cart per user.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Fetch a user's cart, if one exists.
    async fn cart(&self, user: UserId) -> StoreResult<Option<Cart>>;

    /// Create or replace a user's cart.
    async fn upsert_cart(&self, cart: Cart) -> StoreResult<()>;
}

/// Order collection operations, including the dashboard aggregates.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert a new order.
    async fn insert_order(&self, order: Order) -> StoreResult<()>;

    /// Fetch an order by id.
    async fn order(&self, id: OrderId) -> StoreResult<Option<Order>>;

    /// Replace an existing order document.
    async fn update_order(&self, order: Order) -> StoreResult<()>;

    /// All orders placed by one user, newest first.
    async fn orders_for_user(&self, user: UserId) -> StoreResult<Vec<Order>>;

    /// Filtered, paginated listing over all orders, newest first.
    async fn list_orders(&self, query: &OrderQuery) -> StoreResult<Page<Order>>;

    /// Most recent orders across all users.
    async fn recent_orders(&self, limit: usize) -> StoreResult<Vec<Order>>;

    /// Count orders, optionally restricted to one status.
    async fn count_orders(&self, status: Option<OrderStatus>) -> StoreResult<u64>;

    /// Total revenue over non-cancelled orders.
    async fn total_revenue(&self) -> StoreResult<Money>;

    /// Per-month revenue over non-cancelled orders created since `since`,
    /// sorted by year then month.
    async fn monthly_revenue(&self, since: DateTime<Utc>) -> StoreResult<Vec<MonthlyRevenue>>;

    /// Top products by units sold across non-cancelled orders.
    async fn top_products(&self, limit: usize) -> StoreResult<Vec<ProductSales>>;
}

/// Wishlist collection operations. One wishlist per user.
#[async_trait]
pub trait WishlistStore: Send + Sync {
    /// Fetch a user's wishlist, if one exists.
    async fn wishlist(&self, user: UserId) -> StoreResult<Option<Wishlist>>;

    /// Create or replace a user's wishlist.
    async fn upsert_wishlist(&self, wishlist: Wishlist) -> StoreResult<()>;
}

/// The full document-store surface the services depend on.
pub trait Store:
    UserStore + ProductStore + CartStore + OrderStore + WishlistStore + Send + Sync
{
}

impl<T> Store for T where
    T: UserStore + ProductStore + CartStore + OrderStore + WishlistStore + Send + Sync
{
}
