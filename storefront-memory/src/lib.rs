//! In-memory document store for the storefront
//!
//! This crate provides an in-memory implementation of the store traits from
//! the storefront crate, useful for testing and development scenarios where
//! persistence is not required. Aggregations that a real backend would run
//! as pipelines (revenue series, best sellers) are computed with plain scans.
//!
//! A [`FakeMediaHost`] is included so image flows can run without a real
//! hosting account.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::significant_drop_tightening)]

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use storefront::cart::Cart;
use storefront::errors::{StoreError, StoreResult};
use storefront::media::{HostedImage, MediaError, MediaHost};
use storefront::order::{Order, OrderStatus};
use storefront::product::{Category, Product};
use storefront::store::{
    CartStore, MonthlyRevenue, OrderQuery, OrderStore, Page, ProductQuery, ProductSales,
    ProductSort, ProductStore, UserQuery, UserStore, WishlistStore,
};
use storefront::types::{Brand, EmailAddress, Money, OrderId, ProductId, UserId};
use storefront::user::{Role, User};
use storefront::wishlist::Wishlist;

/// Thread-safe in-memory document store.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    users: Arc<RwLock<HashMap<UserId, User>>>,
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
    carts: Arc<RwLock<HashMap<UserId, Cart>>>,
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
    wishlists: Arc<RwLock<HashMap<UserId, Wishlist>>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Slice a sorted item vector into one page.
#[allow(clippy::cast_possible_truncation)]
fn paginate<T>(items: Vec<T>, page: u64, limit: u64, default_limit: u64) -> Page<T> {
    let limit = if limit == 0 { default_limit } else { limit };
    let page = page.max(1);
    let total = items.len() as u64;
    let start = (page - 1).saturating_mul(limit);
    let items: Vec<T> = items
        .into_iter()
        .skip(start as usize)
        .take(limit as usize)
        .collect();
    Page::new(items, page, limit, total)
}

/// Newest first, with the time-ordered id as tiebreaker.
fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> DateTime<Utc>) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, user: User) -> StoreResult<()> {
        let mut users = self.users.write().expect("RwLock poisoned");
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate);
        }
        users.insert(user.id, user);
        Ok(())
    }

    async fn user(&self, id: UserId) -> StoreResult<Option<User>> {
        let users = self.users.read().expect("RwLock poisoned");
        Ok(users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &EmailAddress) -> StoreResult<Option<User>> {
        let users = self.users.read().expect("RwLock poisoned");
        Ok(users.values().find(|u| &u.email == email).cloned())
    }

    async fn update_user(&self, user: User) -> StoreResult<()> {
        let mut users = self.users.write().expect("RwLock poisoned");
        if !users.contains_key(&user.id) {
            return Err(StoreError::NotFound);
        }
        users.insert(user.id, user);
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<()> {
        let mut users = self.users.write().expect("RwLock poisoned");
        users.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn list_users(&self, query: &UserQuery) -> StoreResult<Page<User>> {
        let users = self.users.read().expect("RwLock poisoned");
        let search = query.search.as_ref().map(|s| s.to_lowercase());
        let mut matches: Vec<User> = users
            .values()
            .filter(|u| {
                search.as_ref().is_none_or(|s| {
                    u.name.as_ref().to_lowercase().contains(s)
                        || u.email.as_ref().to_lowercase().contains(s)
                })
            })
            .filter(|u| query.role.is_none_or(|role| u.role == role))
            .filter(|u| query.active.is_none_or(|active| u.is_active == active))
            .cloned()
            .collect();
        newest_first(&mut matches, |u| u.created_at);
        Ok(paginate(
            matches,
            query.page,
            query.limit,
            UserQuery::DEFAULT_LIMIT,
        ))
    }

    async fn count_users_by_role(&self, role: Role) -> StoreResult<u64> {
        let users = self.users.read().expect("RwLock poisoned");
        Ok(users.values().filter(|u| u.role == role).count() as u64)
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn insert_product(&self, product: Product) -> StoreResult<()> {
        let mut products = self.products.write().expect("RwLock poisoned");
        products.insert(product.id, product);
        Ok(())
    }

    async fn product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let products = self.products.read().expect("RwLock poisoned");
        Ok(products.get(&id).cloned())
    }

    async fn update_product(&self, product: Product) -> StoreResult<()> {
        let mut products = self.products.write().expect("RwLock poisoned");
        if !products.contains_key(&product.id) {
            return Err(StoreError::NotFound);
        }
        products.insert(product.id, product);
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> StoreResult<()> {
        let mut products = self.products.write().expect("RwLock poisoned");
        products.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn list_products(&self, query: &ProductQuery) -> StoreResult<Page<Product>> {
        let products = self.products.read().expect("RwLock poisoned");
        let keyword = query.keyword.as_ref().map(|k| k.to_lowercase());
        let mut matches: Vec<Product> = products
            .values()
            .filter(|p| p.is_active)
            .filter(|p| {
                keyword.as_ref().is_none_or(|k| {
                    p.name.as_ref().to_lowercase().contains(k)
                        || p.description.as_ref().to_lowercase().contains(k)
                        || p.brand.as_ref().to_lowercase().contains(k)
                })
            })
            .filter(|p| query.category.is_none_or(|c| p.category == c))
            .filter(|p| {
                query
                    .brand
                    .as_ref()
                    .is_none_or(|b| p.brand.as_ref().eq_ignore_ascii_case(b))
            })
            .filter(|p| query.min_price.is_none_or(|min| p.final_price >= min))
            .filter(|p| query.max_price.is_none_or(|max| p.final_price <= max))
            .filter(|p| query.min_rating.is_none_or(|min| p.rating >= min))
            .cloned()
            .collect();

        match query.sort {
            ProductSort::PriceAsc => matches.sort_by(|a, b| a.final_price.cmp(&b.final_price)),
            ProductSort::PriceDesc => matches.sort_by(|a, b| b.final_price.cmp(&a.final_price)),
            ProductSort::Rating => matches.sort_by(|a, b| {
                b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal)
            }),
            ProductSort::Newest => newest_first(&mut matches, |p| p.created_at),
        }

        Ok(paginate(
            matches,
            query.page,
            query.limit,
            ProductQuery::DEFAULT_LIMIT,
        ))
    }

    async fn featured_products(&self, limit: usize) -> StoreResult<Vec<Product>> {
        let products = self.products.read().expect("RwLock poisoned");
        let mut featured: Vec<Product> = products
            .values()
            .filter(|p| p.is_active && p.featured)
            .cloned()
            .collect();
        featured.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal));
        featured.truncate(limit);
        Ok(featured)
    }

    async fn categories(&self) -> StoreResult<Vec<Category>> {
        let products = self.products.read().expect("RwLock poisoned");
        let distinct: std::collections::BTreeSet<Category> = products
            .values()
            .filter(|p| p.is_active)
            .map(|p| p.category)
            .collect();
        Ok(distinct.into_iter().collect())
    }

    async fn brands(&self) -> StoreResult<Vec<Brand>> {
        let products = self.products.read().expect("RwLock poisoned");
        let mut brands: Vec<Brand> = products
            .values()
            .filter(|p| p.is_active)
            .map(|p| p.brand.clone())
            .collect();
        brands.sort_by(|a, b| a.as_ref().cmp(b.as_ref()));
        brands.dedup();
        Ok(brands)
    }

    async fn adjust_stock(&self, id: ProductId, delta: i64) -> StoreResult<u32> {
        let mut products = self.products.write().expect("RwLock poisoned");
        let product = products.get_mut(&id).ok_or(StoreError::NotFound)?;
        let next = i64::from(product.stock) + delta;
        if next < 0 {
            return Err(StoreError::InsufficientStock);
        }
        product.stock =
            u32::try_from(next).map_err(|_| StoreError::Backend("stock overflow".to_string()))?;
        product.updated_at = Utc::now();
        Ok(product.stock)
    }

    async fn low_stock_products(&self, threshold: u32, limit: usize) -> StoreResult<Vec<Product>> {
        let products = self.products.read().expect("RwLock poisoned");
        let mut low: Vec<Product> = products
            .values()
            .filter(|p| p.is_active && p.stock <= threshold)
            .cloned()
            .collect();
        low.sort_by_key(|p| p.stock);
        low.truncate(limit);
        Ok(low)
    }

    async fn count_products(&self) -> StoreResult<u64> {
        let products = self.products.read().expect("RwLock poisoned");
        Ok(products.len() as u64)
    }
}

#[async_trait]
impl CartStore for InMemoryStore {
    async fn cart(&self, user: UserId) -> StoreResult<Option<Cart>> {
        let carts = self.carts.read().expect("RwLock poisoned");
        Ok(carts.get(&user).cloned())
    }

    async fn upsert_cart(&self, cart: Cart) -> StoreResult<()> {
        let mut carts = self.carts.write().expect("RwLock poisoned");
        carts.insert(cart.user, cart);
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert_order(&self, order: Order) -> StoreResult<()> {
        let mut orders = self.orders.write().expect("RwLock poisoned");
        orders.insert(order.id, order);
        Ok(())
    }

    async fn order(&self, id: OrderId) -> StoreResult<Option<Order>> {
        let orders = self.orders.read().expect("RwLock poisoned");
        Ok(orders.get(&id).cloned())
    }

    async fn update_order(&self, order: Order) -> StoreResult<()> {
        let mut orders = self.orders.write().expect("RwLock poisoned");
        if !orders.contains_key(&order.id) {
            return Err(StoreError::NotFound);
        }
        orders.insert(order.id, order);
        Ok(())
    }

    async fn orders_for_user(&self, user: UserId) -> StoreResult<Vec<Order>> {
        let orders = self.orders.read().expect("RwLock poisoned");
        let mut mine: Vec<Order> = orders.values().filter(|o| o.user == user).cloned().collect();
        newest_first(&mut mine, |o| o.created_at);
        Ok(mine)
    }

    async fn list_orders(&self, query: &OrderQuery) -> StoreResult<Page<Order>> {
        let orders = self.orders.read().expect("RwLock poisoned");
        let mut matches: Vec<Order> = orders
            .values()
            .filter(|o| query.status.is_none_or(|s| o.order_status == s))
            .filter(|o| query.start_date.is_none_or(|d| o.created_at >= d))
            .filter(|o| query.end_date.is_none_or(|d| o.created_at <= d))
            .cloned()
            .collect();
        newest_first(&mut matches, |o| o.created_at);
        Ok(paginate(
            matches,
            query.page,
            query.limit,
            OrderQuery::DEFAULT_LIMIT,
        ))
    }

    async fn recent_orders(&self, limit: usize) -> StoreResult<Vec<Order>> {
        let orders = self.orders.read().expect("RwLock poisoned");
        let mut all: Vec<Order> = orders.values().cloned().collect();
        newest_first(&mut all, |o| o.created_at);
        all.truncate(limit);
        Ok(all)
    }

    async fn count_orders(&self, status: Option<OrderStatus>) -> StoreResult<u64> {
        let orders = self.orders.read().expect("RwLock poisoned");
        Ok(orders
            .values()
            .filter(|o| status.is_none_or(|s| o.order_status == s))
            .count() as u64)
    }

    async fn total_revenue(&self) -> StoreResult<Money> {
        let orders = self.orders.read().expect("RwLock poisoned");
        let cents: u64 = orders
            .values()
            .filter(|o| o.order_status != OrderStatus::Cancelled)
            .map(|o| o.total_price.to_cents())
            .sum();
        Ok(Money::from_cents(cents))
    }

    async fn monthly_revenue(&self, since: DateTime<Utc>) -> StoreResult<Vec<MonthlyRevenue>> {
        let orders = self.orders.read().expect("RwLock poisoned");
        let mut months: BTreeMap<(i32, u32), u64> = BTreeMap::new();
        for order in orders.values() {
            if order.order_status == OrderStatus::Cancelled || order.created_at < since {
                continue;
            }
            let key = (order.created_at.year(), order.created_at.month());
            *months.entry(key).or_insert(0) += order.total_price.to_cents();
        }
        Ok(months
            .into_iter()
            .map(|((year, month), cents)| MonthlyRevenue {
                year,
                month,
                revenue: Money::from_cents(cents),
            })
            .collect())
    }

    async fn top_products(&self, limit: usize) -> StoreResult<Vec<ProductSales>> {
        let orders = self.orders.read().expect("RwLock poisoned");
        let mut by_product: HashMap<ProductId, (u64, u64)> = HashMap::new();
        for order in orders.values() {
            if order.order_status == OrderStatus::Cancelled {
                continue;
            }
            for item in &order.order_items {
                let entry = by_product.entry(item.product).or_insert((0, 0));
                entry.0 += u64::from(item.quantity.value());
                entry.1 += item.price.to_cents() * u64::from(item.quantity.value());
            }
        }
        let mut sales: Vec<ProductSales> = by_product
            .into_iter()
            .map(|(product, (total_sold, cents))| ProductSales {
                product,
                total_sold,
                revenue: Money::from_cents(cents),
            })
            .collect();
        sales.sort_by(|a, b| b.total_sold.cmp(&a.total_sold));
        sales.truncate(limit);
        Ok(sales)
    }
}

#[async_trait]
impl WishlistStore for InMemoryStore {
    async fn wishlist(&self, user: UserId) -> StoreResult<Option<Wishlist>> {
        let wishlists = self.wishlists.read().expect("RwLock poisoned");
        Ok(wishlists.get(&user).cloned())
    }

    async fn upsert_wishlist(&self, wishlist: Wishlist) -> StoreResult<()> {
        let mut wishlists = self.wishlists.write().expect("RwLock poisoned");
        wishlists.insert(wishlist.user, wishlist);
        Ok(())
    }
}

/// A media host that fabricates URLs and tracks uploads in memory.
#[derive(Debug, Default)]
pub struct FakeMediaHost {
    counter: AtomicU64,
    stored: Mutex<HashSet<String>>,
}

impl FakeMediaHost {
    /// Create an empty fake host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a reference is currently stored.
    pub fn contains(&self, reference: &str) -> bool {
        self.stored
            .lock()
            .map(|s| s.contains(reference))
            .unwrap_or(false)
    }
}

#[async_trait]
impl MediaHost for FakeMediaHost {
    async fn upload(&self, bytes: Vec<u8>) -> Result<HostedImage, MediaError> {
        if bytes.is_empty() {
            return Err(MediaError("empty image upload".to_string()));
        }
        let n = self.counter.fetch_add(1, AtomicOrdering::SeqCst);
        let reference = format!("img-{n}");
        if let Ok(mut stored) = self.stored.lock() {
            stored.insert(reference.clone());
        }
        Ok(HostedImage {
            url: format!("https://media.invalid/{reference}.jpg"),
            reference,
        })
    }

    async fn delete(&self, reference: &str) -> Result<(), MediaError> {
        if let Ok(mut stored) = self.stored.lock() {
            stored.remove(reference);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::cast_possible_truncation)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use storefront::product::ProductDraft;
    use storefront::types::{
        DiscountPercent, EmailAddress, PersonName, ProductDescription, ProductName,
    };

    fn product(name: &str, stock: u32, cents: u64) -> Product {
        Product::create(ProductDraft {
            name: ProductName::try_new(name).unwrap(),
            description: ProductDescription::try_new("A reasonable description").unwrap(),
            price: Money::from_cents(cents),
            discount: DiscountPercent::NONE,
            category: Category::Headphones,
            brand: storefront::types::Brand::try_new("Acme").unwrap(),
            stock,
            specifications: BTreeMap::new(),
            featured: false,
            is_active: true,
        })
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = InMemoryStore::new();
        let user = User::create(
            PersonName::try_new("Asha").unwrap(),
            EmailAddress::try_new("asha@example.com").unwrap(),
            "hash".to_string(),
        );
        store.insert_user(user.clone()).await.unwrap();

        let twin = User::create(
            PersonName::try_new("Other").unwrap(),
            EmailAddress::try_new("ASHA@example.com").unwrap(),
            "hash".to_string(),
        );
        assert_eq!(
            store.insert_user(twin).await,
            Err(StoreError::Duplicate)
        );
    }

    #[tokio::test]
    async fn adjust_stock_rejects_overdraw_without_mutation() {
        let store = InMemoryStore::new();
        let p = product("Noise Buds", 3, 1000);
        let id = p.id;
        store.insert_product(p).await.unwrap();

        assert_eq!(store.adjust_stock(id, -2).await.unwrap(), 1);
        assert_eq!(
            store.adjust_stock(id, -2).await,
            Err(StoreError::InsufficientStock)
        );
        assert_eq!(store.product(id).await.unwrap().unwrap().stock, 1);
    }

    #[tokio::test]
    async fn concurrent_decrements_never_oversell() {
        let store = Arc::new(InMemoryStore::new());
        let p = product("Scarce Widget", 5, 500);
        let id = p.id;
        store.insert_product(p).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move { store.adjust_stock(id, -1).await }));
        }
        let mut won = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                won += 1;
            }
        }
        assert_eq!(won, 5);
        assert_eq!(store.product(id).await.unwrap().unwrap().stock, 0);
    }

    #[tokio::test]
    async fn listing_filters_and_paginates() {
        let store = InMemoryStore::new();
        for i in 0..15 {
            store
                .insert_product(product(&format!("Widget {i}"), 5, 1000 + i))
                .await
                .unwrap();
        }
        let mut inactive = product("Hidden Widget", 5, 1000);
        inactive.is_active = false;
        store.insert_product(inactive).await.unwrap();

        let page = store
            .list_products(&ProductQuery {
                page: 2,
                ..ProductQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 15);
        assert_eq!(page.pages, 2);
        assert_eq!(page.items.len(), 3);
    }

    #[tokio::test]
    async fn price_sort_uses_final_price() {
        let store = InMemoryStore::new();
        let cheap = product("Cheap", 1, 100);
        let dear = product("Dear", 1, 9900);
        store.insert_product(cheap.clone()).await.unwrap();
        store.insert_product(dear.clone()).await.unwrap();

        let page = store
            .list_products(&ProductQuery {
                sort: ProductSort::PriceAsc,
                ..ProductQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(page.items[0].id, cheap.id);
        assert_eq!(page.items[1].id, dear.id);
    }

    #[tokio::test]
    async fn fake_media_host_roundtrip() {
        let host = FakeMediaHost::new();
        let image = host.upload(vec![1, 2, 3]).await.unwrap();
        assert!(host.contains(&image.reference));
        host.delete(&image.reference).await.unwrap();
        assert!(!host.contains(&image.reference));
        // Deleting again is a no-op.
        host.delete(&image.reference).await.unwrap();
    }

    #[tokio::test]
    async fn revenue_excludes_cancelled_orders() {
        use storefront::order::{OrderItem, ShippingAddress};
        use storefront::types::{PhoneNumber, Pincode, Quantity};

        let store = InMemoryStore::new();
        let address = ShippingAddress {
            full_name: PersonName::try_new("Asha Rao").unwrap(),
            phone: PhoneNumber::try_new("9876543210").unwrap(),
            address_line1: "12 MG Road".to_string(),
            address_line2: None,
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            pincode: Pincode::try_new("560001").unwrap(),
        };
        let item = |cents: u64| OrderItem {
            product: ProductId::new(),
            name: "Widget".to_string(),
            quantity: Quantity::new(1).unwrap(),
            price: Money::from_cents(cents),
            image: String::new(),
        };

        let kept = Order::create(
            UserId::new(),
            vec![item(2000)],
            address.clone(),
            Money::ZERO,
            Money::ZERO,
        )
        .unwrap();
        let mut dropped = Order::create(
            UserId::new(),
            vec![item(5000)],
            address,
            Money::ZERO,
            Money::ZERO,
        )
        .unwrap();
        dropped
            .transition_to(OrderStatus::Cancelled, None)
            .unwrap();

        store.insert_order(kept).await.unwrap();
        store.insert_order(dropped).await.unwrap();

        assert_eq!(store.total_revenue().await.unwrap().to_cents(), 2000);
        let months = store
            .monthly_revenue(Utc::now() - chrono::Duration::days(180))
            .await
            .unwrap();
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].revenue.to_cents(), 2000);

        assert_eq!(Money::new(dec!(20.00)).unwrap().to_cents(), 2000);
    }
}
