//! Integration tests driving the router with `tower::ServiceExt::oneshot`.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use storefront::auth::TokenIssuer;
use storefront::notify::RecordingMailer;
use storefront::product::{Category, Product, ProductDraft};
use storefront::store::Store;
use storefront::types::{
    Brand, DiscountPercent, EmailAddress, Money, PersonName, ProductDescription, ProductName,
};
use storefront::user::{Role, User};
use storefront_api::{create_app, AppState};
use storefront_memory::{FakeMediaHost, InMemoryStore};
use tower::ServiceExt;

struct TestApp {
    app: Router,
    store: Arc<dyn Store>,
    tokens: TokenIssuer,
}

impl TestApp {
    fn new() -> Self {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let tokens = TokenIssuer::new("test-secret", 1);
        let state = AppState::new(
            Arc::clone(&store),
            Arc::new(RecordingMailer::new()),
            Arc::new(FakeMediaHost::new()),
            tokens.clone(),
        );
        Self {
            app: create_app(state),
            store,
            tokens,
        }
    }

    async fn user(&self, email: &str, role: Role) -> (User, String) {
        let mut user = User::create(
            PersonName::try_new("Asha").unwrap(),
            EmailAddress::try_new(email).unwrap(),
            "not-a-real-hash".to_string(),
        );
        user.role = role;
        self.store.insert_user(user.clone()).await.unwrap();
        let token = self.tokens.issue(user.id, user.role).unwrap();
        (user, token)
    }

    async fn product(&self, name: &str, cents: u64, stock: u32) -> Product {
        let product = Product::create(ProductDraft {
            name: ProductName::try_new(name).unwrap(),
            description: ProductDescription::try_new("A perfectly fine description").unwrap(),
            price: Money::from_cents(cents),
            discount: DiscountPercent::NONE,
            category: Category::Headphones,
            brand: Brand::try_new("Acme").unwrap(),
            stock,
            specifications: BTreeMap::new(),
            featured: true,
            is_active: true,
        });
        self.store.insert_product(product.clone()).await.unwrap();
        product
    }

    async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

fn shipping_address() -> Value {
    json!({
        "full_name": "Asha Rao",
        "phone": "9876543210",
        "address_line1": "12 MG Road",
        "city": "Bengaluru",
        "state": "Karnataka",
        "pincode": "560001"
    })
}

#[tokio::test]
async fn register_login_and_profile_roundtrip() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Asha",
                "email": "Asha@Example.com",
                "password": "hunter42"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["user"]["email"], "asha@example.com");
    assert!(body["user"]["password_hash"].is_null());

    let (status, body) = app
        .request(Method::GET, "/api/auth/profile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "user");

    // Weak password is a 400 with a readable message.
    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Bea",
                "email": "bea@example.com",
                "password": "short"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Password must be at least 6 characters");

    // Wrong credentials are a 401.
    let (status, _) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "asha@example.com", "password": "wrong-pass1" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn checkout_flow_over_http() {
    let app = TestApp::new();
    let (_, token) = app.user("asha@example.com", Role::User).await;
    let product = app.product("Noise Buds", 1000, 5).await;

    let (status, cart) = app
        .request(
            Method::POST,
            "/api/cart",
            Some(&token),
            Some(json!({ "product_id": product.id, "quantity": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["total_items"], 2);
    assert_eq!(cart["total_price"], "20.00");

    let (status, order) = app
        .request(
            Method::POST,
            "/api/orders",
            Some(&token),
            Some(json!({
                "shipping_address": shipping_address(),
                "tax_price": "1.00",
                "shipping_price": "5.00"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["order_status"], "Processing");
    assert_eq!(order["total_price"], "26.00");

    // Cart is empty afterwards; stock went down.
    let (_, cart) = app.request(Method::GET, "/api/cart", Some(&token), None).await;
    assert_eq!(cart["total_items"], 0);
    assert_eq!(
        app.store.product(product.id).await.unwrap().unwrap().stock,
        3
    );

    let (status, orders) = app
        .request(Method::GET, "/api/orders/myorders", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn quantity_outside_bounds_is_rejected_at_the_boundary() {
    let app = TestApp::new();
    let (_, token) = app.user("asha@example.com", Role::User).await;
    let product = app.product("Noise Buds", 1000, 50).await;

    for quantity in [0, 11] {
        let (status, _) = app
            .request(
                Method::POST,
                "/api/cart",
                Some(&token),
                Some(json!({ "product_id": product.id, "quantity": quantity })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "quantity {quantity}");
    }
}

#[tokio::test]
async fn malformed_json_bodies_get_the_standard_error_shape() {
    let app = TestApp::new();
    let (_, token) = app.user("asha@example.com", Role::User).await;

    let mut address = shipping_address();
    address["phone"] = json!("12345");
    let (status, body) = app
        .request(
            Method::POST,
            "/api/orders",
            Some(&token),
            Some(json!({ "shipping_address": address })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string(), "body: {body}");

    // Bodies that miss required fields take the same shape.
    let (status, body) = app
        .request(Method::POST, "/api/cart", Some(&token), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string(), "body: {body}");
}

#[tokio::test]
async fn auth_is_required_and_admin_routes_are_guarded() {
    let app = TestApp::new();
    let (_, user_token) = app.user("asha@example.com", Role::User).await;

    let (status, body) = app.request(Method::GET, "/api/cart", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authenticated");

    let (status, _) = app
        .request(Method::GET, "/api/cart", Some("garbage.token.here"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .request(Method::GET, "/api/admin/stats", Some(&user_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized");
}

#[tokio::test]
async fn admin_manages_products_and_orders() {
    let app = TestApp::new();
    let (_, admin_token) = app.user("admin@example.com", Role::Admin).await;
    let (_, user_token) = app.user("asha@example.com", Role::User).await;

    let (status, created) = app
        .request(
            Method::POST,
            "/api/products",
            Some(&admin_token),
            Some(json!({
                "name": "Pixel Buds",
                "description": "Wireless earbuds with long battery life",
                "price": "49.99",
                "discount": 10,
                "category": "Headphones",
                "brand": "Google",
                "stock": 10
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["final_price"], "44.99");
    let product_id = created["id"].as_str().unwrap().to_string();

    // Non-admin cannot create products.
    let (status, _) = app
        .request(
            Method::POST,
            "/api/products",
            Some(&user_token),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Place an order as the user, then walk it through the machine.
    app.request(
        Method::POST,
        "/api/cart",
        Some(&user_token),
        Some(json!({ "product_id": product_id, "quantity": 1 })),
    )
    .await;
    let (_, order) = app
        .request(
            Method::POST,
            "/api/orders",
            Some(&user_token),
            Some(json!({ "shipping_address": shipping_address() })),
        )
        .await;
    let order_id = order["id"].as_str().unwrap().to_string();

    // Processing -> Delivered is illegal.
    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/api/orders/{order_id}/status"),
            Some(&admin_token),
            Some(json!({ "status": "Delivered" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Cannot move order from Processing to Delivered"
    );

    let (status, shipped) = app
        .request(
            Method::PUT,
            &format!("/api/orders/{order_id}/status"),
            Some(&admin_token),
            Some(json!({ "status": "Shipped", "tracking_number": "TRK42" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shipped["tracking_number"], "TRK42");

    // The order listing joins the buyer.
    let (status, page) = app
        .request(Method::GET, "/api/orders?status=Shipped", Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["buyer"]["email"], "asha@example.com");

    // The stats endpoint reflects the sale.
    let (status, stats) = app
        .request(Method::GET, "/api/admin/stats", Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_orders"], 1);
    assert_eq!(stats["total_revenue"], "44.99");
}

#[tokio::test]
async fn public_catalog_hides_inactive_products() {
    let app = TestApp::new();
    let visible = app.product("Noise Buds", 1000, 5).await;
    let mut hidden = app.product("Old Widget", 500, 0).await;
    hidden.is_active = false;
    app.store.update_product(hidden.clone()).await.unwrap();

    let (status, page) = app.request(Method::GET, "/api/products", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["id"], visible.id.to_string());

    let (status, _) = app
        .request(
            Method::GET,
            &format!("/api/products/{}", hidden.id),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, featured) = app
        .request(Method::GET, "/api/products/featured", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(featured.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_order_is_a_404_and_strangers_get_403() {
    let app = TestApp::new();
    let (_, owner_token) = app.user("owner@example.com", Role::User).await;
    let (_, stranger_token) = app.user("stranger@example.com", Role::User).await;
    let product = app.product("Noise Buds", 1000, 5).await;

    let (status, body) = app
        .request(
            Method::GET,
            &format!("/api/orders/{}", uuid::Uuid::now_v7()),
            Some(&owner_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Order not found");

    app.request(
        Method::POST,
        "/api/cart",
        Some(&owner_token),
        Some(json!({ "product_id": product.id, "quantity": 1 })),
    )
    .await;
    let (_, order) = app
        .request(
            Method::POST,
            "/api/orders",
            Some(&owner_token),
            Some(json!({ "shipping_address": shipping_address() })),
        )
        .await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .request(
            Method::GET,
            &format!("/api/orders/{order_id}"),
            Some(&stranger_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(
            Method::PUT,
            &format!("/api/orders/{order_id}/cancel"),
            Some(&stranger_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn reviews_are_limited_to_one_per_user() {
    let app = TestApp::new();
    let (_, token) = app.user("asha@example.com", Role::User).await;
    let product = app.product("Noise Buds", 1000, 5).await;

    let review = json!({ "rating": 4, "comment": "Excellent sound quality" });
    let (status, _) = app
        .request(
            Method::POST,
            &format!("/api/products/{}/reviews", product.id),
            Some(&token),
            Some(review.clone()),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(
            Method::POST,
            &format!("/api/products/{}/reviews", product.id),
            Some(&token),
            Some(review),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Product already reviewed");

    let (_, fetched) = app
        .request(
            Method::GET,
            &format!("/api/products/{}", product.id),
            None,
            None,
        )
        .await;
    assert_eq!(fetched["num_reviews"], 1);
}

#[tokio::test]
async fn wishlist_roundtrip_over_http() {
    let app = TestApp::new();
    let (_, token) = app.user("asha@example.com", Role::User).await;
    let product = app.product("Noise Buds", 1000, 5).await;

    let (status, entries) = app
        .request(
            Method::POST,
            &format!("/api/wishlist/{}", product.id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entries.as_array().unwrap().len(), 1);

    let (status, body) = app
        .request(
            Method::POST,
            &format!("/api/wishlist/{}", product.id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Product already in wishlist");

    let (status, entries) = app
        .request(
            Method::DELETE,
            &format!("/api/wishlist/{}", product.id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(entries.as_array().unwrap().is_empty());
}
