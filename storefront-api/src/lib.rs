//! HTTP surface for the storefront
//!
//! Assembles the axum router over [`AppState`]. Authentication is a bearer
//! token; `CurrentUser` and `AdminUser` extractors load the account on every
//! request. Failures map to `{ "message": ... }` JSON bodies.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use axum::Router;

pub use config::Config;
pub use state::AppState;

/// Build the full application router.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .nest("/api/auth", routes::auth::router())
        .nest("/api/products", routes::products::router())
        .nest("/api/cart", routes::cart::router())
        .nest("/api/wishlist", routes::wishlist::router())
        .nest("/api/orders", routes::orders::router())
        .nest("/api/admin", routes::admin::router())
        .with_state(state)
}
