//! Shared application state handed to every handler.

use std::sync::Arc;

use storefront::accounts::AccountService;
use storefront::auth::TokenIssuer;
use storefront::cart::CartService;
use storefront::catalog::CatalogService;
use storefront::checkout::OrderService;
use storefront::dashboard::DashboardService;
use storefront::media::MediaHost;
use storefront::notify::Mailer;
use storefront::store::Store;

/// Everything the handlers need: the store, the collaborators and the
/// services wired over them.
#[derive(Clone)]
pub struct AppState {
    /// The document store, for extractors that load the current user.
    pub store: Arc<dyn Store>,
    /// Bearer-token issuer and verifier.
    pub tokens: TokenIssuer,
    /// Account operations.
    pub accounts: AccountService,
    /// Catalog operations.
    pub catalog: CatalogService,
    /// Cart operations.
    pub carts: CartService,
    /// Wishlist operations.
    pub wishlists: storefront::wishlist::WishlistService,
    /// Checkout and order lifecycle.
    pub orders: OrderService,
    /// Admin dashboard assembly.
    pub dashboard: DashboardService,
}

impl AppState {
    /// Wire the services over a store and its collaborators.
    pub fn new(
        store: Arc<dyn Store>,
        mailer: Arc<dyn Mailer>,
        media: Arc<dyn MediaHost>,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            accounts: AccountService::new(Arc::clone(&store), tokens.clone()),
            catalog: CatalogService::new(Arc::clone(&store), media),
            carts: CartService::new(Arc::clone(&store)),
            wishlists: storefront::wishlist::WishlistService::new(Arc::clone(&store)),
            orders: OrderService::new(Arc::clone(&store), mailer),
            dashboard: DashboardService::new(Arc::clone(&store)),
            tokens,
            store,
        }
    }
}
