//! Binary entry point: wires the in-memory backend, seeds the admin account
//! and serves the API.

#![forbid(unsafe_code)]

use std::sync::Arc;

use anyhow::Context;
use storefront::auth::{hash_password, TokenIssuer};
use storefront::notify::LogMailer;
use storefront::store::Store;
use storefront::types::{EmailAddress, PersonName};
use storefront::user::{Role, User};
use storefront_api::{create_app, AppState, Config};
use storefront_memory::{FakeMediaHost, InMemoryStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env().context("reading configuration")?;

    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
    seed_admin(&store).await.context("seeding admin account")?;

    let state = AppState::new(
        Arc::clone(&store),
        Arc::new(LogMailer),
        Arc::new(FakeMediaHost::new()),
        TokenIssuer::new(config.jwt_secret.clone(), config.token_ttl_hours),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;
    Ok(())
}

/// Create the back-office account from `ADMIN_EMAIL` / `ADMIN_PASSWORD` if
/// both are set and the email is not already registered.
async fn seed_admin(store: &Arc<dyn Store>) -> anyhow::Result<()> {
    let (Ok(email), Ok(password)) = (
        std::env::var("ADMIN_EMAIL"),
        std::env::var("ADMIN_PASSWORD"),
    ) else {
        return Ok(());
    };
    let email = EmailAddress::try_new(email).context("ADMIN_EMAIL")?;
    if store.user_by_email(&email).await?.is_some() {
        return Ok(());
    }
    let mut admin = User::create(
        PersonName::try_new("Administrator").context("admin name")?,
        email,
        hash_password(&password)?,
    );
    admin.role = Role::Admin;
    store.insert_user(admin).await?;
    tracing::info!("admin account seeded");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
