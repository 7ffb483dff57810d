//! `Storefront` - core domain and services for an electronics shop
//!
//! The crate is split into a validated domain model ("parse, don't
//! validate": raw input becomes typed values at the boundary), a set of
//! document-store traits that backends implement, and the services that
//! carry the business rules - catalog, cart, wishlist, checkout and the
//! order state machine, accounts and the admin dashboard.
//!
//! Persistence, mail delivery and image hosting are collaborators behind
//! traits ([`store::Store`], [`notify::Mailer`], [`media::MediaHost`]); the
//! `storefront-memory` crate provides the in-memory reference backend and
//! `storefront-api` the HTTP surface.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod accounts;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod dashboard;
pub mod errors;
pub mod media;
pub mod notify;
pub mod order;
pub mod product;
pub mod store;
pub mod types;
pub mod user;
pub mod wishlist;

pub use errors::{ServiceError, ServiceResult, StoreError, StoreResult};
