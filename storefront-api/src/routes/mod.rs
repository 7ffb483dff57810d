//! Route modules, one per surface.

// Handlers must take extractors by value to satisfy axum's Handler trait.
#![allow(clippy::needless_pass_by_value)]

pub mod admin;
pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;
pub mod wishlist;
