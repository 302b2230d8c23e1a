//! Rocket Shoes Core - Shared cart and catalog types.
//!
//! This crate provides the types used across all Rocket Shoes components:
//! - `storefront` - Cart store, catalog client, persistence and HTTP surface
//! - `cli` - Command-line cart tool
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O, no
//! storage access, no HTTP clients. Every cart transition takes the current
//! [`Cart`] by reference and returns a brand new snapshot, so the caller decides
//! when (and whether) the new state becomes visible.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, catalog records and the cart itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
