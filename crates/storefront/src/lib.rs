//! Rocket Shoes Storefront library.
//!
//! This crate provides the cart store and its collaborators as a library,
//! allowing them to be tested and reused by the CLI.
//!
//! # Modules
//!
//! - [`cart`] - Cart store: validated, persisted, observable cart mutations
//! - [`catalog`] - Catalog/stock API client
//! - [`storage`] - Local storage and cart persistence
//! - [`routes`] - JSON HTTP API over the cart store
//! - [`config`] - Environment configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod storage;
