//! Core types for Rocket Shoes.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod cart;
pub mod id;
pub mod product;

pub use cart::{Cart, CartItem, CartRejection};
pub use id::*;
pub use product::{Product, Stock};
