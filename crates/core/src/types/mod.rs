//! Core types for the grocery app.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod id;
pub mod photo_url;
pub mod price;

pub use category::{CategoryError, ItemCategory};
pub use id::*;
pub use photo_url::{PhotoUrl, PhotoUrlError};
pub use price::{Price, PriceError};
