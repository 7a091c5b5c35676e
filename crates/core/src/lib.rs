//! Grocery Core - Shared domain types.
//!
//! This crate provides the value types used by the grocery web application:
//! type-safe IDs, validated prices and photo URLs, and the closed set of
//! item categories.
//!
//! # Architecture
//!
//! The core crate contains only types and parsing rules - no I/O, no database
//! access, no HTTP. Database encoding is available behind the `postgres`
//! feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, photo URLs and categories

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
