//! Business logic services.
//!
//! # Services
//!
//! - `auth` - User registration and password login

pub mod auth;
