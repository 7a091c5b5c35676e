//! Domain models for the grocery app.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`].

pub mod item;
pub mod session;
pub mod store;
pub mod user;

pub use item::{Item, ItemInput, StoreSummary};
pub use session::{CurrentUser, keys as session_keys};
pub use store::{Store, StoreInput};
pub use user::User;
