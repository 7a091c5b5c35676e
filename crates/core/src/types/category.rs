//! Grocery item categories.

use serde::{Deserialize, Serialize};

/// Error returned when a string is not one of the category values.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid item category: {0}")]
pub struct CategoryError(pub String);

/// Closed set of item categories.
///
/// Each category has a stable `value` (stored in the database and submitted
/// by forms) and a human-readable `label`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "item_category", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemCategory {
    Produce,
    Deli,
    Bakery,
    Pantry,
    Frozen,
    #[default]
    Other,
}

impl ItemCategory {
    /// All categories in display order.
    pub const ALL: [Self; 6] = [
        Self::Produce,
        Self::Deli,
        Self::Bakery,
        Self::Pantry,
        Self::Frozen,
        Self::Other,
    ];

    /// Stable value used in forms and storage.
    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::Produce => "PRODUCE",
            Self::Deli => "DELI",
            Self::Bakery => "BAKERY",
            Self::Pantry => "PANTRY",
            Self::Frozen => "FROZEN",
            Self::Other => "OTHER",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Produce => "Produce",
            Self::Deli => "Deli",
            Self::Bakery => "Bakery",
            Self::Pantry => "Pantry",
            Self::Frozen => "Frozen",
            Self::Other => "Other",
        }
    }

    /// `(value, label)` pairs for populating a select control.
    #[must_use]
    pub fn choices() -> [(&'static str, &'static str); 6] {
        Self::ALL.map(|c| (c.value(), c.label()))
    }
}

impl std::fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ItemCategory {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.value() == s)
            .ok_or_else(|| CategoryError(s.to_owned()))
    }
}
