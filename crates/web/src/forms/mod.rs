//! HTML form definitions and validation.
//!
//! Each form deserializes every field as a raw string so a rejected
//! submission can be re-rendered exactly as typed. Validation runs each
//! field's [`Rule`]s in order, stops at the field's first failure, and
//! collects one message per failing field into [`FormErrors`]. A form either
//! validates completely into a domain input or yields the errors.

mod auth;
mod item;
mod store;

use std::collections::BTreeMap;

use serde::Deserialize;

use grocery_core::{PhotoUrl, Price, PriceError};

use crate::middleware::CsrfProtected;

pub use auth::{Credentials, LoginForm, SignUpForm};
pub use item::ItemForm;
pub use store::StoreForm;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_URL_MESSAGE: &str = "Invalid URL.";
pub const NOT_DECIMAL_MESSAGE: &str = "Not a valid decimal value.";
pub const NOT_POSITIVE_MESSAGE: &str = "Price must be greater than zero.";
pub const INVALID_CHOICE_MESSAGE: &str = "Not a valid choice.";
pub const USERNAME_TAKEN_MESSAGE: &str = "That username is taken. Please choose a different one.";

/// A submission with no fields besides the anti-forgery token.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ActionForm {
    pub csrf_token: String,
}

impl CsrfProtected for ActionForm {
    fn csrf_token(&self) -> &str {
        &self.csrf_token
    }
}

/// A single field constraint.
#[derive(Debug, Clone, Copy)]
pub enum Rule<'a> {
    /// Value must be non-blank after trimming.
    Required,
    /// Trimmed value length, in characters, must lie in `min..=max`.
    Length { min: usize, max: usize },
    /// Value must be a well-formed http(s) URL.
    Url,
    /// Value must be a decimal number greater than zero.
    PositiveDecimal,
    /// Trimmed value must equal one of the given choices.
    Choice(&'a [&'a str]),
}

impl Rule<'_> {
    /// Check a raw value, returning the failure message.
    fn check(&self, value: &str) -> Result<(), String> {
        let trimmed = value.trim();
        match *self {
            Self::Required if trimmed.is_empty() => Err(REQUIRED_MESSAGE.to_owned()),
            Self::Length { min, max } => {
                let len = trimmed.chars().count();
                if (min..=max).contains(&len) {
                    Ok(())
                } else {
                    Err(format!(
                        "Field must be between {min} and {max} characters long."
                    ))
                }
            }
            Self::Url => PhotoUrl::parse(trimmed)
                .map(drop)
                .map_err(|_| INVALID_URL_MESSAGE.to_owned()),
            Self::PositiveDecimal => Price::parse(trimmed).map(drop).map_err(|e| match e {
                PriceError::NotDecimal => NOT_DECIMAL_MESSAGE.to_owned(),
                PriceError::NotPositive => NOT_POSITIVE_MESSAGE.to_owned(),
            }),
            Self::Choice(choices) if !choices.contains(&trimmed) => {
                Err(INVALID_CHOICE_MESSAGE.to_owned())
            }
            Self::Required | Self::Choice(_) => Ok(()),
        }
    }
}

/// Per-field validation messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<&'static str, String>);

impl FormErrors {
    /// Create an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `rules` against `value` in order, recording the first failure.
    ///
    /// Returns `true` if the field passed every rule.
    pub fn check(&mut self, field: &'static str, value: &str, rules: &[Rule<'_>]) -> bool {
        match rules.iter().try_for_each(|rule| rule.check(value)) {
            Ok(()) => true,
            Err(message) => {
                self.0.insert(field, message);
                false
            }
        }
    }

    /// Record a failure found outside the declarative rules.
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// The message for a field, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Fields that failed, in name order.
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    /// `Ok(value)` when no field failed, otherwise the collected errors.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field failed.
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}
