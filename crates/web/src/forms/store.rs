//! Store create/edit form.

use serde::Deserialize;

use super::{FormErrors, Rule};
use crate::middleware::CsrfProtected;
use crate::models::{Store, StoreInput};

const TITLE: &[Rule<'static>] = &[Rule::Required, Rule::Length { min: 3, max: 80 }];
const ADDRESS: &[Rule<'static>] = &[Rule::Required, Rule::Length { min: 10, max: 120 }];

/// Fields for adding or updating a store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreForm {
    pub csrf_token: String,
    pub title: String,
    pub address: String,
}

impl StoreForm {
    /// Pre-populate the form from an existing store.
    #[must_use]
    pub fn from_store(store: &Store) -> Self {
        Self {
            csrf_token: String::new(),
            title: store.title.clone(),
            address: store.address.clone(),
        }
    }

    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages if any field fails.
    pub fn validate(&self) -> Result<StoreInput, FormErrors> {
        let mut errors = FormErrors::new();
        errors.check("title", &self.title, TITLE);
        errors.check("address", &self.address, ADDRESS);

        errors.into_result(|| StoreInput {
            title: self.title.trim().to_owned(),
            address: self.address.trim().to_owned(),
        })
    }
}

impl CsrfProtected for StoreForm {
    fn csrf_token(&self) -> &str {
        &self.csrf_token
    }
}
