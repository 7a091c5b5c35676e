//! Item create/edit form.

use serde::Deserialize;

use grocery_core::{ItemCategory, PhotoUrl, Price, StoreId};

use super::{FormErrors, INVALID_CHOICE_MESSAGE, Rule};
use crate::middleware::CsrfProtected;
use crate::models::{Item, ItemInput, Store};

const NAME: &[Rule<'static>] = &[Rule::Required, Rule::Length { min: 3, max: 80 }];
const PRICE: &[Rule<'static>] = &[Rule::Required, Rule::PositiveDecimal];
const PHOTO_URL: &[Rule<'static>] = &[Rule::Required, Rule::Url];

/// Fields for adding or updating an item.
///
/// `store_id` must name one of the stores passed to [`ItemForm::validate`];
/// the same list populates the store select control.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ItemForm {
    pub csrf_token: String,
    pub name: String,
    pub price: String,
    pub category: String,
    pub photo_url: String,
    pub store_id: String,
}

impl Default for ItemForm {
    fn default() -> Self {
        Self {
            csrf_token: String::new(),
            name: String::new(),
            price: String::new(),
            category: ItemCategory::default().value().to_owned(),
            photo_url: String::new(),
            store_id: String::new(),
        }
    }
}

impl ItemForm {
    /// Pre-populate the form from an existing item.
    #[must_use]
    pub fn from_item(item: &Item) -> Self {
        Self {
            csrf_token: String::new(),
            name: item.name.clone(),
            price: item.price.to_input_string(),
            category: item.category.value().to_owned(),
            photo_url: item.photo_url.to_string(),
            store_id: item.store.id.to_string(),
        }
    }

    /// Validate every field against the current list of stores.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages if any field fails.
    pub fn validate(&self, stores: &[Store]) -> Result<ItemInput, FormErrors> {
        let categories = ItemCategory::ALL.map(ItemCategory::value);
        let store_ids: Vec<String> = stores.iter().map(|s| s.id.to_string()).collect();
        let store_choices: Vec<&str> = store_ids.iter().map(String::as_str).collect();

        let mut errors = FormErrors::new();
        errors.check("name", &self.name, NAME);
        errors.check("price", &self.price, PRICE);
        errors.check(
            "category",
            &self.category,
            &[Rule::Required, Rule::Choice(&categories)],
        );
        errors.check("photo_url", &self.photo_url, PHOTO_URL);
        errors.check(
            "store_id",
            &self.store_id,
            &[Rule::Required, Rule::Choice(&store_choices)],
        );

        if !errors.is_empty() {
            return Err(errors);
        }

        // Already accepted by the rules above.
        let parsed = (
            Price::parse(&self.price),
            self.category.trim().parse::<ItemCategory>(),
            PhotoUrl::parse(&self.photo_url),
            self.store_id.parse::<StoreId>(),
        );
        match parsed {
            (Ok(price), Ok(category), Ok(photo_url), Ok(store_id)) => Ok(ItemInput {
                name: self.name.trim().to_owned(),
                price,
                category,
                photo_url,
                store_id,
            }),
            _ => {
                errors.insert("store_id", INVALID_CHOICE_MESSAGE);
                Err(errors)
            }
        }
    }

    /// Whether `store` is the currently selected store.
    #[must_use]
    pub fn is_store_selected(&self, store: &Store) -> bool {
        self.store_id.trim() == store.id.to_string()
    }

    /// Whether `value` is the currently selected category.
    #[must_use]
    pub fn is_category_selected(&self, value: &str) -> bool {
        self.category.trim() == value
    }
}

impl CsrfProtected for ItemForm {
    fn csrf_token(&self) -> &str {
        &self.csrf_token
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use grocery_core::{ItemId, UserId};

    use crate::models::StoreSummary;

    use super::super::{INVALID_URL_MESSAGE, NOT_DECIMAL_MESSAGE, NOT_POSITIVE_MESSAGE};
    use super::*;

    fn stores() -> Vec<Store> {
        vec![Store {
            id: StoreId::new(4),
            title: "Main Market".to_owned(),
            address: "123 Main Street".to_owned(),
            created_by: UserId::new(1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }]
    }

    fn valid() -> ItemForm {
        ItemForm {
            csrf_token: String::new(),
            name: "Apple".to_owned(),
            price: "0.99".to_owned(),
            category: "PRODUCE".to_owned(),
            photo_url: "https://example.com/apple.jpg".to_owned(),
            store_id: "4".to_owned(),
        }
    }

    #[test]
    fn test_valid_item() {
        let input = valid().validate(&stores()).unwrap();
        assert_eq!(input.name, "Apple");
        assert_eq!(input.price.to_string(), "0.99");
        assert_eq!(input.category, ItemCategory::Produce);
        assert_eq!(input.store_id, StoreId::new(4));
    }

    #[test]
    fn test_rejects_bad_price() {
        let mut form = valid();
        form.price = "0".to_owned();
        let errors = form.validate(&stores()).unwrap_err();
        assert_eq!(errors.get("price"), Some(NOT_POSITIVE_MESSAGE));

        form.price = "-1".to_owned();
        let errors = form.validate(&stores()).unwrap_err();
        assert_eq!(errors.get("price"), Some(NOT_POSITIVE_MESSAGE));

        form.price = "a buck".to_owned();
        let errors = form.validate(&stores()).unwrap_err();
        assert_eq!(errors.get("price"), Some(NOT_DECIMAL_MESSAGE));
    }

    #[test]
    fn test_rejects_malformed_url() {
        let mut form = valid();
        form.photo_url = "not-a-url".to_owned();
        let errors = form.validate(&stores()).unwrap_err();
        assert_eq!(errors.get("photo_url"), Some(INVALID_URL_MESSAGE));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_rejects_unknown_category() {
        let mut form = valid();
        form.category = "MEAT".to_owned();
        let errors = form.validate(&stores()).unwrap_err();
        assert_eq!(errors.get("category"), Some(INVALID_CHOICE_MESSAGE));
    }

    #[test]
    fn test_rejects_store_not_in_list() {
        let mut form = valid();
        form.store_id = "99".to_owned();
        let errors = form.validate(&stores()).unwrap_err();
        assert_eq!(errors.get("store_id"), Some(INVALID_CHOICE_MESSAGE));

        let errors = valid().validate(&[]).unwrap_err();
        assert_eq!(errors.get("store_id"), Some(INVALID_CHOICE_MESSAGE));
    }

    #[test]
    fn test_default_category_is_other() {
        assert_eq!(ItemForm::default().category, "OTHER");
        assert!(ItemForm::default().is_category_selected("OTHER"));
    }

    #[test]
    fn test_selection_helpers() {
        let form = valid();
        assert!(form.is_store_selected(&stores()[0]));
        assert!(form.is_category_selected("PRODUCE"));
        assert!(!form.is_category_selected("DELI"));
    }

    #[test]
    fn test_from_item_round_trips_price() {
        for raw in ["1.999", "0.004"] {
            let input = ItemForm {
                price: raw.to_owned(),
                ..valid()
            }
            .validate(&stores())
            .unwrap();
            let item = Item {
                id: ItemId::new(1),
                name: input.name,
                price: input.price,
                category: input.category,
                photo_url: input.photo_url,
                store: StoreSummary {
                    id: input.store_id,
                    title: "Main Market".to_owned(),
                },
                created_by: UserId::new(1),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };

            let form = ItemForm::from_item(&item);
            assert_eq!(form.price, raw);
            assert_eq!(form.validate(&stores()).unwrap().price, item.price);
        }
    }
}
