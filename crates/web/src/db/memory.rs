//! In-process repository implementation.
//!
//! Selected with `GROCERY_DATABASE_URL=memory://` and used by the test
//! suites. Enforces the same constraints as the `PostgreSQL` schema: unique
//! usernames, and every store, item and list entry must reference rows that
//! exist. Ids are assigned sequentially from 1.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use grocery_core::{ItemId, StoreId, UserId};

use super::{
    Database, ItemRepository, RepositoryError, ShoppingListRepository, StoreRepository,
    UserRepository,
};
use crate::models::{Item, ItemInput, Store, StoreInput, StoreSummary, User};

/// Thread-safe in-memory tables.
#[derive(Default)]
pub struct MemoryDatabase {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<UserRecord>,
    stores: Vec<Store>,
    items: Vec<ItemRecord>,
    shopping_list: Vec<(UserId, ItemId)>,
}

struct UserRecord {
    user: User,
    password_hash: String,
}

/// Items keep a store reference, not a copy of its title, so renaming a
/// store shows up on every item.
#[derive(Clone)]
struct ItemRecord {
    id: ItemId,
    input: ItemInput,
    created_by: UserId,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

impl MemoryDatabase {
    /// Create an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Next sequential id for a table holding `len` rows.
fn next_id(len: usize) -> Result<i32, RepositoryError> {
    i32::try_from(len + 1)
        .map_err(|_| RepositoryError::DataCorruption("id space exhausted".to_owned()))
}

impl Tables {
    fn user_exists(&self, id: UserId) -> bool {
        self.users.iter().any(|r| r.user.id == id)
    }

    fn store(&self, id: StoreId) -> Option<&Store> {
        self.stores.iter().find(|s| s.id == id)
    }

    fn item(&self, id: ItemId) -> Option<&ItemRecord> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Join an item record with its store.
    fn hydrate(&self, record: &ItemRecord) -> Result<Item, RepositoryError> {
        let store = self.store(record.input.store_id).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("item {} has no store", record.id))
        })?;

        Ok(Item {
            id: record.id,
            name: record.input.name.clone(),
            price: record.input.price,
            category: record.input.category,
            photo_url: record.input.photo_url.clone(),
            store: StoreSummary {
                id: store.id,
                title: store.title.clone(),
            },
            created_by: record.created_by,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

#[async_trait]
impl StoreRepository for MemoryDatabase {
    async fn list_stores(&self) -> Result<Vec<Store>, RepositoryError> {
        Ok(self.tables.lock().await.stores.clone())
    }

    async fn get_store(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        Ok(self.tables.lock().await.store(id).cloned())
    }

    async fn create_store(
        &self,
        input: &StoreInput,
        created_by: UserId,
    ) -> Result<Store, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if !tables.user_exists(created_by) {
            return Err(RepositoryError::NotFound);
        }

        let now = Utc::now();
        let store = Store {
            id: StoreId::new(next_id(tables.stores.len())?),
            title: input.title.clone(),
            address: input.address.clone(),
            created_by,
            created_at: now,
            updated_at: now,
        };
        tables.stores.push(store.clone());
        Ok(store)
    }

    async fn update_store(
        &self,
        id: StoreId,
        input: &StoreInput,
    ) -> Result<Store, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let store = tables
            .stores
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(RepositoryError::NotFound)?;

        store.title.clone_from(&input.title);
        store.address.clone_from(&input.address);
        store.updated_at = Utc::now();
        Ok(store.clone())
    }
}

#[async_trait]
impl ItemRepository for MemoryDatabase {
    async fn list_items_for_store(&self, store_id: StoreId) -> Result<Vec<Item>, RepositoryError> {
        let tables = self.tables.lock().await;
        tables
            .items
            .iter()
            .filter(|i| i.input.store_id == store_id)
            .map(|i| tables.hydrate(i))
            .collect()
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        let tables = self.tables.lock().await;
        tables.item(id).map(|i| tables.hydrate(i)).transpose()
    }

    async fn create_item(
        &self,
        input: &ItemInput,
        created_by: UserId,
    ) -> Result<Item, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if !tables.user_exists(created_by) || tables.store(input.store_id).is_none() {
            return Err(RepositoryError::NotFound);
        }

        let now = Utc::now();
        let record = ItemRecord {
            id: ItemId::new(next_id(tables.items.len())?),
            input: input.clone(),
            created_by,
            created_at: now,
            updated_at: now,
        };
        let item = tables.hydrate(&record)?;
        tables.items.push(record);
        Ok(item)
    }

    async fn update_item(&self, id: ItemId, input: &ItemInput) -> Result<Item, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.store(input.store_id).is_none() {
            return Err(RepositoryError::NotFound);
        }

        let record = tables
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(RepositoryError::NotFound)?;
        record.input = input.clone();
        record.updated_at = Utc::now();
        let record = record.clone();

        tables.hydrate(&record)
    }
}

#[async_trait]
impl UserRepository for MemoryDatabase {
    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|r| r.user.id == id)
            .map(|r| r.user.clone()))
    }

    async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|r| r.user.username == username)
            .map(|r| r.user.clone()))
    }

    async fn get_password_hash(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|r| r.user.username == username)
            .map(|r| (r.user.clone(), r.password_hash.clone())))
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|r| r.user.username == username) {
            return Err(RepositoryError::Conflict(
                "username already exists".to_owned(),
            ));
        }

        let user = User {
            id: UserId::new(next_id(tables.users.len())?),
            username: username.to_owned(),
            created_at: Utc::now(),
        };
        tables.users.push(UserRecord {
            user: user.clone(),
            password_hash: password_hash.to_owned(),
        });
        Ok(user)
    }
}

#[async_trait]
impl ShoppingListRepository for MemoryDatabase {
    async fn add_to_shopping_list(
        &self,
        user: UserId,
        item: ItemId,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        if !tables.user_exists(user) || tables.item(item).is_none() {
            return Err(RepositoryError::NotFound);
        }
        tables.shopping_list.push((user, item));
        Ok(())
    }

    async fn shopping_list(&self, user: UserId) -> Result<Vec<Item>, RepositoryError> {
        let tables = self.tables.lock().await;
        tables
            .shopping_list
            .iter()
            .filter(|(owner, _)| *owner == user)
            .filter_map(|(_, item)| tables.item(*item))
            .map(|record| tables.hydrate(record))
            .collect()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use grocery_core::{ItemCategory, PhotoUrl, Price};

    use super::*;

    async fn seeded() -> (MemoryDatabase, User, Store) {
        let db = MemoryDatabase::new();
        let user = db.create_user("alice", "digest").await.unwrap();
        let store = db
            .create_store(
                &StoreInput {
                    title: "Main Market".to_owned(),
                    address: "123 Main Street".to_owned(),
                },
                user.id,
            )
            .await
            .unwrap();
        (db, user, store)
    }

    fn apple(store_id: StoreId) -> ItemInput {
        ItemInput {
            name: "Apple".to_owned(),
            price: Price::parse("0.99").unwrap(),
            category: ItemCategory::Produce,
            photo_url: PhotoUrl::parse("https://example.com/apple.jpg").unwrap(),
            store_id,
        }
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_username() {
        let (db, _, _) = seeded().await;
        let err = db.create_user("alice", "other").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert!(db.create_user("Alice", "other").await.is_ok());
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let (db, user, store) = seeded().await;
        assert_eq!(user.id, UserId::new(1));
        assert_eq!(store.id, StoreId::new(1));
        let second = db
            .create_store(
                &StoreInput {
                    title: "Corner Shop".to_owned(),
                    address: "9 Corner Avenue".to_owned(),
                },
                user.id,
            )
            .await
            .unwrap();
        assert_eq!(second.id, StoreId::new(2));
    }

    #[tokio::test]
    async fn test_create_store_requires_existing_user() {
        let db = MemoryDatabase::new();
        let err = db
            .create_store(
                &StoreInput {
                    title: "Ghost Store".to_owned(),
                    address: "1 Nowhere Road".to_owned(),
                },
                UserId::new(99),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_update_store_keeps_creator() {
        let (db, user, store) = seeded().await;
        let updated = db
            .update_store(
                store.id,
                &StoreInput {
                    title: "Main Market 2".to_owned(),
                    address: "125 Main Street".to_owned(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Main Market 2");
        assert_eq!(updated.created_by, user.id);
        assert!(matches!(
            db.update_store(StoreId::new(42), &StoreInput {
                title: "Nope".to_owned(),
                address: "Nowhere at all".to_owned(),
            })
            .await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_item_reflects_store_rename() {
        let (db, user, store) = seeded().await;
        let item = db.create_item(&apple(store.id), user.id).await.unwrap();
        assert_eq!(item.store.title, "Main Market");

        db.update_store(
            store.id,
            &StoreInput {
                title: "Renamed Market".to_owned(),
                address: store.address.clone(),
            },
        )
        .await
        .unwrap();

        let item = db.get_item(item.id).await.unwrap().unwrap();
        assert_eq!(item.store.title, "Renamed Market");
    }

    #[tokio::test]
    async fn test_create_item_requires_existing_store() {
        let (db, user, _) = seeded().await;
        let err = db
            .create_item(&apple(StoreId::new(7)), user.id)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_list_items_for_store_filters_by_store() {
        let (db, user, store) = seeded().await;
        let other = db
            .create_store(
                &StoreInput {
                    title: "Corner Shop".to_owned(),
                    address: "9 Corner Avenue".to_owned(),
                },
                user.id,
            )
            .await
            .unwrap();
        db.create_item(&apple(store.id), user.id).await.unwrap();
        db.create_item(&apple(other.id), user.id).await.unwrap();

        let items = db.list_items_for_store(store.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].store.id, store.id);
    }

    #[tokio::test]
    async fn test_shopping_list_keeps_duplicates_in_order() {
        let (db, user, store) = seeded().await;
        let apple_item = db.create_item(&apple(store.id), user.id).await.unwrap();
        let mut bread = apple(store.id);
        bread.name = "Bread".to_owned();
        let bread_item = db.create_item(&bread, user.id).await.unwrap();

        db.add_to_shopping_list(user.id, apple_item.id).await.unwrap();
        db.add_to_shopping_list(user.id, bread_item.id).await.unwrap();
        db.add_to_shopping_list(user.id, apple_item.id).await.unwrap();

        let names: Vec<_> = db
            .shopping_list(user.id)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, ["Apple", "Bread", "Apple"]);
    }

    #[tokio::test]
    async fn test_add_to_shopping_list_requires_existing_item() {
        let (db, user, _) = seeded().await;
        let err = db
            .add_to_shopping_list(user.id, ItemId::new(5))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }
}
