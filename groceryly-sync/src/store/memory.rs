//! In-process list store
//!
//! Entries are held as JSON values keyed by user and category, so one
//! instance serves every entry type the same way the real server does.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use groceryly_common::models::{same_name, Category, ListEntry, UserId};

use super::{ListStore, StoreError};

/// Test and offline stand-in for the remote store
#[derive(Default)]
pub struct MemoryListStore {
    lists: Mutex<HashMap<(UserId, Category), Vec<Value>>>,
}

impl MemoryListStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a list, bypassing the store API
    pub fn seed<E: Serialize>(&self, user: &UserId, category: Category, entries: &[E]) {
        let mut lists = self.lists.lock().unwrap();
        let list = lists.entry((user.clone(), category)).or_default();
        for entry in entries {
            list.push(serde_json::to_value(entry).expect("seed entry serializes"));
        }
    }

    /// Number of entries currently stored for the user and category
    pub fn len(&self, user: &UserId, category: Category) -> usize {
        self.lists
            .lock()
            .unwrap()
            .get(&(user.clone(), category))
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn is_empty(&self, user: &UserId, category: Category) -> bool {
        self.len(user, category) == 0
    }
}

fn decode<E: DeserializeOwned>(value: &Value) -> Result<E, StoreError> {
    serde_json::from_value(value.clone()).map_err(|e| StoreError::Parse(e.to_string()))
}

#[async_trait]
impl<E> ListStore<E> for MemoryListStore
where
    E: ListEntry + Serialize + DeserializeOwned,
{
    async fn fetch(&self, user: &UserId, category: Category) -> Result<Vec<E>, StoreError> {
        let lists = self.lists.lock().unwrap();
        lists
            .get(&(user.clone(), category))
            .map(|list| list.iter().map(decode).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn add(&self, user: &UserId, category: Category, entry: &E) -> Result<(), StoreError> {
        let value = serde_json::to_value(entry).map_err(|e| StoreError::Parse(e.to_string()))?;
        let mut lists = self.lists.lock().unwrap();
        lists.entry((user.clone(), category)).or_default().push(value);
        Ok(())
    }

    async fn remove(
        &self,
        user: &UserId,
        category: Category,
        name: &str,
    ) -> Result<(), StoreError> {
        let mut lists = self.lists.lock().unwrap();
        if let Some(list) = lists.get_mut(&(user.clone(), category)) {
            let mut result = Ok(());
            list.retain(|value| match decode::<E>(value) {
                Ok(entry) => !same_name(entry.name(), name),
                Err(e) => {
                    result = Err(e);
                    true
                }
            });
            result?;
        }
        Ok(())
    }

    async fn set_checked(
        &self,
        user: &UserId,
        category: Category,
        name: &str,
        checked: bool,
    ) -> Result<(), StoreError> {
        let mut lists = self.lists.lock().unwrap();
        if let Some(list) = lists.get_mut(&(user.clone(), category)) {
            for value in list.iter_mut() {
                let mut entry: E = decode(value)?;
                if same_name(entry.name(), name) {
                    entry.set_checked(checked);
                    *value = serde_json::to_value(&entry)
                        .map_err(|e| StoreError::Parse(e.to_string()))?;
                }
            }
        }
        Ok(())
    }

    async fn clear(&self, user: &UserId, category: Category) -> Result<(), StoreError> {
        let mut lists = self.lists.lock().unwrap();
        lists.remove(&(user.clone(), category));
        Ok(())
    }
}
