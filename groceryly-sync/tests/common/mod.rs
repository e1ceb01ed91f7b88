//! Shared fixtures for the integration suites
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use groceryly_common::events::EventBus;
use groceryly_common::models::{Category, ListEntry, ListItem, UserId};
use groceryly_sync::{ListStore, ListSynchronizer, MemoryListStore, StoreError};

pub fn shopper() -> UserId {
    UserId::new("shopper_1")
}

pub fn item_sync(
    category: Category,
    store: Arc<dyn ListStore<ListItem>>,
    bus: EventBus,
) -> ListSynchronizer<ListItem> {
    ListSynchronizer::new(shopper(), category, store, bus)
}

/// Remote operations a [`FailingStore`] can be told to reject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Fetch,
    Add,
    Remove,
    SetChecked,
    Clear,
}

/// Memory store wrapper with failure injection
///
/// `fail_all` rejects everything; `fail_on` rejects one operation in one
/// category, leaving the rest of the workflow live.
pub struct FailingStore {
    inner: MemoryListStore,
    fail_all: AtomicBool,
    rules: Mutex<Vec<(Category, Op)>>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryListStore::new(),
            fail_all: AtomicBool::new(false),
            rules: Mutex::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &MemoryListStore {
        &self.inner
    }

    pub fn fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    pub fn fail_on(&self, category: Category, op: Op) {
        self.rules.lock().unwrap().push((category, op));
    }

    fn check(&self, category: Category, op: Op) -> Result<(), StoreError> {
        let rejected = self.fail_all.load(Ordering::SeqCst)
            || self.rules.lock().unwrap().contains(&(category, op));
        if rejected {
            Err(StoreError::Network("injected failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl<E> ListStore<E> for FailingStore
where
    E: ListEntry + Serialize + DeserializeOwned,
{
    async fn fetch(&self, user: &UserId, category: Category) -> Result<Vec<E>, StoreError> {
        self.check(category, Op::Fetch)?;
        ListStore::fetch(&self.inner, user, category).await
    }

    async fn add(&self, user: &UserId, category: Category, entry: &E) -> Result<(), StoreError> {
        self.check(category, Op::Add)?;
        self.inner.add(user, category, entry).await
    }

    async fn remove(
        &self,
        user: &UserId,
        category: Category,
        name: &str,
    ) -> Result<(), StoreError> {
        self.check(category, Op::Remove)?;
        ListStore::<E>::remove(&self.inner, user, category, name).await
    }

    async fn set_checked(
        &self,
        user: &UserId,
        category: Category,
        name: &str,
        checked: bool,
    ) -> Result<(), StoreError> {
        self.check(category, Op::SetChecked)?;
        ListStore::<E>::set_checked(&self.inner, user, category, name, checked).await
    }

    async fn clear(&self, user: &UserId, category: Category) -> Result<(), StoreError> {
        self.check(category, Op::Clear)?;
        ListStore::<E>::clear(&self.inner, user, category).await
    }
}
