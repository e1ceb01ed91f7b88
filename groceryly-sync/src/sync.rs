//! Optimistic list synchronization
//!
//! One `ListSynchronizer` owns the in-memory mirror of a single user's
//! list in a single category. Mutations are applied to the mirror first,
//! then confirmed against the remote store; on failure the mirror is
//! rolled back to its pre-mutation state before the error is returned.
//!
//! The mirror lock is held across each mutation's remote round-trip, so
//! mutations of one category apply in issuance order and two concurrent
//! calls can never interleave their optimistic-update/rollback pairs.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use groceryly_common::error::SyncError;
use groceryly_common::events::{EventBus, ListEvent};
use groceryly_common::models::{same_name, Category, ListEntry, UserId};

use crate::store::ListStore;

/// Per-category controller mirroring one remote list
pub struct ListSynchronizer<E: ListEntry> {
    user_id: UserId,
    category: Category,
    store: Arc<dyn ListStore<E>>,
    bus: EventBus,
    mirror: Mutex<Vec<E>>,
}

impl<E: ListEntry> ListSynchronizer<E> {
    pub fn new(
        user_id: UserId,
        category: Category,
        store: Arc<dyn ListStore<E>>,
        bus: EventBus,
    ) -> Self {
        Self {
            user_id,
            category,
            store,
            bus,
            mirror: Mutex::new(Vec::new()),
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Replace the mirror with the remote list's full contents
    ///
    /// On failure the mirror is emptied rather than left stale or
    /// partial.
    pub async fn load(&self) -> Result<(), SyncError> {
        let mut mirror = self.mirror.lock().await;
        match self.store.fetch(&self.user_id, self.category).await {
            Ok(items) => {
                debug!(
                    category = %self.category.as_str(),
                    count = items.len(),
                    "Loaded list"
                );
                *mirror = items;
                Ok(())
            }
            Err(e) => {
                mirror.clear();
                warn!(category = %self.category.as_str(), error = %e, "Load failed");
                Err(SyncError::Load {
                    category: self.category,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Current mirror contents in stored order
    pub async fn items(&self) -> Vec<E> {
        self.mirror.lock().await.clone()
    }

    /// Mirror contents in display order: unchecked before checked,
    /// insertion order preserved within each group
    pub async fn display_order(&self) -> Vec<E> {
        let mut items = self.mirror.lock().await.clone();
        items.sort_by_key(|entry| entry.checked());
        items
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.mirror
            .lock()
            .await
            .iter()
            .any(|entry| same_name(entry.name(), name))
    }

    /// Append an entry, unless its name is blank or already present
    /// (case-insensitive). Returns whether anything was added; a
    /// skipped add issues no remote call.
    pub async fn add(&self, entry: E) -> Result<bool, SyncError> {
        let name = entry.name().trim().to_string();
        if name.is_empty() {
            return Ok(false);
        }

        let mut mirror = self.mirror.lock().await;
        if mirror.iter().any(|e| same_name(e.name(), &name)) {
            debug!(category = %self.category.as_str(), name = %name, "Already on the list");
            return Ok(false);
        }

        mirror.push(entry.clone());
        match self.store.add(&self.user_id, self.category, &entry).await {
            Ok(()) => {
                drop(mirror);
                self.emit_changed();
                Ok(true)
            }
            Err(e) => {
                mirror.retain(|e| !same_name(e.name(), &name));
                warn!(category = %self.category.as_str(), name = %name, error = %e, "Add failed");
                Err(SyncError::Add {
                    name,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Remove the named entry. Removing an absent name is a no-op.
    pub async fn remove(&self, name: &str) -> Result<(), SyncError> {
        let mut mirror = self.mirror.lock().await;
        let Some(position) = mirror.iter().position(|e| same_name(e.name(), name)) else {
            return Ok(());
        };

        let removed = mirror.remove(position);
        let outcome = self
            .store
            .remove(&self.user_id, self.category, removed.name())
            .await;
        match outcome {
            Ok(()) => {
                drop(mirror);
                self.emit_changed();
                Ok(())
            }
            Err(e) => {
                let name = removed.name().to_string();
                mirror.insert(position, removed);
                warn!(category = %self.category.as_str(), name = %name, error = %e, "Remove failed");
                Err(SyncError::Remove {
                    name,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Flip the named entry's checked flag (grocery list only)
    pub async fn toggle(&self, name: &str) -> Result<bool, SyncError> {
        self.update_checked(name, |current| !current).await
    }

    /// Set the named entry's checked flag (grocery list only)
    pub async fn set_checked(&self, name: &str, checked: bool) -> Result<bool, SyncError> {
        self.update_checked(name, |_| checked).await
    }

    async fn update_checked(
        &self,
        name: &str,
        next: impl FnOnce(bool) -> bool + Send,
    ) -> Result<bool, SyncError> {
        if self.category != Category::Grocery {
            return Err(SyncError::Toggle {
                name: name.to_string(),
                message: format!("the {} list has no checked state", self.category),
            });
        }

        let mut mirror = self.mirror.lock().await;
        let Some(entry) = mirror.iter_mut().find(|e| same_name(e.name(), name)) else {
            return Err(SyncError::Toggle {
                name: name.to_string(),
                message: "item is not on the list".to_string(),
            });
        };

        let previous = entry.checked();
        let target = next(previous);
        if target == previous {
            return Ok(previous);
        }

        entry.set_checked(target);
        let stored_name = entry.name().to_string();
        match self
            .store
            .set_checked(&self.user_id, self.category, &stored_name, target)
            .await
        {
            Ok(()) => {
                drop(mirror);
                self.emit_changed();
                Ok(target)
            }
            Err(e) => {
                if let Some(entry) = mirror.iter_mut().find(|e| same_name(e.name(), name)) {
                    entry.set_checked(previous);
                }
                warn!(name = %stored_name, error = %e, "Checked-flag update failed");
                Err(SyncError::Toggle {
                    name: stored_name,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Empty the list locally and remotely
    pub async fn clear(&self) -> Result<(), SyncError> {
        let mut mirror = self.mirror.lock().await;
        let snapshot = std::mem::take(&mut *mirror);
        match self.store.clear(&self.user_id, self.category).await {
            Ok(()) => {
                drop(mirror);
                self.emit_changed();
                Ok(())
            }
            Err(e) => {
                *mirror = snapshot;
                warn!(category = %self.category.as_str(), error = %e, "Clear failed");
                Err(SyncError::Clear {
                    category: self.category,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Set the checked flag in the mirror only; returns the stored name
    /// when the entry exists. Used by the mover, which runs its own
    /// remote steps.
    pub(crate) async fn mark_checked_local(&self, name: &str, checked: bool) -> Option<String> {
        let mut mirror = self.mirror.lock().await;
        let entry = mirror.iter_mut().find(|e| same_name(e.name(), name))?;
        entry.set_checked(checked);
        Some(entry.name().to_string())
    }

    /// Drop the named entry from the mirror only
    pub(crate) async fn remove_local(&self, name: &str) {
        self.mirror
            .lock()
            .await
            .retain(|e| !same_name(e.name(), name));
    }

    pub(crate) fn store(&self) -> Arc<dyn ListStore<E>> {
        Arc::clone(&self.store)
    }

    pub(crate) fn emit_changed(&self) {
        self.bus
            .emit_lossy(ListEvent::list_changed(self.user_id.clone(), self.category));
    }
}
