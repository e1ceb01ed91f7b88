//! Grocery-to-pantry move workflow
//!
//! Checking off a grocery item means it has been bought: the item is
//! marked checked, inserted into the pantry, and removed from the
//! grocery list. The three remote steps run in that order with no
//! compensating transaction; if any step fails, the local checked flag
//! reverts and the item stays on the grocery list.

use std::sync::Arc;

use tracing::{info, warn};

use groceryly_common::error::SyncError;
use groceryly_common::models::{Category, ListItem};

use crate::sync::ListSynchronizer;

/// Two-list workflow over the grocery and pantry synchronizers
pub struct PantryMover {
    grocery: Arc<ListSynchronizer<ListItem>>,
    pantry: Arc<ListSynchronizer<ListItem>>,
}

impl PantryMover {
    pub fn new(
        grocery: Arc<ListSynchronizer<ListItem>>,
        pantry: Arc<ListSynchronizer<ListItem>>,
    ) -> Self {
        Self { grocery, pantry }
    }

    /// Check off a grocery item and move it into the pantry
    ///
    /// Steps: optimistic local check, remote check, pantry add (silently
    /// skipped when already present), remote grocery remove. Only once
    /// every remote step has succeeded does the item leave the grocery
    /// mirror.
    pub async fn check_and_move(&self, name: &str) -> Result<(), SyncError> {
        let Some(stored_name) = self.grocery.mark_checked_local(name, true).await else {
            return Err(SyncError::MoveToPantry {
                name: name.to_string(),
                message: "item is not on the grocery list".to_string(),
            });
        };

        if let Err(message) = self.run_move(&stored_name).await {
            self.grocery.mark_checked_local(&stored_name, false).await;
            warn!(name = %stored_name, error = %message, "Move to pantry failed");
            return Err(SyncError::MoveToPantry {
                name: stored_name,
                message,
            });
        }

        self.grocery.remove_local(&stored_name).await;
        self.grocery.emit_changed();
        info!(name = %stored_name, "Moved grocery item to pantry");
        Ok(())
    }

    async fn run_move(&self, name: &str) -> Result<(), String> {
        let user = self.grocery.user_id();
        let grocery_store = self.grocery.store();

        grocery_store
            .set_checked(user, Category::Grocery, name, true)
            .await
            .map_err(|e| e.to_string())?;

        // Dedup lives in the pantry synchronizer; an already-present
        // item is success, not an error.
        self.pantry
            .add(ListItem::new(name))
            .await
            .map_err(|e| e.to_string())?;

        grocery_store
            .remove(user, Category::Grocery, name)
            .await
            .map_err(|e| e.to_string())?;

        Ok(())
    }

    /// Uncheck a grocery item
    ///
    /// Only the grocery store's checked flag changes; the pantry is
    /// never touched on the way back.
    pub async fn uncheck(&self, name: &str) -> Result<(), SyncError> {
        self.grocery.set_checked(name, false).await?;
        Ok(())
    }
}
