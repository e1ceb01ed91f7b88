//! Remote list store seam
//!
//! The durable copy of every list lives behind this trait; the
//! synchronizer only ever sees these five operations. `HttpListStore`
//! talks to the real server, `MemoryListStore` backs tests and offline
//! runs.

use async_trait::async_trait;
use thiserror::Error;

use groceryly_common::models::{Category, ListEntry, UserId};

mod http;
mod memory;

pub use http::HttpListStore;
pub use memory::MemoryListStore;

/// Store-level failures, mapped into the user-facing taxonomy at the
/// synchronizer boundary
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server returned status {0}")]
    Api(u16),

    /// The server answered but declined the operation
    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Malformed response: {0}")]
    Parse(String),
}

/// CRUD surface of the remote list store, per user and category
#[async_trait]
pub trait ListStore<E: ListEntry>: Send + Sync {
    /// Fetch the full list
    async fn fetch(&self, user: &UserId, category: Category) -> Result<Vec<E>, StoreError>;

    /// Append one entry
    async fn add(&self, user: &UserId, category: Category, entry: &E) -> Result<(), StoreError>;

    /// Remove the entry with the given name
    async fn remove(&self, user: &UserId, category: Category, name: &str)
        -> Result<(), StoreError>;

    /// Update the checked flag of the named entry
    async fn set_checked(
        &self,
        user: &UserId,
        category: Category,
        name: &str,
        checked: bool,
    ) -> Result<(), StoreError>;

    /// Remove every entry in the category
    async fn clear(&self, user: &UserId, category: Category) -> Result<(), StoreError>;
}
