//! Error taxonomy surfaced by the synchronization core
//!
//! Every variant is recoverable and local to one operation. The
//! synchronizer rolls its mirror back before returning any of these, so
//! callers can display the message and carry on.

use thiserror::Error;

use crate::models::Category;

/// Result type for synchronization operations
pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Errors surfaced to the view layer by list operations
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SyncError {
    /// Full list fetch failed; the mirror has been emptied
    #[error("Failed to load the {category} list: {message}")]
    Load { category: Category, message: String },

    /// Remote add failed; the optimistic append has been undone
    #[error("Failed to add \"{name}\": {message}")]
    Add { name: String, message: String },

    /// Remote remove failed; the item has been restored
    #[error("Failed to remove \"{name}\": {message}")]
    Remove { name: String, message: String },

    /// Remote checked-flag update failed; the flip has been reverted
    #[error("Failed to update \"{name}\": {message}")]
    Toggle { name: String, message: String },

    /// Remote clear failed; the previous contents have been restored
    #[error("Failed to clear the {category} list: {message}")]
    Clear { category: Category, message: String },

    /// A step of the grocery-to-pantry move failed; the checked flag has
    /// been reverted and the item remains on the grocery list
    #[error("Failed to move \"{name}\" to the pantry: {message}")]
    MoveToPantry { name: String, message: String },

    /// Recipe search or detail lookup failed
    #[error("Recipe search failed: {message}")]
    Search { message: String },
}
