//! # Groceryly Synchronization Core
//!
//! Keeps per-category in-memory list mirrors consistent with a remote
//! store under optimistic concurrency:
//! - [`store`] — the remote list store seam, its HTTP implementation,
//!   and an in-process store for tests and offline use
//! - [`sync`] — the parametric List Synchronizer (optimistic mutation,
//!   rollback on failure)
//! - [`mover`] — the grocery-to-pantry check-and-move workflow
//! - [`search`] — debounced recipe search
//! - [`session`] — per-user wiring of all of the above

pub mod mover;
pub mod search;
pub mod session;
pub mod store;
pub mod sync;

pub use mover::PantryMover;
pub use search::{
    DebouncedSearch, HttpRecipeClient, MockRecipeSource, RecipeError, RecipeSource, SearchState,
};
pub use session::{PlanAddReport, Session};
pub use store::{HttpListStore, ListStore, MemoryListStore, StoreError};
pub use sync::ListSynchronizer;
