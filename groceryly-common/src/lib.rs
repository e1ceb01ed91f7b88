//! # Groceryly Common Library
//!
//! Shared code for the Groceryly meal-planning client:
//! - Data model (list items, meal-plan entries, recipes)
//! - Error taxonomy surfaced by the synchronization core
//! - API request/response types
//! - Configuration loading
//! - Change-notification event bus

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod models;

pub use error::{SyncError, SyncResult};
pub use models::{Category, ListEntry, ListItem, MealPlanEntry, Recipe, RecipeDetails, UserId};
