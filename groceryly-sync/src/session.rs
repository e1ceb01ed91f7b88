//! Per-user session
//!
//! A `Session` binds the four category synchronizers, the pantry mover,
//! and the recipe source to one authenticated user. Switching users
//! means dropping the session and signing in again; mirrors are never
//! reused across users.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use groceryly_common::config::AppConfig;
use groceryly_common::error::SyncError;
use groceryly_common::events::{EventBus, ListEvent};
use groceryly_common::models::{
    same_name, Category, ListItem, MealPlanEntry, Recipe, RecipeDetails, UserId,
};

use crate::mover::PantryMover;
use crate::search::{DebouncedSearch, RecipeSource};
use crate::store::ListStore;
use crate::sync::ListSynchronizer;

/// Outcome of adding a recipe to the meal plan
///
/// The meal-plan addition itself either succeeded (this struct) or
/// failed (the returned error). Ingredient fan-out to the grocery list
/// is best-effort: its failures are collected here and never roll back
/// the plan entry.
#[derive(Debug, Default)]
pub struct PlanAddReport {
    /// False when the recipe was already on the plan
    pub added: bool,
    /// Ingredients appended to the grocery list
    pub ingredients_added: Vec<String>,
    /// Fan-out failures, reported independently
    pub failures: Vec<SyncError>,
}

/// All synchronized state for one signed-in user
pub struct Session {
    user_id: UserId,
    pantry: Arc<ListSynchronizer<ListItem>>,
    grocery: Arc<ListSynchronizer<ListItem>>,
    meal_plan: Arc<ListSynchronizer<MealPlanEntry>>,
    allergens: Arc<ListSynchronizer<ListItem>>,
    mover: PantryMover,
    recipes: Arc<dyn RecipeSource>,
    search: DebouncedSearch,
    search_limit: u32,
    bus: EventBus,
}

impl Session {
    /// Build a session for a signed-in user
    ///
    /// Mirrors start empty; call [`Session::load_all`] to populate them.
    pub fn sign_in<S>(
        user_id: UserId,
        store: Arc<S>,
        recipes: Arc<dyn RecipeSource>,
        bus: EventBus,
        config: &AppConfig,
    ) -> Self
    where
        S: ListStore<ListItem> + ListStore<MealPlanEntry> + 'static,
    {
        let item_store: Arc<dyn ListStore<ListItem>> = store.clone();
        let plan_store: Arc<dyn ListStore<MealPlanEntry>> = store;

        let pantry = Arc::new(ListSynchronizer::new(
            user_id.clone(),
            Category::Pantry,
            item_store.clone(),
            bus.clone(),
        ));
        let grocery = Arc::new(ListSynchronizer::new(
            user_id.clone(),
            Category::Grocery,
            item_store.clone(),
            bus.clone(),
        ));
        let meal_plan = Arc::new(ListSynchronizer::new(
            user_id.clone(),
            Category::MealPlan,
            plan_store,
            bus.clone(),
        ));
        let allergens = Arc::new(ListSynchronizer::new(
            user_id.clone(),
            Category::Allergens,
            item_store,
            bus.clone(),
        ));

        let mover = PantryMover::new(Arc::clone(&grocery), Arc::clone(&pantry));
        let search = DebouncedSearch::new(
            Arc::clone(&recipes),
            Duration::from_millis(config.search_debounce_ms),
            config.search_limit,
        );

        info!(user = %user_id, "Session started");
        bus.emit_lossy(ListEvent::user_switched(user_id.clone()));

        Self {
            user_id,
            pantry,
            grocery,
            meal_plan,
            allergens,
            mover,
            recipes,
            search,
            search_limit: config.search_limit,
            bus,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn pantry(&self) -> &Arc<ListSynchronizer<ListItem>> {
        &self.pantry
    }

    pub fn grocery(&self) -> &Arc<ListSynchronizer<ListItem>> {
        &self.grocery
    }

    pub fn meal_plan(&self) -> &Arc<ListSynchronizer<MealPlanEntry>> {
        &self.meal_plan
    }

    pub fn allergens(&self) -> &Arc<ListSynchronizer<ListItem>> {
        &self.allergens
    }

    pub fn search(&self) -> &DebouncedSearch {
        &self.search
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    /// Fetch every category; failures are collected, not fatal, and each
    /// failed mirror is left empty
    pub async fn load_all(&self) -> Vec<SyncError> {
        let mut failures = Vec::new();
        if let Err(e) = self.pantry.load().await {
            failures.push(e);
        }
        if let Err(e) = self.grocery.load().await {
            failures.push(e);
        }
        if let Err(e) = self.meal_plan.load().await {
            failures.push(e);
        }
        if let Err(e) = self.allergens.load().await {
            failures.push(e);
        }
        failures
    }

    /// Check off a grocery item, moving it into the pantry
    pub async fn check_off(&self, name: &str) -> Result<(), SyncError> {
        self.mover.check_and_move(name).await
    }

    /// Uncheck a grocery item; the pantry is not touched
    pub async fn uncheck(&self, name: &str) -> Result<(), SyncError> {
        self.mover.uncheck(name).await
    }

    /// One-shot recipe search, bypassing the debounce timer
    pub async fn search_now(&self, query: &str) -> Result<Vec<Recipe>, SyncError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.recipes
            .search(query, self.search_limit)
            .await
            .map_err(|e| SyncError::Search {
                message: e.to_string(),
            })
    }

    /// Add a recipe to the meal plan and fan its missing ingredients out
    /// to the grocery list
    pub async fn add_recipe_to_plan(&self, recipe: &Recipe) -> Result<PlanAddReport, SyncError> {
        let added = self.meal_plan.add(MealPlanEntry::from(recipe)).await?;
        let mut report = PlanAddReport {
            added,
            ..Default::default()
        };
        if !added {
            // Already planned; re-adding must not duplicate groceries
            return Ok(report);
        }

        match self.recipes.details(recipe.id).await {
            Ok(details) => {
                for name in self.missing_ingredients(&details).await {
                    match self.grocery.add(ListItem::new(name.clone())).await {
                        Ok(true) => report.ingredients_added.push(name),
                        Ok(false) => {}
                        Err(e) => report.failures.push(e),
                    }
                }
            }
            Err(e) => {
                warn!(recipe_id = recipe.id, error = %e, "Ingredient fan-out skipped");
                report.failures.push(SyncError::Search {
                    message: e.to_string(),
                });
            }
        }

        Ok(report)
    }

    /// Clear the meal plan along with the grocery list it populated
    pub async fn clear_plan(&self) -> Result<(), SyncError> {
        self.meal_plan.clear().await?;
        self.grocery.clear().await
    }

    /// Recipe ingredients not covered by the pantry mirror
    pub async fn missing_ingredients(&self, details: &RecipeDetails) -> Vec<String> {
        let pantry = self.pantry.items().await;
        details
            .ingredients
            .iter()
            .filter(|ingredient| !pantry.iter().any(|item| same_name(&item.name, ingredient)))
            .cloned()
            .collect()
    }

    /// Record an allergen; stored lowercase
    pub async fn add_allergen(&self, name: &str) -> Result<bool, SyncError> {
        self.allergens
            .add(ListItem::new(name.trim().to_lowercase()))
            .await
    }

    pub async fn remove_allergen(&self, name: &str) -> Result<(), SyncError> {
        self.allergens.remove(name).await
    }

    /// True when no ingredient name contains a stored allergen
    pub async fn recipe_is_safe(&self, details: &RecipeDetails) -> bool {
        let allergens = self.allergens.items().await;
        if allergens.is_empty() {
            return true;
        }
        !details.ingredients.iter().any(|ingredient| {
            let ingredient = ingredient.to_lowercase();
            allergens
                .iter()
                .any(|allergen| ingredient.contains(&allergen.name.to_lowercase()))
        })
    }
}
