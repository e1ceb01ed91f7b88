//! Integration tests for the per-user session: recipe fan-out, pantry
//! comparison, allergen safety, and user switching

mod common;

use std::sync::Arc;

use groceryly_common::config::AppConfig;
use groceryly_common::events::{EventBus, ListEvent};
use groceryly_common::models::{Category, ListItem, Recipe, RecipeDetails, UserId};
use groceryly_common::SyncError;
use groceryly_sync::{MemoryListStore, MockRecipeSource, RecipeSource, Session};

use common::{shopper, FailingStore, Op};

fn recipe(id: i64, title: &str) -> Recipe {
    Recipe {
        id,
        title: title.to_string(),
        image: None,
        ready_in_minutes: None,
        servings: None,
    }
}

fn cookies() -> Recipe {
    recipe(1, "Chocolate Chip Cookies")
}

fn catalog() -> Arc<dyn RecipeSource> {
    Arc::new(MockRecipeSource::with_sample_catalog())
}

#[tokio::test]
async fn fan_out_adds_only_the_missing_ingredients() {
    let store = Arc::new(MemoryListStore::new());
    store.seed(
        &shopper(),
        Category::Pantry,
        &[ListItem::new("Butter"), ListItem::new("flour")],
    );

    let session = Session::sign_in(
        shopper(),
        store,
        catalog(),
        EventBus::default(),
        &AppConfig::default(),
    );
    assert!(session.load_all().await.is_empty());

    let report = session.add_recipe_to_plan(&cookies()).await.unwrap();
    assert!(report.added);
    assert!(report.failures.is_empty());
    assert_eq!(
        report.ingredients_added,
        ["Sugar", "Eggs", "Chocolate Chips"]
    );

    let grocery: Vec<String> = session
        .grocery()
        .items()
        .await
        .into_iter()
        .map(|item| item.name)
        .collect();
    assert_eq!(grocery, ["Sugar", "Eggs", "Chocolate Chips"]);

    let plan = session.meal_plan().items().await;
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].recipe_id, 1);
    assert_eq!(plan[0].recipe_name, "Chocolate Chip Cookies");
}

#[tokio::test]
async fn fan_out_failures_do_not_roll_back_the_plan_entry() {
    let store = Arc::new(FailingStore::new());
    store.fail_on(Category::Grocery, Op::Add);

    let session = Session::sign_in(
        shopper(),
        store,
        catalog(),
        EventBus::default(),
        &AppConfig::default(),
    );
    session.load_all().await;

    let report = session.add_recipe_to_plan(&cookies()).await.unwrap();
    assert!(report.added);
    assert!(report.ingredients_added.is_empty());
    assert_eq!(report.failures.len(), 5);
    assert!(report
        .failures
        .iter()
        .all(|e| matches!(e, SyncError::Add { .. })));

    // The plan kept its entry; the grocery list rolled each add back
    assert_eq!(session.meal_plan().items().await.len(), 1);
    assert!(session.grocery().items().await.is_empty());
}

#[tokio::test]
async fn details_failure_keeps_the_plan_entry_and_reports_once() {
    let store = Arc::new(MemoryListStore::new());
    let empty_catalog: Arc<dyn RecipeSource> = Arc::new(MockRecipeSource::new(Vec::new()));

    let session = Session::sign_in(
        shopper(),
        store,
        empty_catalog,
        EventBus::default(),
        &AppConfig::default(),
    );

    let report = session
        .add_recipe_to_plan(&recipe(42, "Mystery Dish"))
        .await
        .unwrap();
    assert!(report.added);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0], SyncError::Search { .. }));

    assert_eq!(session.meal_plan().items().await.len(), 1);
    assert!(session.grocery().items().await.is_empty());
}

#[tokio::test]
async fn re_adding_a_planned_recipe_skips_the_fan_out() {
    let store = Arc::new(MemoryListStore::new());
    let session = Session::sign_in(
        shopper(),
        store,
        catalog(),
        EventBus::default(),
        &AppConfig::default(),
    );

    let first = session.add_recipe_to_plan(&cookies()).await.unwrap();
    assert!(first.added);
    assert_eq!(first.ingredients_added.len(), 5);

    let second = session.add_recipe_to_plan(&cookies()).await.unwrap();
    assert!(!second.added);
    assert!(second.ingredients_added.is_empty());

    assert_eq!(session.meal_plan().items().await.len(), 1);
    assert_eq!(session.grocery().items().await.len(), 5);
}

#[tokio::test]
async fn failed_plan_add_rolls_back_and_skips_the_fan_out() {
    let store = Arc::new(FailingStore::new());
    store.fail_on(Category::MealPlan, Op::Add);

    let session = Session::sign_in(
        shopper(),
        store,
        catalog(),
        EventBus::default(),
        &AppConfig::default(),
    );

    let err = session.add_recipe_to_plan(&cookies()).await.unwrap_err();
    assert!(matches!(err, SyncError::Add { .. }));
    assert!(session.meal_plan().items().await.is_empty());
    assert!(session.grocery().items().await.is_empty());
}

#[tokio::test]
async fn clearing_the_plan_clears_the_grocery_list_too() {
    let store = Arc::new(MemoryListStore::new());
    let session = Session::sign_in(
        shopper(),
        store.clone(),
        catalog(),
        EventBus::default(),
        &AppConfig::default(),
    );

    session.add_recipe_to_plan(&cookies()).await.unwrap();
    session.clear_plan().await.unwrap();

    assert!(session.meal_plan().items().await.is_empty());
    assert!(session.grocery().items().await.is_empty());
    assert!(store.is_empty(&shopper(), Category::MealPlan));
    assert!(store.is_empty(&shopper(), Category::Grocery));
}

#[tokio::test]
async fn allergen_safety_checks_ingredient_names() {
    let store = Arc::new(MemoryListStore::new());
    let session = Session::sign_in(
        shopper(),
        store,
        catalog(),
        EventBus::default(),
        &AppConfig::default(),
    );

    assert!(session.add_allergen("Peanut").await.unwrap());
    // Stored lowercase
    assert_eq!(session.allergens().items().await[0].name, "peanut");

    let risky = RecipeDetails {
        recipe: recipe(7, "PB&J"),
        ingredients: vec!["Peanut Butter".to_string(), "Bread".to_string()],
    };
    assert!(!session.recipe_is_safe(&risky).await);

    let safe = RecipeDetails {
        recipe: recipe(8, "Toast"),
        ingredients: vec!["Bread".to_string()],
    };
    assert!(session.recipe_is_safe(&safe).await);

    session.remove_allergen("peanut").await.unwrap();
    assert!(session.recipe_is_safe(&risky).await);
}

#[tokio::test]
async fn one_shot_search_bypasses_the_debounce() {
    let store = Arc::new(MemoryListStore::new());
    let session = Session::sign_in(
        shopper(),
        store,
        catalog(),
        EventBus::default(),
        &AppConfig::default(),
    );

    let results = session.search_now("cookies").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Chocolate Chip Cookies");

    assert!(session.search_now("   ").await.unwrap().is_empty());
}

#[tokio::test]
async fn switching_users_starts_from_fresh_mirrors() {
    let store = Arc::new(MemoryListStore::new());
    store.seed(&shopper(), Category::Pantry, &[ListItem::new("Rice")]);

    let bus = EventBus::new(8);
    let mut rx = bus.subscribe();

    let session = Session::sign_in(
        shopper(),
        store.clone(),
        catalog(),
        bus.clone(),
        &AppConfig::default(),
    );
    session.load_all().await;
    assert_eq!(session.pantry().items().await.len(), 1);

    drop(session);
    let session = Session::sign_in(
        UserId::new("someone_else"),
        store,
        catalog(),
        bus,
        &AppConfig::default(),
    );
    session.load_all().await;
    assert!(session.pantry().items().await.is_empty());

    // Both sign-ins announced themselves on the shared bus
    assert!(matches!(
        rx.recv().await.unwrap(),
        ListEvent::UserSwitched { .. }
    ));
}
