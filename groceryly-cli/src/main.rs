//! Groceryly terminal client
//!
//! Drives one user's session against a configured Groceryly server:
//! pantry inventory, grocery list (with check-off into the pantry),
//! meal plan with recipe search, and the allergen list.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::warn;

use groceryly_common::config::AppConfig;
use groceryly_common::events::EventBus;
use groceryly_common::models::{ListItem, Recipe, UserId};
use groceryly_sync::{HttpListStore, HttpRecipeClient, ListSynchronizer, Session};

#[derive(Parser)]
#[command(name = "groceryly", version, about = "Meal planning from the terminal")]
struct Cli {
    /// User identity all lists are scoped by
    #[arg(long, env = "GROCERYLY_USER")]
    user: String,

    /// Server base URL (overrides environment and config file)
    #[arg(long)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pantry inventory
    Pantry {
        #[command(subcommand)]
        action: ItemAction,
    },
    /// Grocery list
    Grocery {
        #[command(subcommand)]
        action: GroceryAction,
    },
    /// Meal plan and recipe search
    Plan {
        #[command(subcommand)]
        action: PlanAction,
    },
    /// Allergen list
    Allergens {
        #[command(subcommand)]
        action: ItemAction,
    },
}

#[derive(Subcommand)]
enum ItemAction {
    /// Show the list
    List,
    /// Add an item
    Add { name: String },
    /// Remove an item
    Remove { name: String },
    /// Remove every item
    Clear,
}

#[derive(Subcommand)]
enum GroceryAction {
    /// Show the list, unchecked items first
    List,
    /// Add an item
    Add { name: String },
    /// Remove an item
    Remove { name: String },
    /// Check an item off and move it into the pantry
    Check { name: String },
    /// Uncheck an item (the pantry is not touched)
    Uncheck { name: String },
    /// Remove every item
    Clear,
}

#[derive(Subcommand)]
enum PlanAction {
    /// Show planned recipes
    List,
    /// Search the recipe catalog
    Search { query: String },
    /// Add a recipe to the plan; missing ingredients go on the grocery list
    Add { id: i64, title: String },
    /// Clear the plan along with the grocery list it populated
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::resolve(cli.server.as_deref());

    let store = Arc::new(HttpListStore::new(
        config.server_url.as_str(),
        config.request_timeout_secs,
    )?);
    let recipes = Arc::new(HttpRecipeClient::new(
        config.server_url.as_str(),
        config.request_timeout_secs,
    )?);

    let session = Session::sign_in(
        UserId::new(cli.user.clone()),
        store,
        recipes,
        EventBus::default(),
        &config,
    );

    match cli.command {
        Command::Pantry { action } => run_items(session.pantry(), action).await?,
        Command::Grocery { action } => run_grocery(&session, action).await?,
        Command::Plan { action } => run_plan(&session, action).await?,
        Command::Allergens { action } => run_items(session.allergens(), action).await?,
    }

    Ok(())
}

/// Load a mirror, warning instead of failing; the list shows as empty
fn note_load_failure(result: Vec<groceryly_common::SyncError>) {
    for error in result {
        warn!("{error}");
    }
}

async fn load(sync: &ListSynchronizer<ListItem>) {
    if let Err(e) = sync.load().await {
        warn!("{e}");
    }
}

async fn run_items(sync: &Arc<ListSynchronizer<ListItem>>, action: ItemAction) -> Result<()> {
    load(sync).await;
    match action {
        ItemAction::List => {
            let items = sync.items().await;
            if items.is_empty() {
                println!("(nothing here)");
            }
            for item in items {
                println!("  {}", item.name);
            }
        }
        ItemAction::Add { name } => {
            if sync.add(ListItem::new(name.trim())).await? {
                println!("Added \"{}\"", name.trim());
            } else {
                println!("\"{}\" is already on the list", name.trim());
            }
        }
        ItemAction::Remove { name } => {
            sync.remove(&name).await?;
            println!("Removed \"{name}\"");
        }
        ItemAction::Clear => {
            sync.clear().await?;
            println!("List cleared");
        }
    }
    Ok(())
}

async fn run_grocery(session: &Session, action: GroceryAction) -> Result<()> {
    load(session.grocery()).await;
    match action {
        GroceryAction::List => {
            let items = session.grocery().display_order().await;
            if items.is_empty() {
                println!("(nothing to buy!)");
            }
            for item in items {
                let marker = if item.checked { "[x]" } else { "[ ]" };
                println!("  {marker} {}", item.name);
            }
        }
        GroceryAction::Add { name } => {
            if session.grocery().add(ListItem::new(name.trim())).await? {
                println!("Added \"{}\"", name.trim());
            } else {
                println!("\"{}\" is already on the list", name.trim());
            }
        }
        GroceryAction::Remove { name } => {
            session.grocery().remove(&name).await?;
            println!("Removed \"{name}\"");
        }
        GroceryAction::Check { name } => {
            // The mover dedups against the pantry mirror
            load(session.pantry()).await;
            session.check_off(&name).await?;
            println!("\"{name}\" moved to the pantry");
        }
        GroceryAction::Uncheck { name } => {
            session.uncheck(&name).await?;
            println!("Unchecked \"{name}\"");
        }
        GroceryAction::Clear => {
            session.grocery().clear().await?;
            println!("Grocery list cleared");
        }
    }
    Ok(())
}

async fn run_plan(session: &Session, action: PlanAction) -> Result<()> {
    match action {
        PlanAction::List => {
            if let Err(e) = session.meal_plan().load().await {
                warn!("{e}");
            }
            let entries = session.meal_plan().items().await;
            if entries.is_empty() {
                println!("(no meals planned)");
            }
            for entry in entries {
                println!("  {} (#{})", entry.recipe_name, entry.recipe_id);
            }
        }
        PlanAction::Search { query } => {
            let query = query.trim().to_string();
            let mut results = session.search().results();
            session.search().submit(&query);
            let state = results
                .wait_for(|state| !state.searching && state.query == query)
                .await?;
            if let Some(error) = &state.error {
                println!("{error}");
            } else if state.results.is_empty() {
                println!("No recipes found for \"{query}\"");
            } else {
                for recipe in &state.results {
                    let minutes = recipe
                        .ready_in_minutes
                        .map(|m| format!(", {m} min"))
                        .unwrap_or_default();
                    println!("  #{} {}{}", recipe.id, recipe.title, minutes);
                }
            }
        }
        PlanAction::Add { id, title } => {
            note_load_failure(session.load_all().await);
            let recipe = Recipe {
                id,
                title: title.clone(),
                image: None,
                ready_in_minutes: None,
                servings: None,
            };
            let report = session.add_recipe_to_plan(&recipe).await?;
            if !report.added {
                println!("\"{title}\" is already planned");
            } else {
                println!("Planned \"{title}\"");
                for name in &report.ingredients_added {
                    println!("  + {name} (grocery list)");
                }
            }
            for failure in &report.failures {
                println!("  ! {failure}");
            }
        }
        PlanAction::Clear => {
            session.clear_plan().await?;
            println!("Meal plan and grocery list cleared");
        }
    }
    Ok(())
}
