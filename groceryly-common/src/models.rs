//! Data model shared by the synchronization core and its callers

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque identifier for the authenticated principal
///
/// Supplied by the identity provider; the core only ever passes it
/// through to the remote store. No list exists without one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// List category, the unit of synchronization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Pantry,
    Grocery,
    MealPlan,
    Allergens,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Pantry,
        Category::Grocery,
        Category::MealPlan,
        Category::Allergens,
    ];

    /// URL path segment used by the remote store
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Pantry => "pantry",
            Category::Grocery => "grocery",
            Category::MealPlan => "mealPlan",
            Category::Allergens => "allergens",
        }
    }

    /// Human-readable label for error messages
    pub fn label(&self) -> &'static str {
        match self {
            Category::Pantry => "pantry",
            Category::Grocery => "grocery",
            Category::MealPlan => "meal plan",
            Category::Allergens => "allergen",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Case-insensitive name equality used for dedup across all lists
pub fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Common behavior of anything a list can hold
///
/// `name()` is the dedup and display key. The checked flag is only
/// meaningful on the grocery list; other entry types keep the no-op
/// defaults.
pub trait ListEntry: Clone + Send + Sync + 'static {
    fn name(&self) -> &str;

    fn checked(&self) -> bool {
        false
    }

    fn set_checked(&mut self, _checked: bool) {}
}

/// A named item on the pantry, grocery, or allergen list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub name: String,
    /// Grocery list only; omitted on the wire when false
    #[serde(default, skip_serializing_if = "is_false")]
    pub checked: bool,
}

fn is_false(checked: &bool) -> bool {
    !*checked
}

impl ListItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            checked: false,
        }
    }
}

impl ListEntry for ListItem {
    fn name(&self) -> &str {
        &self.name
    }

    fn checked(&self) -> bool {
        self.checked
    }

    fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }
}

/// A meal-plan entry, keeping recipe provenance for later fan-out to the
/// grocery list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanEntry {
    pub recipe_id: i64,
    pub recipe_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ListEntry for MealPlanEntry {
    fn name(&self) -> &str {
        &self.recipe_name
    }
}

impl From<&Recipe> for MealPlanEntry {
    fn from(recipe: &Recipe) -> Self {
        Self {
            recipe_id: recipe.id,
            recipe_name: recipe.title.clone(),
            image: recipe.image.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MealPlanEntryFields {
    #[serde(default)]
    recipe_id: Option<i64>,
    recipe_name: String,
    #[serde(default)]
    image: Option<String>,
}

impl From<MealPlanEntryFields> for MealPlanEntry {
    fn from(fields: MealPlanEntryFields) -> Self {
        Self {
            recipe_id: fields.recipe_id.unwrap_or(0),
            recipe_name: fields.recipe_name,
            image: fields.image,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MealPlanEntryWire {
    Object(MealPlanEntryFields),
    Legacy(String),
}

// Older clients stored meal-plan entries as JSON-encoded strings; a
// string that is not valid JSON is treated as a bare recipe name.
impl<'de> Deserialize<'de> for MealPlanEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match MealPlanEntryWire::deserialize(deserializer)? {
            MealPlanEntryWire::Object(fields) => Ok(fields.into()),
            MealPlanEntryWire::Legacy(raw) => {
                match serde_json::from_str::<MealPlanEntryFields>(&raw) {
                    Ok(fields) => Ok(fields.into()),
                    Err(_) => Ok(MealPlanEntry {
                        recipe_id: 0,
                        recipe_name: raw,
                        image: None,
                    }),
                }
            }
        }
    }
}

/// A recipe search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_in_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
}

/// Full recipe record returned by the detail lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDetails {
    #[serde(flatten)]
    pub recipe: Recipe,
    #[serde(default)]
    pub ingredients: Vec<String>,
}
