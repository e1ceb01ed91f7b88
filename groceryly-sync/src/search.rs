//! Recipe search
//!
//! The search endpoint is an external collaborator behind the
//! [`RecipeSource`] trait: the real client proxies the server's recipe
//! API, the mock serves canned data. [`DebouncedSearch`] sits in front
//! of either, bounding request rate with a per-instance quiet-period
//! timer and guarding against stale responses.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

use groceryly_common::api::SearchResponse;
use groceryly_common::error::SyncError;
use groceryly_common::models::{Recipe, RecipeDetails};

const USER_AGENT: &str = concat!("Groceryly/", env!("CARGO_PKG_VERSION"));

/// Recipe service errors
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Recipe service returned status {0}")]
    Api(u16),

    #[error("Recipe {0} not found")]
    NotFound(i64),

    #[error("Malformed response: {0}")]
    Parse(String),
}

/// Search and detail lookup against a recipe catalog
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// Free-text search returning at most `limit` candidates
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Recipe>, RecipeError>;

    /// Full record for one recipe, including its ingredient names
    async fn details(&self, id: i64) -> Result<RecipeDetails, RecipeError>;
}

/// Recipe source backed by the Groceryly server's recipe proxy
pub struct HttpRecipeClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpRecipeClient {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, RecipeError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RecipeError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RecipeSource for HttpRecipeClient {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Recipe>, RecipeError> {
        let url = format!("{}/api/recipes/search", self.base_url);
        debug!(query = %query, limit = limit, "Searching recipes");

        let number = limit.to_string();
        let response = self
            .http_client
            .get(&url)
            .query(&[("query", query), ("number", number.as_str())])
            .send()
            .await
            .map_err(|e| RecipeError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecipeError::Api(status.as_u16()));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| RecipeError::Parse(e.to_string()))?;

        Ok(body.results)
    }

    async fn details(&self, id: i64) -> Result<RecipeDetails, RecipeError> {
        let url = format!("{}/api/recipes/{}", self.base_url, id);
        debug!(recipe_id = id, "Fetching recipe details");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| RecipeError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RecipeError::NotFound(id));
        }
        if !status.is_success() {
            return Err(RecipeError::Api(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| RecipeError::Parse(e.to_string()))
    }
}

/// Canned recipe source for tests and offline runs
pub struct MockRecipeSource {
    recipes: Vec<RecipeDetails>,
}

impl MockRecipeSource {
    pub fn new(recipes: Vec<RecipeDetails>) -> Self {
        Self { recipes }
    }

    /// A small built-in catalog
    pub fn with_sample_catalog() -> Self {
        Self::new(vec![
            RecipeDetails {
                recipe: Recipe {
                    id: 1,
                    title: "Chocolate Chip Cookies".to_string(),
                    image: None,
                    ready_in_minutes: Some(30),
                    servings: Some(12),
                },
                ingredients: vec![
                    "Butter".to_string(),
                    "Sugar".to_string(),
                    "Eggs".to_string(),
                    "Flour".to_string(),
                    "Chocolate Chips".to_string(),
                ],
            },
            RecipeDetails {
                recipe: Recipe {
                    id: 2,
                    title: "Vegetable Stir Fry".to_string(),
                    image: None,
                    ready_in_minutes: Some(20),
                    servings: Some(4),
                },
                ingredients: vec![
                    "Olive Oil".to_string(),
                    "Garlic".to_string(),
                    "Ginger".to_string(),
                    "Bell Pepper".to_string(),
                    "Broccoli".to_string(),
                ],
            },
        ])
    }
}

#[async_trait]
impl RecipeSource for MockRecipeSource {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Recipe>, RecipeError> {
        let needle = query.to_lowercase();
        Ok(self
            .recipes
            .iter()
            .filter(|details| details.recipe.title.to_lowercase().contains(&needle))
            .map(|details| details.recipe.clone())
            .take(limit as usize)
            .collect())
    }

    async fn details(&self, id: i64) -> Result<RecipeDetails, RecipeError> {
        self.recipes
            .iter()
            .find(|details| details.recipe.id == id)
            .cloned()
            .ok_or(RecipeError::NotFound(id))
    }
}

/// Latest search outcome, published on a watch channel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<Recipe>,
    pub error: Option<String>,
    /// True between dispatch and completion of a remote search
    pub searching: bool,
}

/// Debounced front end over a [`RecipeSource`]
///
/// Each `submit` restarts the quiet-period timer; a pending search that
/// has not yet been dispatched is cancelled by the next keystroke. Once
/// dispatched, a response is applied only while its submission is still
/// the latest (last-dispatched-wins), so a slow early response can never
/// overwrite a newer query's results.
pub struct DebouncedSearch {
    source: Arc<dyn RecipeSource>,
    delay: Duration,
    limit: u32,
    generation: Arc<AtomicU64>,
    state: Arc<watch::Sender<SearchState>>,
}

impl DebouncedSearch {
    pub fn new(source: Arc<dyn RecipeSource>, delay: Duration, limit: u32) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            source,
            delay,
            limit,
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
        }
    }

    /// Subscribe to search outcomes
    pub fn results(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Feed the current query text; dispatches after the quiet period
    ///
    /// An empty or whitespace query resets to an empty result set
    /// immediately, with no remote call.
    pub fn submit(&self, query: &str) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = query.trim().to_string();

        if query.is_empty() {
            self.state.send_replace(SearchState::default());
            return;
        }

        let source = Arc::clone(&self.source);
        let counter = Arc::clone(&self.generation);
        let state = Arc::clone(&self.state);
        let delay = self.delay;
        let limit = self.limit;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if counter.load(Ordering::SeqCst) != generation {
                // Superseded before dispatch
                return;
            }

            state.send_replace(SearchState {
                query: query.clone(),
                results: Vec::new(),
                error: None,
                searching: true,
            });

            let outcome = source.search(&query, limit).await;
            if counter.load(Ordering::SeqCst) != generation {
                debug!(query = %query, "Dropping stale search response");
                return;
            }

            let next = match outcome {
                Ok(results) => SearchState {
                    query,
                    results,
                    error: None,
                    searching: false,
                },
                Err(e) => {
                    warn!(query = %query, error = %e, "Search failed");
                    let error = SyncError::Search {
                        message: e.to_string(),
                    };
                    SearchState {
                        query,
                        results: Vec::new(),
                        error: Some(error.to_string()),
                        searching: false,
                    }
                }
            };
            state.send_replace(next);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_search_matches_titles_case_insensitively() {
        let source = MockRecipeSource::with_sample_catalog();
        let results = source.search("stir fry", 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Vegetable Stir Fry");
    }

    #[tokio::test]
    async fn mock_search_without_matches_is_empty_and_not_an_error() {
        let source = MockRecipeSource::with_sample_catalog();
        let results = source.search("ostrich egg", 10).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn mock_details_for_unknown_id_is_not_found() {
        let source = MockRecipeSource::with_sample_catalog();
        assert!(matches!(
            source.details(999).await,
            Err(RecipeError::NotFound(999))
        ));
    }
}
