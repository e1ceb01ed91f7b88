//! HTTP implementation of the remote list store

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use groceryly_common::api::{
    AckResponse, AddItemRequest, CheckItemRequest, ClearRequest, ListResponse, RemoveItemRequest,
};
use groceryly_common::models::{Category, ListEntry, UserId};

use super::{ListStore, StoreError};

const USER_AGENT: &str = concat!("Groceryly/", env!("CARGO_PKG_VERSION"));

/// List store backed by the Groceryly server's JSON API
pub struct HttpListStore {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpListStore {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, StoreError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// POST a JSON body and interpret the server's acknowledgement
    async fn post_ack<B: Serialize>(&self, url: &str, body: &B) -> Result<(), StoreError> {
        let response = self
            .http_client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Api(status.as_u16()));
        }

        let ack: AckResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        if ack.success {
            Ok(())
        } else {
            Err(StoreError::Rejected(
                ack.message.unwrap_or_else(|| "unspecified".to_string()),
            ))
        }
    }
}

#[async_trait]
impl<E> ListStore<E> for HttpListStore
where
    E: ListEntry + Serialize + DeserializeOwned,
{
    async fn fetch(&self, user: &UserId, category: Category) -> Result<Vec<E>, StoreError> {
        let url = self.endpoint(&format!("users/{}/{}", user, category.as_str()));
        debug!(user = %user, category = %category.as_str(), "Fetching list");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Api(status.as_u16()));
        }

        let body: ListResponse<E> = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        Ok(body.items)
    }

    async fn add(&self, user: &UserId, category: Category, entry: &E) -> Result<(), StoreError> {
        let url = self.endpoint(&format!("{}/add", category.as_str()));
        debug!(user = %user, category = %category.as_str(), name = %entry.name(), "Adding item");

        self.post_ack(
            &url,
            &AddItemRequest {
                user_id: user.clone(),
                item: entry.clone(),
            },
        )
        .await
    }

    async fn remove(
        &self,
        user: &UserId,
        category: Category,
        name: &str,
    ) -> Result<(), StoreError> {
        let url = self.endpoint(&format!("{}/remove", category.as_str()));
        debug!(user = %user, category = %category.as_str(), name = %name, "Removing item");

        self.post_ack(
            &url,
            &RemoveItemRequest {
                user_id: user.clone(),
                name: name.to_string(),
            },
        )
        .await
    }

    async fn set_checked(
        &self,
        user: &UserId,
        category: Category,
        name: &str,
        checked: bool,
    ) -> Result<(), StoreError> {
        let url = self.endpoint(&format!("{}/check-item", category.as_str()));
        debug!(user = %user, name = %name, checked = checked, "Updating checked flag");

        self.post_ack(
            &url,
            &CheckItemRequest {
                user_id: user.clone(),
                name: name.to_string(),
                checked,
            },
        )
        .await
    }

    async fn clear(&self, user: &UserId, category: Category) -> Result<(), StoreError> {
        let url = self.endpoint(&format!("{}/clear", category.as_str()));
        debug!(user = %user, category = %category.as_str(), "Clearing list");

        self.post_ack(
            &url,
            &ClearRequest {
                user_id: user.clone(),
            },
        )
        .await
    }
}
