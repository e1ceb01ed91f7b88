//! Request and response types for the remote list store and recipe search
//!
//! All interfaces are JSON over HTTP; field names follow the server's
//! camelCase convention.

use serde::{Deserialize, Serialize};

use crate::models::{Recipe, UserId};

/// Full list contents, returned by `GET /api/users/:userId/:category`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<E> {
    pub items: Vec<E>,
}

/// Acknowledgement for mutating calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of `POST /api/:category/add`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest<E> {
    pub user_id: UserId,
    pub item: E,
}

/// Body of `POST /api/:category/remove`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemRequest {
    pub user_id: UserId,
    pub name: String,
}

/// Body of `POST /api/:category/check-item`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckItemRequest {
    pub user_id: UserId,
    pub name: String,
    pub checked: bool,
}

/// Body of `POST /api/:category/clear`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearRequest {
    pub user_id: UserId,
}

/// Response of `GET /api/recipes/search`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<Recipe>,
}
