//! Subgraph client for the indexed borrower list.

use alloy::primitives::Address;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Default page size; The Graph caps `first` at 1000.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

const USERS_QUERY: &str = r#"query Users($first: Int!, $lastId: ID!) {
  users(first: $first, where: { id_gt: $lastId }, orderBy: id, orderDirection: asc) {
    id
  }
}"#;

/// Errors from the indexer.
#[derive(Debug, Error)]
pub enum SubgraphError {
    #[error("subgraph request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("subgraph returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("subgraph query error: {0}")]
    Query(String),

    #[error("subgraph response has no data")]
    MissingData,

    #[error("invalid user id '{0}'")]
    InvalidId(String),
}

/// Source of borrower addresses to evaluate.
#[async_trait]
pub trait UserSource: Send + Sync {
    /// Fetch the ordered user list.
    async fn fetch_users(&self) -> Result<Vec<Address>, SubgraphError>;
}

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: UsersVariables,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UsersVariables {
    first: usize,
    last_id: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<UsersData>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct UsersData {
    users: Vec<UserEntry>,
}

#[derive(Debug, Deserialize)]
struct UserEntry {
    id: String,
}

/// Subgraph client with cache-first semantics: the first successful user
/// list is kept and returned by later calls without a re-fetch.
#[derive(Clone)]
pub struct SubgraphClient {
    client: reqwest::Client,
    url: String,
    page_size: usize,
    max_users: Option<usize>,
    /// Endpoint -> cached user list
    cache: Arc<DashMap<String, Vec<Address>>>,
}

impl std::fmt::Debug for SubgraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubgraphClient")
            .field("url", &self.url)
            .field("page_size", &self.page_size)
            .field("max_users", &self.max_users)
            .field("cached", &self.cache.contains_key(&self.url))
            .finish()
    }
}

impl SubgraphClient {
    /// Create a new client for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            page_size: DEFAULT_PAGE_SIZE,
            max_users: None,
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Set the page size (clamped to 1..=1000).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, DEFAULT_PAGE_SIZE);
        self
    }

    /// Cap the number of users returned.
    pub fn with_max_users(mut self, max_users: Option<usize>) -> Self {
        self.max_users = max_users;
        self
    }

    /// Drop the cached user list so the next call re-queries the indexer.
    pub fn clear_cache(&self) {
        self.cache.remove(&self.url);
    }

    async fn fetch_page(&self, last_id: &str) -> Result<Vec<Address>, SubgraphError> {
        let request = GraphQlRequest {
            query: USERS_QUERY,
            variables: UsersVariables {
                first: self.page_size,
                last_id: last_id.to_string(),
            },
        };

        let response = self.client.post(&self.url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubgraphError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: GraphQlResponse = response.json().await?;
        parse_users(body)
    }

    async fn fetch_all(&self) -> Result<Vec<Address>, SubgraphError> {
        let mut users: Vec<Address> = Vec::new();
        let mut last_id = String::new();

        loop {
            let page = self.fetch_page(&last_id).await?;
            let page_len = page.len();
            debug!(page_len, cursor = %last_id, "Fetched user page");

            if let Some(last) = page.last() {
                last_id = format!("{last:#x}");
            }
            users.extend(page);

            if page_len < self.page_size || self.reached_cap(users.len()) {
                break;
            }
        }

        if let Some(max) = self.max_users {
            users.truncate(max);
        }
        Ok(users)
    }

    fn reached_cap(&self, count: usize) -> bool {
        self.max_users.is_some_and(|max| count >= max)
    }
}

#[async_trait]
impl UserSource for SubgraphClient {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch_users(&self) -> Result<Vec<Address>, SubgraphError> {
        if let Some(cached) = self.cache.get(&self.url) {
            debug!(count = cached.len(), "Using cached user list");
            return Ok(cached.clone());
        }

        let users = self.fetch_all().await?;
        info!(count = users.len(), "Fetched users from subgraph");

        self.cache.insert(self.url.clone(), users.clone());
        Ok(users)
    }
}

/// Turn a GraphQL response into addresses, surfacing query errors.
fn parse_users(body: GraphQlResponse) -> Result<Vec<Address>, SubgraphError> {
    if let Some(errors) = body.errors.filter(|e| !e.is_empty()) {
        let message = errors
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(SubgraphError::Query(message));
    }

    let data = body.data.ok_or(SubgraphError::MissingData)?;
    data.users
        .into_iter()
        .map(|u| u.id.parse().map_err(|_| SubgraphError::InvalidId(u.id)))
        .collect()
}
