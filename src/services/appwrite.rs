use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::models::UserPreference;
use crate::services::traits::{StoreError, UserSource};

/// Attribute and value marking a profile that finished onboarding
const PROFILE_STATE_ATTRIBUTE: &str = "profileState";
const PROFILE_STATE_COMPLETED: &str = "completed";

const DEFAULT_PAGE_SIZE: usize = 100;

/// Errors that can occur when interacting with Appwrite
#[derive(Debug, Error)]
pub enum AppwriteError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Collection IDs in Appwrite
#[derive(Debug, Clone)]
pub struct AppwriteCollections {
    pub user_preferences: String,
}

/// Appwrite API client
///
/// Reads user matching preferences from the profile database. Only
/// completed profiles are requested; documents that fail to parse are
/// skipped with a warning rather than failing the whole read.
pub struct AppwriteClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    client: Client,
    collections: AppwriteCollections,
    page_size: usize,
}

impl AppwriteClient {
    /// Create a new Appwrite client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collections: AppwriteCollections,
        timeout_secs: u64,
    ) -> Result<Self, AppwriteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            project_id,
            database_id,
            client,
            collections,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Fetch every completed user preference document, following pagination
    pub async fn list_completed_preferences(&self) -> Result<Vec<UserPreference>, AppwriteError> {
        let mut preferences = Vec::new();
        let mut offset = 0usize;

        loop {
            let (documents, total) = self.fetch_page(offset).await?;
            let fetched = documents.len();

            for doc in documents {
                let data = doc.get("data").unwrap_or(&doc);
                match serde_json::from_value::<UserPreference>(data.clone()) {
                    Ok(prefs) => preferences.push(prefs),
                    Err(e) => {
                        let id = doc.get("$id").and_then(|v| v.as_str()).unwrap_or("unknown");
                        tracing::warn!("Skipping malformed preference document {}: {}", id, e);
                    }
                }
            }

            offset += fetched;
            if fetched < self.page_size || offset as u64 >= total {
                break;
            }
        }

        tracing::debug!("Loaded {} completed user preferences", preferences.len());

        Ok(preferences)
    }

    async fn fetch_page(&self, offset: usize) -> Result<(Vec<Value>, u64), AppwriteError> {
        let queries = [
            format!("equal(\"{}\", [\"{}\"])", PROFILE_STATE_ATTRIBUTE, PROFILE_STATE_COMPLETED),
            format!("limit({})", self.page_size),
            format!("offset({})", offset),
        ];

        let query_string = queries
            .iter()
            .map(|q| format!("queries[]={}", urlencoding::encode(q)))
            .collect::<Vec<_>>()
            .join("&");

        let url = format!(
            "{}/databases/{}/collections/{}/documents?{}",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            self.collections.user_preferences,
            query_string
        );

        tracing::debug!("Fetching preferences page at offset {}", offset);

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AppwriteError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to list preferences: {} - {}", status, body);
            return Err(AppwriteError::ApiError(format!(
                "Failed to list preferences: {}",
                status
            )));
        }

        let mut json: Value = response.json().await?;

        let total = json.get("total").and_then(|t| t.as_u64()).unwrap_or(0);

        let documents = match json.get_mut("documents").map(Value::take) {
            Some(Value::Array(documents)) => documents,
            _ => return Err(AppwriteError::InvalidResponse("Missing documents array".into())),
        };

        Ok((documents, total))
    }
}

#[async_trait]
impl UserSource for AppwriteClient {
    async fn completed_users(&self) -> Result<Vec<UserPreference>, StoreError> {
        Ok(self.list_completed_preferences().await?)
    }
}
