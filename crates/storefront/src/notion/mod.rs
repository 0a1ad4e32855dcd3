//! Notion API client for consultation leads and chat logging.
//!
//! The workspace database doubles as a lightweight CRM: consultation leads
//! land there as pages, and chat-widget messages are appended for follow-up.
//! Nothing in the checkout core depends on this module; every caller treats
//! logging failures as non-fatal.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::NotionConfig;

/// Notion API base URL.
const NOTION_API_BASE: &str = "https://api.notion.com/v1";

/// Pinned Notion API version.
const NOTION_VERSION: &str = "2022-06-28";

/// Page size for lead listings.
const LEAD_PAGE_SIZE: u32 = 20;

/// Errors that can occur when talking to the Notion API.
#[derive(Debug, Error)]
pub enum NotionError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to build the client or parse a response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// A consultation lead read back from the database.
#[derive(Debug, Clone, Serialize)]
pub struct ConsultLead {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Notion API client.
#[derive(Clone)]
pub struct NotionClient {
    client: reqwest::Client,
    database_id: String,
}

impl std::fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionClient")
            .field("database_id", &self.database_id)
            .finish_non_exhaustive()
    }
}

impl NotionClient {
    /// Create a new Notion API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &NotionConfig) -> Result<Self, NotionError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        let mut auth = HeaderValue::from_str(&auth_value)
            .map_err(|e| NotionError::Parse(format!("invalid API key format: {e}")))?;
        auth.set_sensitive(true);
        headers.insert("Authorization", auth);

        headers.insert("Notion-Version", HeaderValue::from_static(NOTION_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            database_id: config.database_id.clone(),
        })
    }

    /// Create a lead page with name/email/phone properties.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, email, phone))]
    pub async fn create_lead(
        &self,
        name: &str,
        email: &str,
        phone: &str,
    ) -> Result<(), NotionError> {
        let body = json!({
            "parent": { "database_id": self.database_id },
            "properties": {
                "name": { "title": [{ "text": { "content": name } }] },
                "phone number": { "phone_number": phone },
                "email": { "email": email },
            }
        });

        self.create_page(&body).await?;
        debug!("consultation lead saved");
        Ok(())
    }

    /// Append a chat message to the database.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails. Callers log and move on -
    /// chat logging must never break the conversation.
    #[instrument(skip(self, content), fields(role = %role))]
    pub async fn log_chat_message(&self, role: &str, content: &str) -> Result<(), NotionError> {
        let title = format!("{} 메시지", role.to_uppercase());
        let body = json!({
            "parent": { "database_id": self.database_id },
            "properties": {
                "name": { "title": [{ "text": { "content": title } }] },
                "message": { "rich_text": [{ "text": { "content": content } }] },
                "role": { "rich_text": [{ "text": { "content": role } }] },
            }
        });

        self.create_page(&body).await?;
        debug!("chat message logged");
        Ok(())
    }

    /// List the most recently edited consultation leads.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_consult_leads(&self) -> Result<Vec<ConsultLead>, NotionError> {
        let url = format!(
            "{NOTION_API_BASE}/databases/{}/query",
            urlencoding::encode(&self.database_id)
        );
        let body = json!({
            "page_size": LEAD_PAGE_SIZE,
            "sorts": [{ "timestamp": "last_edited_time", "direction": "descending" }],
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let response = check_success(response).await?;

        let query: QueryResponse = response
            .json()
            .await
            .map_err(|e| NotionError::Parse(e.to_string()))?;

        let leads = query.results.iter().map(extract_lead).collect::<Vec<_>>();
        debug!(count = leads.len(), "consultation leads listed");
        Ok(leads)
    }

    async fn create_page(&self, body: &serde_json::Value) -> Result<(), NotionError> {
        let url = format!("{NOTION_API_BASE}/pages");
        let response = self.client.post(&url).json(body).send().await?;
        check_success(response).await?;
        Ok(())
    }
}

/// Map non-success responses to `NotionError::Api` with a truncated body.
async fn check_success(response: reqwest::Response) -> Result<reqwest::Response, NotionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(500)
        .collect();
    Err(NotionError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Wrapper for a database query response.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<NotionPage>,
}

/// A page resource; properties stay dynamic because each database defines
/// its own columns.
#[derive(Debug, Deserialize)]
struct NotionPage {
    id: String,
    #[serde(default)]
    properties: serde_json::Value,
}

/// Pull the lead fields out of a page's property bag.
fn extract_lead(page: &NotionPage) -> ConsultLead {
    let name = page
        .properties
        .pointer("/name/title/0/plain_text")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("(이름 없음)")
        .to_string();
    let email = page
        .properties
        .pointer("/email/email")
        .and_then(serde_json::Value::as_str)
        .map(String::from);
    let phone = page
        .properties
        .pointer("/phone number/phone_number")
        .and_then(serde_json::Value::as_str)
        .map(String::from);

    ConsultLead {
        id: page.id.clone(),
        name,
        email,
        phone,
    }
}
