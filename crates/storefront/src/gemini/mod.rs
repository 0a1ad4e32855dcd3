//! Gemini chat adapter for the consultation widget.
//!
//! The chatbot's role and guardrails live in a fixed system instruction;
//! conversation history is relayed as-is. All inference happens on the
//! provider side - this module only shapes the request and unwraps the
//! first candidate's text.

use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::GeminiConfig;

/// Generative language API base URL.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Fixed consultation-bot system instruction.
const SYSTEM_PROMPT: &str = "\
너는 페이스 캘린더의 상담 챗봇이야.
역할: 사용자의 피부 고민을 친절하고 명확하게 파악하고, 사진 없이도 질문을 통해 정보를 수집해 적절한 루틴/제품/다음 단계 안내를 제공한다.
원칙:
- 모르면 솔직히 모른다고 말하고, 필요한 정보를 질문으로 수집한다.
- 과도한 의학적 진단/치료 주장 금지. 전문 상담이 필요한 경우는 적절히 안내한다.
- 답변은 간결한 문장과 불릿을 섞어 체계적으로 제공한다.";

/// Errors that can occur while generating a chat reply.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the response.
    #[error("parse error: {0}")]
    Parse(String),

    /// The model returned no usable candidate text.
    #[error("empty response from model")]
    Empty,
}

/// Conversation roles as the widget sends them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
    System,
}

/// One message of conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a new client from injected configuration.
    #[must_use]
    pub fn new(config: &GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    /// Generate a reply for the given conversation history.
    ///
    /// Empty messages and `system`-role entries are dropped; the system
    /// instruction is fixed server-side and cannot be overridden by clients.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, an API error response, or when
    /// the model returns no candidate text.
    #[instrument(skip(self, messages), fields(count = messages.len(), model = %self.model))]
    pub async fn generate(&self, messages: &[ChatMessage]) -> Result<String, GeminiError> {
        let contents: Vec<serde_json::Value> = messages
            .iter()
            .filter(|m| m.role != ChatRole::System && !m.content.trim().is_empty())
            .map(|m| {
                json!({
                    "role": wire_role(m.role),
                    "parts": [{ "text": m.content }],
                })
            })
            .collect();

        let url = format!(
            "{GEMINI_API_BASE}/models/{}:generateContent",
            urlencoding::encode(&self.model)
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .header(CONTENT_TYPE, "application/json")
            .json(&json!({
                "system_instruction": { "parts": [{ "text": SYSTEM_PROMPT }] },
                "contents": contents,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(500)
                .collect();
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))?;

        let reply = body
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .filter(|text| !text.is_empty())
            .ok_or(GeminiError::Empty)?;

        debug!(chars = reply.len(), "chat reply generated");
        Ok(reply)
    }
}

/// Map widget roles onto the two wire roles the API accepts.
const fn wire_role(role: ChatRole) -> &'static str {
    match role {
        ChatRole::Model => "model",
        ChatRole::User | ChatRole::System => "user",
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}
