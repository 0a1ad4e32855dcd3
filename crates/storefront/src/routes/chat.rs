//! Consultation chat route handlers.
//!
//! The chat widget posts its full message history. When the client has
//! already run a web search, the hits arrive as `sources` and the last user
//! message is rewritten to ground the reply in them. Both sides of the
//! conversation are mirrored to the CRM when it is configured; that logging
//! is best-effort and never fails the request.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::error::{AppError, Result};
use crate::gemini::{ChatMessage, ChatRole};
use crate::search::SearchResult;
use crate::state::AppState;

/// Chat request body.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub sources: Vec<SearchResult>,
}

/// Chat response body.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Search trigger request body.
#[derive(Debug, Deserialize)]
pub struct SearchTriggerRequest {
    pub query: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

const fn default_max_results() -> usize {
    5
}

/// Search trigger response body.
#[derive(Debug, Serialize)]
pub struct SearchTriggerResponse {
    pub results: Vec<SearchResult>,
}

/// Generate a consultation reply.
#[instrument(skip(state, body), fields(messages = body.messages.len(), sources = body.sources.len()))]
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let Some(gemini) = state.gemini() else {
        return Err(AppError::Unavailable("챗봇이 설정되지 않았습니다.".to_string()));
    };

    let user_message = body
        .messages
        .iter()
        .rev()
        .find(|m| m.role == ChatRole::User)
        .map(|m| m.content.clone());

    let messages = if body.sources.is_empty() {
        body.messages
    } else {
        augment_with_sources(body.messages, &body.sources)
    };

    let reply = gemini.generate(&messages).await?;

    // Mirror the exchange to the CRM; failures are logged, never surfaced
    if let Some(notion) = state.notion() {
        if let Some(content) = &user_message {
            if let Err(e) = notion.log_chat_message("user", content).await {
                warn!("failed to log user chat message: {e}");
            }
        }
        if let Err(e) = notion.log_chat_message("assistant", &reply).await {
            warn!("failed to log assistant chat message: {e}");
        }
    }

    Ok(Json(ChatResponse { reply }))
}

/// Run a web search for chat augmentation.
///
/// Search hits are display-only data: a missing key or provider outage
/// degrades to an empty result list instead of an error.
#[instrument(skip(state, body), fields(max_results = body.max_results))]
pub async fn search_trigger(
    State(state): State<AppState>,
    Json(body): Json<SearchTriggerRequest>,
) -> Json<SearchTriggerResponse> {
    let results = match state.search() {
        None => {
            warn!("search requested but no search key is configured");
            Vec::new()
        }
        Some(client) => match client.search(&body.query, body.max_results).await {
            Ok(results) => results,
            Err(e) => {
                warn!("web search failed: {e}");
                Vec::new()
            }
        },
    };

    Json(SearchTriggerResponse { results })
}

/// Rewrite the last user message to ground the reply in search hits.
fn augment_with_sources(messages: Vec<ChatMessage>, sources: &[SearchResult]) -> Vec<ChatMessage> {
    let block = sources
        .iter()
        .enumerate()
        .map(|(i, r)| format!("[{}] {}\n{}\n{}", i + 1, r.title, r.url, r.snippet))
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut history: Vec<ChatMessage> = messages
        .into_iter()
        .filter(|m| m.role != ChatRole::System)
        .collect();
    let question = history
        .pop()
        .map(|m| m.content)
        .unwrap_or_default();

    history.push(ChatMessage {
        role: ChatRole::User,
        content: format!(
            "사용자 질문:\n{question}\n\n웹 검색 결과:\n{block}\n\n\
             위 웹 검색 결과를 근거로 한국어로 간결하고 체계적으로 답하세요.\n\
             - 과도한 의학적 단정 금지, 불확실하면 추가 질문.\n\
             - 마지막에 출처 링크를 [1] 형식으로 나열."
        ),
    });
    history
}
