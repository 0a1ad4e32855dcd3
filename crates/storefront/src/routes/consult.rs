//! Consultation CRM route handlers.
//!
//! Consultation leads go to the workspace database rather than the data
//! store, so the team follows up where they already work. Both routes are
//! no-ops returning 503 when the CRM integration is not configured.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::notion::{ConsultLead, NotionClient};
use crate::state::AppState;

/// Consultation lead request body.
#[derive(Debug, Deserialize)]
pub struct CreateConsultRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
}

fn notion_client(state: &AppState) -> Result<&NotionClient> {
    state
        .notion()
        .ok_or_else(|| AppError::Unavailable("상담 기능이 설정되지 않았습니다.".to_string()))
}

/// Save a consultation lead.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateConsultRequest>,
) -> Result<impl IntoResponse> {
    let notion = notion_client(&state)?;

    let name = body.name.trim();
    let email = body.email.trim();
    let phone = body.phone.trim();

    if name.is_empty() || email.is_empty() || phone.is_empty() {
        return Err(AppError::BadRequest(
            "이름, 이메일, 전화번호를 모두 입력해주세요.".to_string(),
        ));
    }

    notion.create_lead(name, email, phone).await?;
    Ok((StatusCode::CREATED, Json(json!({ "saved": true }))))
}

/// List recent consultation leads.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ConsultLead>>> {
    let notion = notion_client(&state)?;
    let leads = notion.list_consult_leads().await?;
    Ok(Json(leads))
}
