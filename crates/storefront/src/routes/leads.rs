//! Free-trial lead route handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::supabase::types::NewLead;

/// Lead signup request body.
#[derive(Debug, Deserialize)]
pub struct CreateLeadRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Store a free-trial signup.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateLeadRequest>,
) -> Result<impl IntoResponse> {
    let name = body.name.trim().to_string();
    let email = body.email.trim().to_string();
    let phone = body.phone.trim().to_string();

    if name.is_empty() || email.is_empty() || phone.is_empty() {
        return Err(AppError::BadRequest(
            "이름, 이메일, 전화번호를 모두 입력해주세요.".to_string(),
        ));
    }

    let lead = state
        .store()
        .submit_lead(&NewLead { name, email, phone })
        .await?;

    Ok((StatusCode::CREATED, Json(lead)))
}
