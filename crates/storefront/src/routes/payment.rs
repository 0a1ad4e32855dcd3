//! Payment redirect route handlers.
//!
//! The gateway's hosted checkout UI redirects back here: `/payment/success`
//! with `paymentKey`, `orderId`, and `amount` query parameters, or
//! `/payment/fail` with an error code. The success parameters are untrusted
//! input - the finalizer cross-checks the amount against the stored pending
//! order before anything else happens.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::services::checkout::{CallbackParams, CheckoutReceipt};
use crate::state::AppState;
use crate::toss::codes;

/// Success-redirect query parameters, exactly as the gateway sends them.
#[derive(Debug, Deserialize)]
pub struct SuccessParams {
    #[serde(rename = "paymentKey")]
    pub payment_key: Option<String>,
    #[serde(rename = "orderId")]
    pub order_id: Option<String>,
    pub amount: Option<String>,
}

/// Failure-redirect query parameters.
#[derive(Debug, Deserialize)]
pub struct FailParams {
    pub code: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "orderId")]
    pub order_id: Option<String>,
}

/// Failure page payload.
#[derive(Debug, Serialize)]
pub struct FailResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

/// Confirm the charge and finalize the order.
#[instrument(skip(state, user_id, params), fields(user_id = %user_id.0))]
pub async fn success(
    State(state): State<AppState>,
    user_id: AuthenticatedUser,
    Query(params): Query<SuccessParams>,
) -> Result<Json<CheckoutReceipt>> {
    let receipt = state
        .checkout()
        .finalize(CallbackParams {
            payment_key: params.payment_key,
            order_id: params.order_id,
            amount: params.amount,
        })
        .await?;

    Ok(Json(receipt))
}

/// Render a friendly message for a gateway failure redirect.
#[instrument(skip(params))]
pub async fn fail(Query(params): Query<FailParams>) -> Json<FailResponse> {
    info!(
        code = params.code.as_deref().unwrap_or("-"),
        order_id = params.order_id.as_deref().unwrap_or("-"),
        "payment failed at gateway"
    );

    Json(FailResponse {
        message: friendly_gateway_message(params.code.as_deref(), params.message.as_deref()),
        code: params.code,
        order_id: params.order_id,
    })
}

/// Map gateway error codes to user-friendly messages.
fn friendly_gateway_message(code: Option<&str>, fallback: Option<&str>) -> String {
    match code {
        None => "결제가 실패했습니다.".to_string(),
        Some(codes::PAY_PROCESS_CANCELED) => "결제가 취소되었습니다.".to_string(),
        Some(codes::PAY_PROCESS_ABORTED) => "결제가 중단되었습니다.".to_string(),
        Some(codes::REJECT_CARD_COMPANY) => {
            "카드사에서 결제를 거절했습니다. 카드 정보를 확인해주세요.".to_string()
        }
        Some(_) => fallback
            .unwrap_or("결제 처리 중 오류가 발생했습니다.")
            .to_string(),
    }
}
