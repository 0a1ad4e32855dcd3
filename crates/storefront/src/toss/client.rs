//! HTTP client for the payment confirmation endpoint.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, instrument};

use crate::config::TossConfig;

use super::{ApprovalRequest, GatewayErrorBody, PaymentApproval, TossError};

/// Confirmation endpoint of the payment processor.
const CONFIRM_URL: &str = "https://api.tosspayments.com/v1/payments/confirm";

/// Client for the Toss Payments confirmation API.
///
/// Authenticates with HTTP Basic using the server-held secret key (the key
/// followed by a colon, base64-encoded). The encoded header is kept wrapped
/// so it never shows up in debug output.
#[derive(Clone)]
pub struct TossClient {
    client: reqwest::Client,
    authorization: SecretString,
    confirm_url: String,
}

impl std::fmt::Debug for TossClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TossClient")
            .field("authorization", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl TossClient {
    /// Create a new client from injected configuration.
    #[must_use]
    pub fn new(config: &TossConfig) -> Self {
        let encoded = BASE64.encode(format!("{}:", config.secret_key.expose_secret()));

        Self {
            client: reqwest::Client::new(),
            authorization: SecretString::from(format!("Basic {encoded}")),
            confirm_url: CONFIRM_URL.to_string(),
        }
    }

    /// Confirm a charge with the processor.
    ///
    /// Validates all inputs before spending a network call. On success the
    /// returned `total_amount` and `status` are the processor's authoritative
    /// values.
    ///
    /// # Errors
    ///
    /// - `TossError::Validation` - missing/non-positive input, no network call
    /// - `TossError::Http` - transport failure
    /// - `TossError::Gateway` - the processor rejected the charge; carries
    ///   its machine-readable code
    /// - `TossError::Parse` - unexpected success-response shape
    #[instrument(
        skip(self, request),
        fields(order_id = %request.order_id, amount = request.amount.as_won())
    )]
    pub async fn approve_payment(
        &self,
        request: &ApprovalRequest,
    ) -> Result<PaymentApproval, TossError> {
        if request.payment_key.is_empty() {
            return Err(TossError::Validation("paymentKey is required".to_string()));
        }
        if request.order_id.is_empty() {
            return Err(TossError::Validation("orderId is required".to_string()));
        }
        if !request.amount.is_positive() {
            return Err(TossError::Validation("amount must be positive".to_string()));
        }

        debug!("approving payment");

        let response = self
            .client
            .post(&self.confirm_url)
            .header(AUTHORIZATION, self.authorization.expose_secret())
            .json(&serde_json::json!({
                "paymentKey": request.payment_key,
                "orderId": request.order_id,
                "amount": request.amount.as_won(),
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // The error body is best-effort; missing fields get the
            // processor-documented fallbacks
            let body: GatewayErrorBody = response.json().await.unwrap_or_default();
            let code = body.code.unwrap_or_else(|| "UNKNOWN_ERROR".to_string());
            let message = body
                .message
                .unwrap_or_else(|| "결제 승인 중 오류가 발생했습니다.".to_string());

            error!(status = %status, code = %code, "payment approval rejected");
            return Err(TossError::Gateway { code, message });
        }

        let approval: PaymentApproval = response
            .json()
            .await
            .map_err(|e| TossError::Parse(e.to_string()))?;

        debug!(
            status = %approval.status,
            total_amount = approval.total_amount.as_won(),
            "payment approved"
        );
        Ok(approval)
    }
}
