//! Toss Payments confirmation API client.
//!
//! The hosted checkout UI, card entry, and charge authorization all happen
//! on the processor's side; this module only submits the final server-side
//! confirmation call and relays the processor's verdict. The amounts and
//! statuses it returns are authoritative - callers must prefer them over any
//! locally remembered value.

mod client;

pub use client::TossClient;

use chrono::{DateTime, FixedOffset, Utc};
use face_calendar_core::{Amount, OrderId, PaymentKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable error codes the processor returns on rejected charges.
///
/// Callers branch on these to tell a user cancellation from a card rejection.
pub mod codes {
    /// The customer cancelled inside the hosted checkout UI.
    pub const PAY_PROCESS_CANCELED: &str = "PAY_PROCESS_CANCELED";
    /// The payment process was aborted.
    pub const PAY_PROCESS_ABORTED: &str = "PAY_PROCESS_ABORTED";
    /// The card issuer declined the charge.
    pub const REJECT_CARD_COMPANY: &str = "REJECT_CARD_COMPANY";
}

/// Errors that can occur while confirming a payment.
#[derive(Debug, Error)]
pub enum TossError {
    /// Request rejected before any network call.
    #[error("invalid payment approval request: {0}")]
    Validation(String),

    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The processor explicitly rejected or cancelled the charge.
    #[error("{message} (코드: {code})")]
    Gateway { code: String, message: String },

    /// The processor's response did not match the expected shape.
    #[error("parse error: {0}")]
    Parse(String),
}

impl TossError {
    /// The processor's machine-readable error code, when present.
    #[must_use]
    pub fn gateway_code(&self) -> Option<&str> {
        match self {
            Self::Gateway { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// A payment confirmation request.
///
/// `amount` must already have passed the amount-integrity check against the
/// pending order before this is submitted.
#[derive(Debug, Clone)]
pub struct ApprovalRequest {
    pub payment_key: PaymentKey,
    pub order_id: OrderId,
    pub amount: Amount,
}

/// The processor's confirmation verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentApproval {
    pub payment_key: PaymentKey,
    pub order_id: OrderId,
    /// Processor status, `"DONE"` on a completed charge
    pub status: String,
    /// The amount actually charged - ground truth, not the quoted amount
    pub total_amount: Amount,
    #[serde(default = "approved_now")]
    pub approved_at: DateTime<FixedOffset>,
}

/// Fallback when the processor omits `approvedAt`.
fn approved_now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}

/// Error body returned by the processor on a rejected charge.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct GatewayErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display_format() {
        let err = TossError::Gateway {
            code: codes::PAY_PROCESS_CANCELED.to_string(),
            message: "결제가 취소되었습니다.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "결제가 취소되었습니다. (코드: PAY_PROCESS_CANCELED)"
        );
        assert_eq!(err.gateway_code(), Some("PAY_PROCESS_CANCELED"));
    }

    #[test]
    fn test_validation_error_has_no_gateway_code() {
        let err = TossError::Validation("paymentKey is required".to_string());
        assert_eq!(err.gateway_code(), None);
    }

    #[test]
    fn test_approval_deserializes_camel_case() {
        let json = r#"{
            "paymentKey": "pk_123",
            "orderId": "order_1",
            "status": "DONE",
            "totalAmount": 50000,
            "approvedAt": "2026-08-05T12:00:00+09:00"
        }"#;

        let approval: PaymentApproval = serde_json::from_str(json).unwrap();
        assert_eq!(approval.payment_key, PaymentKey::new("pk_123"));
        assert_eq!(approval.total_amount, Amount::won(50000));
        assert_eq!(approval.status, "DONE");
    }

    #[test]
    fn test_approval_defaults_missing_approved_at() {
        let json = r#"{
            "paymentKey": "pk_123",
            "orderId": "order_1",
            "status": "DONE",
            "totalAmount": 50000
        }"#;

        // Must not fail to parse; the timestamp is filled in locally
        let approval: PaymentApproval = serde_json::from_str(json).unwrap();
        assert_eq!(approval.total_amount, Amount::won(50000));
    }
}
