//! Order and pending-order lifecycle statuses.

use serde::{Deserialize, Serialize};

/// Status of a finalized order.
///
/// Orders are only ever written after a successful payment confirmation, so
/// the single `DONE` state is the only one the store contains. The enum
/// exists so the wire value stays typed rather than stringly checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "DONE")]
    Done,
}

impl OrderStatus {
    /// The wire representation stored in the `orders` collection.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Done => "DONE",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claim status of a pending order.
///
/// `Pending` records are claimable by a finalization run; `Processing`
/// records are held by an in-flight run. The conditional transition
/// `Pending -> Processing` is what keeps a duplicated gateway redirect from
/// producing two orders: only one concurrent run wins the claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingOrderStatus {
    #[default]
    Pending,
    Processing,
}

impl PendingOrderStatus {
    /// The wire representation stored in the `pending_orders` collection.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
        }
    }
}

impl std::fmt::Display for PendingOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_format() {
        assert_eq!(serde_json::to_string(&OrderStatus::Done).unwrap(), "\"DONE\"");
        let back: OrderStatus = serde_json::from_str("\"DONE\"").unwrap();
        assert_eq!(back, OrderStatus::Done);
    }

    #[test]
    fn test_pending_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&PendingOrderStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&PendingOrderStatus::Processing).unwrap(),
            "\"processing\""
        );
    }

    #[test]
    fn test_pending_status_default_is_claimable() {
        assert_eq!(PendingOrderStatus::default(), PendingOrderStatus::Pending);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(OrderStatus::Done.to_string(), "DONE");
        assert_eq!(PendingOrderStatus::Processing.to_string(), "processing");
    }
}
