use crate::types::{OrderId, TransactionId};
use serde::{Serialize, Deserialize};

/// Identifiers for a purchase started through the Steam overlay.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub struct PurchaseResult {
    /// The order ID.
    pub order_id: OrderId,
    /// The transaction ID.
    pub transaction_id: TransactionId,
}
