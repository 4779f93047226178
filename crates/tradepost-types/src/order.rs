//! Order types: header, line items, and the order lifecycle.
//!
//! Order lines snapshot the item's attributes at commit time, so later
//! edits or delisting of the item never alter historical order data.
//! Orders are never physically deleted; cancellation is a status
//! transition, not removal.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, Item, ItemId, OrderId, OrderNo};

/// Lifecycle status of an order.
///
/// ```text
/// PENDING_PAYMENT ──pay──▶ PAID ──complete──▶ COMPLETED
///        │                  │
///        └────cancel────────┴──▶ CANCELLED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    PendingPayment,
    Paid,
    Cancelled,
    Completed,
}

impl OrderStatus {
    /// Whether an order in this state may still be cancelled.
    /// COMPLETED and CANCELLED orders are final.
    #[must_use]
    pub fn cancellable(self) -> bool {
        matches!(self, Self::PendingPayment | Self::Paid)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PendingPayment => write!(f, "PENDING_PAYMENT"),
            Self::Paid => write!(f, "PAID"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// Campus delivery address attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryInfo {
    pub building: String,
    pub room: String,
    pub phone: String,
}

/// Order header. Lines live alongside it in an [`OrderRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Caller-supplied idempotency / display key. Unique across all orders.
    pub order_no: OrderNo,
    pub buyer: AccountId,
    /// Amount the buyer pays: line prices plus the platform service fee.
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub delivery: DeliveryInfo,
    /// Free-form payment method tag from the upstream layer (e.g. "WALLET").
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// One line of an order, snapshotting the item at time of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_id: ItemId,
    pub seller: AccountId,
    /// Item price at commit time. The seller is credited exactly this.
    pub price: Decimal,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub cover: String,
}

impl OrderLine {
    /// Snapshot an item into a line. Copies the descriptive fields so the
    /// order history survives later edits or delisting.
    #[must_use]
    pub fn snapshot_of(item: &Item) -> Self {
        Self {
            item_id: item.id,
            seller: item.seller,
            price: item.price,
            title: item.title.clone(),
            author: item.author.clone(),
            isbn: item.isbn.clone(),
            cover: item.cover.clone(),
        }
    }
}

/// A complete order: header plus its one-or-more lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}
