//! Order record store: headers plus line items.
//!
//! The order number carries a uniqueness constraint — the idempotency
//! guard against retried client requests. `set_status` is an unconditional
//! write: the Settlement Engine verifies the state-machine preconditions
//! before calling it, and no other component may call it at all.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use tradepost_types::{
    AccountId, Order, OrderId, OrderLine, OrderNo, OrderRecord, OrderStatus, Result,
    TradepostError,
};

/// Holds every order ever created. Orders are never physically deleted;
/// cancellation is a status transition.
#[derive(Debug, Default)]
pub struct OrderStore {
    orders: HashMap<OrderId, OrderRecord>,
    /// Unique index over order numbers.
    by_no: HashSet<OrderNo>,
}

impl OrderStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            orders: HashMap::new(),
            by_no: HashSet::new(),
        }
    }

    /// Whether an order number is already in use.
    #[must_use]
    pub fn order_no_taken(&self, order_no: &OrderNo) -> bool {
        self.by_no.contains(order_no)
    }

    /// Insert an order header together with all its lines, as one unit.
    ///
    /// # Errors
    /// - [`TradepostError::DuplicateOrderNo`] if the order number exists
    /// - [`TradepostError::Internal`] if `lines` is empty — an order must
    ///   snapshot at least one item
    pub fn create(&mut self, order: Order, lines: Vec<OrderLine>) -> Result<OrderId> {
        if self.by_no.contains(&order.order_no) {
            return Err(TradepostError::DuplicateOrderNo(order.order_no));
        }
        if lines.is_empty() {
            return Err(TradepostError::Internal(format!(
                "order {} created without lines",
                order.id
            )));
        }

        let id = order.id;
        self.by_no.insert(order.order_no.clone());
        tracing::debug!(order_id = %id, order_no = %order.order_no, "order record created");
        self.orders.insert(id, OrderRecord { order, lines });
        Ok(id)
    }

    /// Look up an order with its lines.
    ///
    /// # Errors
    /// Returns [`TradepostError::OrderNotFound`] if absent.
    pub fn get(&self, order: OrderId) -> Result<&OrderRecord> {
        self.orders
            .get(&order)
            .ok_or(TradepostError::OrderNotFound(order))
    }

    /// Unconditioned status write, stamping the matching lifecycle
    /// timestamp. Preconditions (legal transitions, ownership) are the
    /// Settlement Engine's responsibility and are verified before this call.
    ///
    /// # Errors
    /// Returns [`TradepostError::OrderNotFound`] if absent.
    pub fn set_status(&mut self, order: OrderId, status: OrderStatus) -> Result<()> {
        let record = self
            .orders
            .get_mut(&order)
            .ok_or(TradepostError::OrderNotFound(order))?;
        record.order.status = status;
        let now = Utc::now();
        match status {
            OrderStatus::Paid => record.order.paid_at = Some(now),
            OrderStatus::Cancelled => record.order.cancelled_at = Some(now),
            OrderStatus::Completed => record.order.completed_at = Some(now),
            OrderStatus::PendingPayment => {}
        }
        Ok(())
    }

    /// Remove an order that was inserted within the current (still
    /// uncommitted) settlement attempt. Rollback-only: committed orders are
    /// never removed, and the order number is released for reuse.
    pub fn remove_uncommitted(&mut self, order: OrderId) {
        if let Some(record) = self.orders.remove(&order) {
            self.by_no.remove(&record.order.order_no);
        }
    }

    /// All orders placed by a buyer, newest first. UUIDv7 order IDs are
    /// time-ordered, so sorting by ID descending is creation order.
    #[must_use]
    pub fn orders_for_buyer(&self, buyer: AccountId) -> Vec<&OrderRecord> {
        let mut records: Vec<&OrderRecord> = self
            .orders
            .values()
            .filter(|r| r.order.buyer == buyer)
            .collect();
        records.sort_by(|a, b| b.order.id.cmp(&a.order.id));
        records
    }
}
