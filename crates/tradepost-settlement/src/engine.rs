//! The settlement transaction script.
//!
//! `settle` converts a purchase request into a consistent set of changes
//! across buyer balance, seller balance, item availability, and the order
//! record — all committed or all rejected. `cancel` reverses exactly the
//! effects a prior settlement applied, and only those that were actually
//! applied given the order's status.
//!
//! Ordering inside the atomic unit: every fallible precondition is checked
//! before the first write, the item-status re-check rides on the
//! `mark_sold` write itself (the double-sale race guard), and the order
//! status is written last so that an impossible mid-sequence failure can
//! still unwind cleanly. Unwind targets were all verified live under the
//! same `&mut` borrow, so compensation writes cannot fail.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tradepost_stores::{BalanceStore, ItemStore, OrderStore};
use tradepost_types::{
    AccountId, DeliveryInfo, Item, ItemId, ItemStatus, Order, OrderId, OrderLine, OrderNo,
    OrderRecord, OrderStatus, Result, SettlementConfig, TradepostError,
};

use crate::conservation::ConservationLedger;

/// When funds move relative to order creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentTiming {
    /// "Buy now": the order is created PAID and funds move in the same
    /// atomic unit. The default path.
    #[default]
    Immediate,
    /// The order is created PENDING_PAYMENT with the item reserved; funds
    /// move later via [`SettlementEngine::pay`].
    Deferred,
}

/// Input contract for [`SettlementEngine::settle`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRequest {
    /// Authenticated by the upstream layer; the engine trusts the identity.
    pub buyer: AccountId,
    pub item: ItemId,
    pub delivery: DeliveryInfo,
    pub payment_method: String,
    /// Client-supplied idempotency key.
    pub order_no: OrderNo,
    pub timing: PaymentTiming,
}

/// What a successful settlement returns to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    pub order_id: OrderId,
    pub order_no: OrderNo,
    pub total_amount: Decimal,
}

/// The orchestrator. Owns the three stores; all mutating operations take
/// `&mut self`, serializing every settlement and cancellation behind a
/// single writer.
#[derive(Debug, Default)]
pub struct SettlementEngine {
    balances: BalanceStore,
    items: ItemStore,
    orders: OrderStore,
    config: SettlementConfig,
    conservation: ConservationLedger,
}

impl SettlementEngine {
    /// Create an engine with the given configuration and empty stores.
    #[must_use]
    pub fn new(config: SettlementConfig) -> Self {
        Self {
            balances: BalanceStore::new(),
            items: ItemStore::new(),
            orders: OrderStore::new(),
            config,
            conservation: ConservationLedger::new(),
        }
    }

    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    pub fn conservation(&self) -> &ConservationLedger {
        &self.conservation
    }

    // =================================================================
    // Account / item facade (thin pass-throughs for the upstream layer)
    // =================================================================

    /// Open an account with the configured opening balance.
    pub fn open_account(&mut self) -> AccountId {
        self.open_account_with(self.config.opening_balance)
    }

    /// Open an account with an explicit opening balance.
    pub fn open_account_with(&mut self, opening_balance: Decimal) -> AccountId {
        self.conservation.record_deposit(opening_balance);
        self.balances.open_account(opening_balance)
    }

    /// Deposit external funds into an account.
    pub fn deposit(&mut self, account: AccountId, amount: Decimal) -> Result<()> {
        self.balances.deposit(account, amount)?;
        self.conservation.record_deposit(amount);
        Ok(())
    }

    /// Current balance of an account.
    pub fn balance(&self, account: AccountId) -> Result<Decimal> {
        self.balances.balance(account)
    }

    /// List an item for sale on behalf of `seller`.
    ///
    /// # Errors
    /// - [`TradepostError::AccountNotFound`] if the seller is unknown
    /// - [`TradepostError::InvalidListing`] if the price is not positive
    pub fn list_item(
        &mut self,
        seller: AccountId,
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
        cover: impl Into<String>,
        price: Decimal,
    ) -> Result<ItemId> {
        self.balances.balance(seller)?;
        if price <= Decimal::ZERO {
            return Err(TradepostError::InvalidListing {
                reason: format!("price must be positive, got {price}"),
            });
        }
        let item = Item {
            id: ItemId::new(),
            seller,
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            cover: cover.into(),
            price,
            status: ItemStatus::Available,
            deleted: false,
            created_at: Utc::now(),
        };
        Ok(self.items.list(item))
    }

    /// Look up an item (delisted items are invisible).
    pub fn item(&self, item: ItemId) -> Result<Item> {
        self.items.get(item).cloned()
    }

    /// Delist an item. Only the seller may delist, and only while the item
    /// is unsold. A non-owner gets NotFound, not a hint that the item exists.
    pub fn delist_item(&mut self, item: ItemId, requester: AccountId) -> Result<()> {
        if self.items.get(item)?.seller != requester {
            return Err(TradepostError::ItemNotFound(item));
        }
        self.items.delist(item)
    }

    // =================================================================
    // Settlement
    // =================================================================

    /// Settle a purchase: one atomic unit covering order creation, the
    /// item's AVAILABLE→SOLD transition, buyer debit, and seller credit.
    ///
    /// The buyer pays `price * (1 + service_fee_rate)`; the seller receives
    /// `price`; the platform retains the remainder, credited to no account.
    ///
    /// # Errors
    /// - [`TradepostError::ItemUnavailable`] — item missing, delisted, or
    ///   not AVAILABLE (including losing the race to a concurrent sale)
    /// - [`TradepostError::DuplicateOrderNo`] — order number already used
    /// - [`TradepostError::AccountNotFound`] — buyer or seller unknown
    /// - [`TradepostError::InsufficientBalance`] — immediate timing only
    ///
    /// On any error, no partial mutation remains observable.
    pub fn settle(&mut self, req: PurchaseRequest) -> Result<SettlementReceipt> {
        // --- Preconditions, all before the first write. ---
        let item = match self.items.get(req.item) {
            Ok(item) if item.purchasable() => item.clone(),
            Ok(item) => return Err(TradepostError::ItemUnavailable(item.id)),
            Err(TradepostError::ItemNotFound(_)) => {
                return Err(TradepostError::ItemUnavailable(req.item));
            }
            Err(err) => return Err(err),
        };
        if self.orders.order_no_taken(&req.order_no) {
            return Err(TradepostError::DuplicateOrderNo(req.order_no));
        }

        let total = self.config.total_with_fee(item.price);
        let available = self.balances.balance(req.buyer)?;
        if req.timing == PaymentTiming::Immediate {
            if available < total {
                return Err(TradepostError::InsufficientBalance {
                    needed: total,
                    available,
                });
            }
            // The credit target must be live before we move anything.
            self.balances.balance(item.seller)?;
        }

        // --- Mutations. ---
        let now = Utc::now();
        let order = Order {
            id: OrderId::new(),
            order_no: req.order_no.clone(),
            buyer: req.buyer,
            total_amount: total,
            status: match req.timing {
                PaymentTiming::Immediate => OrderStatus::Paid,
                PaymentTiming::Deferred => OrderStatus::PendingPayment,
            },
            delivery: req.delivery,
            payment_method: req.payment_method,
            created_at: now,
            paid_at: (req.timing == PaymentTiming::Immediate).then_some(now),
            cancelled_at: None,
            completed_at: None,
        };
        let line = OrderLine::snapshot_of(&item);
        let order_id = self.orders.create(order, vec![line])?;

        // Commit-time race guard: the AVAILABLE check rides on the write.
        if let Err(err) = self.items.mark_sold(req.item) {
            self.orders.remove_uncommitted(order_id);
            return Err(match err {
                TradepostError::ItemSold(_) | TradepostError::ItemNotFound(_) => {
                    TradepostError::ItemUnavailable(req.item)
                }
                other => other,
            });
        }

        if req.timing == PaymentTiming::Immediate {
            if let Err(err) = self.balances.adjust(req.buyer, -total) {
                let _ = self.items.mark_available(req.item);
                self.orders.remove_uncommitted(order_id);
                return Err(err);
            }
            if let Err(err) = self.balances.adjust(item.seller, item.price) {
                let _ = self.balances.adjust(req.buyer, total);
                let _ = self.items.mark_available(req.item);
                self.orders.remove_uncommitted(order_id);
                return Err(err);
            }
            self.conservation.record_fee(total - item.price);
        }

        tracing::info!(
            order_id = %order_id,
            order_no = %req.order_no,
            buyer = %req.buyer,
            item = %req.item,
            total = %total,
            timing = ?req.timing,
            "settlement committed"
        );
        Ok(SettlementReceipt {
            order_id,
            order_no: req.order_no,
            total_amount: total,
        })
    }

    /// Complete payment of a PENDING_PAYMENT order: debit the buyer, credit
    /// each line's seller, transition to PAID.
    ///
    /// # Errors
    /// - [`TradepostError::OrderNotFound`] — absent or not the requester's
    /// - [`TradepostError::InvalidOrderState`] — not PENDING_PAYMENT
    /// - [`TradepostError::InsufficientBalance`]
    pub fn pay(&mut self, order: OrderId, requester: AccountId) -> Result<()> {
        let record = self.owned(order, requester)?;
        if record.order.status != OrderStatus::PendingPayment {
            return Err(TradepostError::InvalidOrderState {
                status: record.order.status,
                action: "paid",
            });
        }
        let total = record.order.total_amount;
        let lines = record.lines.clone();

        let available = self.balances.balance(requester)?;
        if available < total {
            return Err(TradepostError::InsufficientBalance {
                needed: total,
                available,
            });
        }
        for line in &lines {
            self.balances.balance(line.seller)?;
        }

        self.balances.adjust(requester, -total)?;
        for (i, line) in lines.iter().enumerate() {
            if let Err(err) = self.balances.adjust(line.seller, line.price) {
                for done in &lines[..i] {
                    let _ = self.balances.adjust(done.seller, -done.price);
                }
                let _ = self.balances.adjust(requester, total);
                return Err(err);
            }
        }
        if let Err(err) = self.orders.set_status(order, OrderStatus::Paid) {
            for line in &lines {
                let _ = self.balances.adjust(line.seller, -line.price);
            }
            let _ = self.balances.adjust(requester, total);
            return Err(err);
        }

        let price_sum: Decimal = lines.iter().map(|l| l.price).sum();
        self.conservation.record_fee(total - price_sum);
        tracing::info!(order_id = %order, buyer = %requester, total = %total, "deferred order paid");
        Ok(())
    }

    /// Cancel an order — the compensating transaction.
    ///
    /// Reverses exactly what the forward path applied: inventory is always
    /// released; the ledger is reversed only if the order had reached PAID
    /// (for PENDING_PAYMENT no funds ever moved). The fee returns to the
    /// buyer as part of the total.
    ///
    /// # Errors
    /// - [`TradepostError::OrderNotFound`] — absent or not the requester's
    /// - [`TradepostError::InvalidOrderState`] — already CANCELLED or
    ///   COMPLETED
    pub fn cancel(&mut self, order: OrderId, requester: AccountId) -> Result<()> {
        let record = self.owned(order, requester)?;
        let status = record.order.status;
        if !status.cancellable() {
            return Err(TradepostError::InvalidOrderState {
                status,
                action: "cancelled",
            });
        }
        let was_paid = status == OrderStatus::Paid;
        let total = record.order.total_amount;
        let lines = record.lines.clone();

        // Release inventory.
        for (i, line) in lines.iter().enumerate() {
            if let Err(err) = self.items.mark_available(line.item_id) {
                for done in &lines[..i] {
                    let _ = self.items.mark_sold(done.item_id);
                }
                return Err(err);
            }
        }

        // Reverse the ledger, restoring pre-purchase balances exactly.
        if was_paid {
            if let Err(err) = self.balances.adjust(requester, total) {
                for line in &lines {
                    let _ = self.items.mark_sold(line.item_id);
                }
                return Err(err);
            }
            for (i, line) in lines.iter().enumerate() {
                if let Err(err) = self.balances.adjust(line.seller, -line.price) {
                    for done in &lines[..i] {
                        let _ = self.balances.adjust(done.seller, done.price);
                    }
                    let _ = self.balances.adjust(requester, -total);
                    for line in &lines {
                        let _ = self.items.mark_sold(line.item_id);
                    }
                    return Err(err);
                }
            }
        }

        // Status flips last; everything above has an exact inverse.
        if let Err(err) = self.orders.set_status(order, OrderStatus::Cancelled) {
            if was_paid {
                for line in &lines {
                    let _ = self.balances.adjust(line.seller, line.price);
                }
                let _ = self.balances.adjust(requester, -total);
            }
            for line in &lines {
                let _ = self.items.mark_sold(line.item_id);
            }
            return Err(err);
        }

        if was_paid {
            let price_sum: Decimal = lines.iter().map(|l| l.price).sum();
            self.conservation.record_fee_reversal(total - price_sum);
        }
        tracing::info!(
            order_id = %order,
            buyer = %requester,
            was_paid,
            "order cancelled"
        );
        Ok(())
    }

    /// Mark a PAID order as completed (buyer confirms receipt). Completed
    /// orders can never be cancelled.
    ///
    /// # Errors
    /// - [`TradepostError::OrderNotFound`] — absent or not the requester's
    /// - [`TradepostError::InvalidOrderState`] — not PAID
    pub fn complete(&mut self, order: OrderId, requester: AccountId) -> Result<()> {
        let record = self.owned(order, requester)?;
        if record.order.status != OrderStatus::Paid {
            return Err(TradepostError::InvalidOrderState {
                status: record.order.status,
                action: "completed",
            });
        }
        self.orders.set_status(order, OrderStatus::Completed)
    }

    // =================================================================
    // Read-only views
    // =================================================================

    /// Fetch an order with its lines. Buyer-only visibility: a requester
    /// who is not the buyer gets NotFound, never a foreign order.
    pub fn get_order(&self, order: OrderId, requester: AccountId) -> Result<OrderRecord> {
        self.owned(order, requester).cloned()
    }

    /// All orders placed by the requester, newest first.
    #[must_use]
    pub fn orders_for_buyer(&self, requester: AccountId) -> Vec<OrderRecord> {
        self.orders
            .orders_for_buyer(requester)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Check the money conservation invariant against the current balances.
    pub fn verify_conservation(&self) -> Result<()> {
        self.conservation.verify(self.balances.total_balances())
    }

    /// Ownership re-verification: the order must exist *and* belong to the
    /// requester. The upstream layer authenticates the identity; the engine
    /// never trusts a caller-supplied role claim.
    fn owned(&self, order: OrderId, requester: AccountId) -> Result<&OrderRecord> {
        let record = self.orders.get(order)?;
        if record.order.buyer != requester {
            return Err(TradepostError::OrderNotFound(order));
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn engine() -> SettlementEngine {
        SettlementEngine::new(SettlementConfig::default())
    }

    fn request(buyer: AccountId, item: ItemId, no: &str) -> PurchaseRequest {
        PurchaseRequest {
            buyer,
            item,
            delivery: DeliveryInfo {
                building: "B7".to_string(),
                room: "119".to_string(),
                phone: "555-0100".to_string(),
            },
            payment_method: "WALLET".to_string(),
            order_no: OrderNo::from(no),
            timing: PaymentTiming::Immediate,
        }
    }

    /// Buyer 100.00, item 50.00 at 5% fee -> pays 52.50, seller +50.00.
    #[test]
    fn settle_moves_funds_and_inventory() {
        let mut eng = engine();
        let buyer = eng.open_account_with(dec(10_000));
        let seller = eng.open_account_with(Decimal::ZERO);
        let item = eng
            .list_item(seller, "SICP", "Abelson", "978-0262510875", "", dec(5_000))
            .unwrap();

        let receipt = eng.settle(request(buyer, item, "ORD-1")).unwrap();
        assert_eq!(receipt.total_amount, dec(5_250));

        assert_eq!(eng.balance(buyer).unwrap(), dec(4_750));
        assert_eq!(eng.balance(seller).unwrap(), dec(5_000));
        assert_eq!(eng.item(item).unwrap().status, ItemStatus::Sold);

        let record = eng.get_order(receipt.order_id, buyer).unwrap();
        assert_eq!(record.order.status, OrderStatus::Paid);
        assert_eq!(record.lines[0].price, dec(5_000));
        assert!(record.order.paid_at.is_some());

        assert_eq!(eng.conservation().fees_retained(), dec(250));
        eng.verify_conservation().unwrap();
    }

    #[test]
    fn settle_insufficient_balance_leaves_no_trace() {
        let mut eng = engine();
        let buyer = eng.open_account_with(dec(1_000));
        let seller = eng.open_account_with(Decimal::ZERO);
        let item = eng
            .list_item(seller, "SICP", "Abelson", "isbn", "", dec(5_000))
            .unwrap();

        let err = eng.settle(request(buyer, item, "ORD-1")).unwrap_err();
        assert!(
            matches!(err, TradepostError::InsufficientBalance { needed, available }
                if needed == dec(5_250) && available == dec(1_000))
        );

        // Byte-for-byte as before: balance intact, item still AVAILABLE,
        // order number free.
        assert_eq!(eng.balance(buyer).unwrap(), dec(1_000));
        assert!(eng.item(item).unwrap().purchasable());
        assert!(eng.orders_for_buyer(buyer).is_empty());
        eng.verify_conservation().unwrap();
    }

    #[test]
    fn settle_sold_item_unavailable() {
        let mut eng = engine();
        let first = eng.open_account_with(dec(10_000));
        let second = eng.open_account_with(dec(10_000));
        let seller = eng.open_account_with(Decimal::ZERO);
        let item = eng
            .list_item(seller, "TAPL", "Pierce", "isbn", "", dec(3_000))
            .unwrap();

        eng.settle(request(first, item, "ORD-1")).unwrap();
        let err = eng.settle(request(second, item, "ORD-2")).unwrap_err();
        assert!(matches!(err, TradepostError::ItemUnavailable(i) if i == item));
        assert_eq!(eng.balance(second).unwrap(), dec(10_000));
    }

    #[test]
    fn settle_missing_or_delisted_item_unavailable() {
        let mut eng = engine();
        let buyer = eng.open_account_with(dec(10_000));
        let seller = eng.open_account_with(Decimal::ZERO);

        let ghost = ItemId::new();
        let err = eng.settle(request(buyer, ghost, "ORD-g")).unwrap_err();
        assert!(matches!(err, TradepostError::ItemUnavailable(_)));

        let item = eng
            .list_item(seller, "HtDP", "Felleisen", "isbn", "", dec(2_000))
            .unwrap();
        eng.delist_item(item, seller).unwrap();
        let err = eng.settle(request(buyer, item, "ORD-d")).unwrap_err();
        assert!(matches!(err, TradepostError::ItemUnavailable(_)));
    }

    #[test]
    fn duplicate_order_no_rejected() {
        let mut eng = engine();
        let buyer = eng.open_account_with(dec(20_000));
        let seller = eng.open_account_with(Decimal::ZERO);
        let a = eng
            .list_item(seller, "A", "A", "isbn-a", "", dec(1_000))
            .unwrap();
        let b = eng
            .list_item(seller, "B", "B", "isbn-b", "", dec(1_000))
            .unwrap();

        eng.settle(request(buyer, a, "ORD-same")).unwrap();
        let err = eng.settle(request(buyer, b, "ORD-same")).unwrap_err();
        assert!(matches!(err, TradepostError::DuplicateOrderNo(_)));
        // The second item was not touched.
        assert!(eng.item(b).unwrap().purchasable());
    }

    #[test]
    fn cancel_paid_restores_everything() {
        let mut eng = engine();
        let buyer = eng.open_account_with(dec(10_000));
        let seller = eng.open_account_with(dec(500));
        let item = eng
            .list_item(seller, "PLAI", "Krishnamurthi", "isbn", "", dec(5_000))
            .unwrap();

        let receipt = eng.settle(request(buyer, item, "ORD-1")).unwrap();
        eng.cancel(receipt.order_id, buyer).unwrap();

        assert_eq!(eng.balance(buyer).unwrap(), dec(10_000));
        assert_eq!(eng.balance(seller).unwrap(), dec(500));
        assert!(eng.item(item).unwrap().purchasable());

        let record = eng.get_order(receipt.order_id, buyer).unwrap();
        assert_eq!(record.order.status, OrderStatus::Cancelled);
        assert!(record.order.cancelled_at.is_some());

        assert_eq!(eng.conservation().fees_retained(), Decimal::ZERO);
        eng.verify_conservation().unwrap();
    }

    #[test]
    fn cancel_twice_invalid_state() {
        let mut eng = engine();
        let buyer = eng.open_account_with(dec(10_000));
        let seller = eng.open_account_with(Decimal::ZERO);
        let item = eng
            .list_item(seller, "EOPL", "Friedman", "isbn", "", dec(4_000))
            .unwrap();

        let receipt = eng.settle(request(buyer, item, "ORD-1")).unwrap();
        eng.cancel(receipt.order_id, buyer).unwrap();

        let err = eng.cancel(receipt.order_id, buyer).unwrap_err();
        assert!(matches!(
            err,
            TradepostError::InvalidOrderState {
                status: OrderStatus::Cancelled,
                action: "cancelled",
            }
        ));
    }

    #[test]
    fn cancel_by_non_buyer_is_not_found() {
        let mut eng = engine();
        let buyer = eng.open_account_with(dec(10_000));
        let stranger = eng.open_account_with(dec(10_000));
        let seller = eng.open_account_with(Decimal::ZERO);
        let item = eng
            .list_item(seller, "CTM", "Van Roy", "isbn", "", dec(2_500))
            .unwrap();

        let receipt = eng.settle(request(buyer, item, "ORD-1")).unwrap();
        let err = eng.cancel(receipt.order_id, stranger).unwrap_err();
        assert!(matches!(err, TradepostError::OrderNotFound(_)));
        // Nothing reversed.
        assert_eq!(
            eng.get_order(receipt.order_id, buyer).unwrap().order.status,
            OrderStatus::Paid
        );
    }

    #[test]
    fn completed_order_cannot_be_cancelled() {
        let mut eng = engine();
        let buyer = eng.open_account_with(dec(10_000));
        let seller = eng.open_account_with(Decimal::ZERO);
        let item = eng
            .list_item(seller, "K&R", "Kernighan", "isbn", "", dec(1_500))
            .unwrap();

        let receipt = eng.settle(request(buyer, item, "ORD-1")).unwrap();
        eng.complete(receipt.order_id, buyer).unwrap();

        let err = eng.cancel(receipt.order_id, buyer).unwrap_err();
        assert!(matches!(
            err,
            TradepostError::InvalidOrderState {
                status: OrderStatus::Completed,
                ..
            }
        ));
    }

    #[test]
    fn deferred_order_reserves_without_moving_funds() {
        let mut eng = engine();
        let buyer = eng.open_account_with(dec(1_000)); // cannot afford yet
        let seller = eng.open_account_with(Decimal::ZERO);
        let item = eng
            .list_item(seller, "AIMA", "Russell", "isbn", "", dec(5_000))
            .unwrap();

        let mut req = request(buyer, item, "ORD-1");
        req.timing = PaymentTiming::Deferred;
        let receipt = eng.settle(req).unwrap();

        // Item reserved, no funds moved, no balance requirement.
        assert!(!eng.item(item).unwrap().purchasable());
        assert_eq!(eng.balance(buyer).unwrap(), dec(1_000));
        assert_eq!(eng.balance(seller).unwrap(), Decimal::ZERO);
        let record = eng.get_order(receipt.order_id, buyer).unwrap();
        assert_eq!(record.order.status, OrderStatus::PendingPayment);
        assert!(record.order.paid_at.is_none());
        eng.verify_conservation().unwrap();
    }

    #[test]
    fn pay_completes_a_deferred_order() {
        let mut eng = engine();
        let buyer = eng.open_account_with(dec(1_000));
        let seller = eng.open_account_with(Decimal::ZERO);
        let item = eng
            .list_item(seller, "AIMA", "Russell", "isbn", "", dec(5_000))
            .unwrap();

        let mut req = request(buyer, item, "ORD-1");
        req.timing = PaymentTiming::Deferred;
        let receipt = eng.settle(req).unwrap();

        // Not enough yet.
        let err = eng.pay(receipt.order_id, buyer).unwrap_err();
        assert!(matches!(err, TradepostError::InsufficientBalance { .. }));
        assert_eq!(eng.balance(buyer).unwrap(), dec(1_000));

        eng.deposit(buyer, dec(10_000)).unwrap();
        eng.pay(receipt.order_id, buyer).unwrap();

        assert_eq!(eng.balance(buyer).unwrap(), dec(5_750));
        assert_eq!(eng.balance(seller).unwrap(), dec(5_000));
        assert_eq!(
            eng.get_order(receipt.order_id, buyer).unwrap().order.status,
            OrderStatus::Paid
        );
        eng.verify_conservation().unwrap();

        // Paying twice is an illegal transition.
        let err = eng.pay(receipt.order_id, buyer).unwrap_err();
        assert!(matches!(err, TradepostError::InvalidOrderState { .. }));
    }

    #[test]
    fn cancel_pending_releases_inventory_only() {
        let mut eng = engine();
        let buyer = eng.open_account_with(dec(1_000));
        let seller = eng.open_account_with(Decimal::ZERO);
        let item = eng
            .list_item(seller, "AIMA", "Russell", "isbn", "", dec(5_000))
            .unwrap();

        let mut req = request(buyer, item, "ORD-1");
        req.timing = PaymentTiming::Deferred;
        let receipt = eng.settle(req).unwrap();
        eng.cancel(receipt.order_id, buyer).unwrap();

        assert!(eng.item(item).unwrap().purchasable());
        assert_eq!(eng.balance(buyer).unwrap(), dec(1_000));
        assert_eq!(eng.balance(seller).unwrap(), Decimal::ZERO);
        eng.verify_conservation().unwrap();
    }

    #[test]
    fn get_order_enforces_buyer_visibility() {
        let mut eng = engine();
        let buyer = eng.open_account_with(dec(10_000));
        let stranger = eng.open_account_with(Decimal::ZERO);
        let seller = eng.open_account_with(Decimal::ZERO);
        let item = eng
            .list_item(seller, "GEB", "Hofstadter", "isbn", "", dec(3_500))
            .unwrap();

        let receipt = eng.settle(request(buyer, item, "ORD-1")).unwrap();
        assert!(eng.get_order(receipt.order_id, buyer).is_ok());
        assert!(matches!(
            eng.get_order(receipt.order_id, stranger).unwrap_err(),
            TradepostError::OrderNotFound(_)
        ));
    }

    #[test]
    fn receipt_serde_roundtrip() {
        let receipt = SettlementReceipt {
            order_id: OrderId::new(),
            order_no: OrderNo::from("ORD-json"),
            total_amount: dec(5_250),
        };
        let json = serde_json::to_string(&receipt).unwrap();
        let back: SettlementReceipt = serde_json::from_str(&json).unwrap();
        assert_eq!(receipt, back);
    }

    #[test]
    fn listing_validation() {
        let mut eng = engine();
        let seller = eng.open_account_with(Decimal::ZERO);

        let err = eng
            .list_item(seller, "Free", "Nobody", "isbn", "", Decimal::ZERO)
            .unwrap_err();
        assert!(matches!(err, TradepostError::InvalidListing { .. }));

        let err = eng
            .list_item(AccountId::new(), "X", "Y", "isbn", "", dec(100))
            .unwrap_err();
        assert!(matches!(err, TradepostError::AccountNotFound(_)));
    }
}
