//! Error types for the Tradepost settlement core.
//!
//! All errors use the `TP_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Account / balance errors
//! - 2xx: Item errors
//! - 3xx: Order errors
//! - 8xx: Invariant violations
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{AccountId, ItemId, OrderId, OrderNo, OrderStatus};

/// Central error enum for all Tradepost operations.
///
/// Everything except the 8xx/9xx variants is an expected business-rule
/// rejection: the request was refused, no state changed, and the message is
/// suitable for user-facing display by the upstream layer.
#[derive(Debug, Error)]
pub enum TradepostError {
    // =================================================================
    // Account / Balance Errors (1xx)
    // =================================================================
    /// The referenced account does not exist or has been closed.
    #[error("TP_ERR_100: Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Not enough balance to cover the purchase.
    #[error("TP_ERR_101: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },

    /// A balance adjustment would produce a negative value.
    #[error("TP_ERR_102: Balance underflow for account {0}")]
    BalanceUnderflow(AccountId),

    // =================================================================
    // Item Errors (2xx)
    // =================================================================
    /// The referenced item does not exist or has been delisted.
    #[error("TP_ERR_200: Item not found: {0}")]
    ItemNotFound(ItemId),

    /// The item cannot be purchased: missing, delisted, or already sold.
    #[error("TP_ERR_201: Item unavailable: {0}")]
    ItemUnavailable(ItemId),

    /// The item is already sold — a competing mutation won the race.
    #[error("TP_ERR_202: Item already sold: {0}")]
    ItemSold(ItemId),

    /// The listing failed validation (non-positive price, etc.).
    #[error("TP_ERR_203: Invalid listing: {reason}")]
    InvalidListing { reason: String },

    // =================================================================
    // Order Errors (3xx)
    // =================================================================
    /// The requested order was not found (or is not visible to the caller).
    #[error("TP_ERR_300: Order not found: {0}")]
    OrderNotFound(OrderId),

    /// An order with this order number already exists (idempotency guard).
    #[error("TP_ERR_301: Duplicate order number: {0}")]
    DuplicateOrderNo(OrderNo),

    /// The order cannot undergo the requested transition in its current state.
    #[error("TP_ERR_302: Order in state {status} cannot be {action}")]
    InvalidOrderState {
        status: OrderStatus,
        action: &'static str,
    },

    // =================================================================
    // Invariant Violations (8xx)
    // =================================================================
    /// Money conservation invariant violated — critical safety alert.
    #[error("TP_ERR_800: Conservation invariant violation: {reason}")]
    ConservationViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("TP_ERR_900: Internal error: {0}")]
    Internal(String),
}

impl TradepostError {
    /// Whether this error is an expected business-rule rejection (as opposed
    /// to an internal malfunction). Business-rule rejections never leave
    /// partial state and are safe to surface to end users.
    #[must_use]
    pub fn is_business_rule(&self) -> bool {
        !matches!(
            self,
            Self::ConservationViolation { .. } | Self::Internal(_)
        )
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, TradepostError>;
