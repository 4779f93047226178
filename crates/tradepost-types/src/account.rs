//! Account model: per-user spendable balance.
//!
//! Balances are mutated only by the Settlement Engine's debit/credit
//! operations, never by direct external writes. Immediately after any
//! committed settlement, every balance is >= 0.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::AccountId;

/// A user account holding a spendable balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Current spendable amount. Fixed-point decimal, never negative
    /// after a committed settlement.
    pub balance: Decimal,
    /// Soft-delete flag: closed accounts are retained but invisible.
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Open a fresh account with the given opening balance.
    #[must_use]
    pub fn open(opening_balance: Decimal) -> Self {
        Self {
            id: AccountId::new(),
            balance: opening_balance,
            deleted: false,
            created_at: Utc::now(),
        }
    }
}
