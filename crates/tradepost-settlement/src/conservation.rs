//! Money conservation invariant checker.
//!
//! Invariant after every committed operation:
//! ```text
//! Σ(account balances) + retained fees == Σ(deposits)
//! ```
//!
//! Settlement moves `total` out of the buyer, `price` into the seller, and
//! books the difference as a retained platform fee; cancellation of a paid
//! order reverses all three. If the equation ever fails to hold, something
//! has gone catastrophically wrong and the error is not a business-rule
//! rejection.

use rust_decimal::Decimal;
use tradepost_types::{Result, TradepostError};

/// Tracks deposits and retained fees, and validates conservation on demand.
#[derive(Debug, Default)]
pub struct ConservationLedger {
    /// Total money ever deposited into the marketplace.
    deposits: Decimal,
    /// Platform fees retained from committed settlements, net of reversals.
    fees_retained: Decimal,
}

impl ConservationLedger {
    /// Create a new ledger with zero totals.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record money entering the marketplace (account opening, deposit).
    pub fn record_deposit(&mut self, amount: Decimal) {
        self.deposits += amount;
    }

    /// Record a platform fee retained by a committed settlement.
    pub fn record_fee(&mut self, amount: Decimal) {
        self.fees_retained += amount;
    }

    /// Record a fee returned to the buyer by a cancellation reversal.
    pub fn record_fee_reversal(&mut self, amount: Decimal) {
        self.fees_retained -= amount;
    }

    /// Fees currently retained by the platform.
    #[must_use]
    pub fn fees_retained(&self) -> Decimal {
        self.fees_retained
    }

    /// Expected sum of all account balances: deposits minus retained fees.
    #[must_use]
    pub fn expected_balances(&self) -> Decimal {
        self.deposits - self.fees_retained
    }

    /// Verify that the actual balance sum matches the expectation.
    ///
    /// # Errors
    /// Returns [`TradepostError::ConservationViolation`] if actual ≠ expected.
    pub fn verify(&self, actual_balances: Decimal) -> Result<()> {
        let expected = self.expected_balances();
        if actual_balances != expected {
            return Err(TradepostError::ConservationViolation {
                reason: format!(
                    "actual balance sum {actual_balances} != expected {expected} \
                     (deposits={}, fees_retained={})",
                    self.deposits, self.fees_retained
                ),
            });
        }
        Ok(())
    }
}
