//! Configuration for the Tradepost settlement core.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants;

/// Settlement configuration: the fee schedule and account defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementConfig {
    /// Platform service fee rate charged on top of the listed price
    /// (0.05 = 5%). The seller is credited only the listed price; the
    /// remainder is retained by the platform.
    pub service_fee_rate: Decimal,
    /// Balance granted to newly opened accounts.
    pub opening_balance: Decimal,
}

impl SettlementConfig {
    /// Total the buyer pays for an item: `price * (1 + fee)`, rounded to
    /// [`constants::AMOUNT_SCALE`] decimal places.
    #[must_use]
    pub fn total_with_fee(&self, price: Decimal) -> Decimal {
        (price * (Decimal::ONE + self.service_fee_rate)).round_dp(constants::AMOUNT_SCALE)
    }

    /// The platform-retained portion of the total for an item.
    #[must_use]
    pub fn platform_fee(&self, price: Decimal) -> Decimal {
        self.total_with_fee(price) - price
    }
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            service_fee_rate: Decimal::new(i64::from(constants::DEFAULT_SERVICE_FEE_BPS), 4),
            opening_balance: Decimal::new(
                constants::DEFAULT_OPENING_BALANCE_CENTS,
                constants::AMOUNT_SCALE,
            ),
        }
    }
}
