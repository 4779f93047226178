//! System-wide constants for the Tradepost settlement core.

/// Decimal places for all committed monetary amounts.
pub const AMOUNT_SCALE: u32 = 2;

/// Default platform service fee, in basis points (500 = 5%).
///
/// The fee is charged on top of the listed price: the buyer pays
/// `price * (1 + fee)`, the seller receives `price`, and the platform
/// retains the remainder.
pub const DEFAULT_SERVICE_FEE_BPS: u32 = 500;

/// Opening balance granted to newly registered accounts, in minor units
/// (cents). Matches the legacy campus-marketplace default of 200.00.
pub const DEFAULT_OPENING_BALANCE_CENTS: i64 = 20_000;

/// Prefix for generated order numbers.
pub const ORDER_NO_PREFIX: &str = "ORD";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Tradepost";
