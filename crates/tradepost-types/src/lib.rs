//! # tradepost-types
//!
//! Shared types, errors, and configuration for the **Tradepost** marketplace
//! settlement core.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`ItemId`], [`OrderId`], [`OrderNo`]
//! - **Account model**: [`Account`]
//! - **Item model**: [`Item`], [`ItemStatus`]
//! - **Order model**: [`Order`], [`OrderLine`], [`OrderRecord`], [`OrderStatus`], [`DeliveryInfo`]
//! - **Configuration**: [`SettlementConfig`]
//! - **Errors**: [`TradepostError`] with `TP_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod account;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod item;
pub mod order;

// Re-export all primary types at crate root for ergonomic imports:
//   use tradepost_types::{Account, Item, Order, OrderStatus, ...};

pub use account::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use item::*;
pub use order::*;

// Constants are accessed via `tradepost_types::constants::FOO`
// (not re-exported to avoid name collisions).
