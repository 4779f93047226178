//! # tradepost-stores
//!
//! The three passive data stores orchestrated by the Settlement Engine:
//!
//! 1. **`BalanceStore`**: each account's current spendable amount
//! 2. **`ItemStore`**: per-item sale status — the single source of truth
//!    for whether an item can be purchased
//! 3. **`OrderStore`**: order headers plus line items, with a unique index
//!    on the order number (the idempotency key)
//!
//! Each store only ever mutates its own entities. Multi-store consistency
//! is the Settlement Engine's job; the stores merely guarantee that every
//! individual operation is all-or-nothing and that concurrent use is
//! serialized by `&mut` exclusivity.

pub mod balance_store;
pub mod item_store;
pub mod order_store;

pub use balance_store::BalanceStore;
pub use item_store::ItemStore;
pub use order_store::OrderStore;
