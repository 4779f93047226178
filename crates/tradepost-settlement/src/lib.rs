//! # tradepost-settlement
//!
//! The **Settlement Engine**: the one component allowed to touch more than
//! one store per request. Given a purchase request it validates the
//! preconditions, computes the fee-inclusive total, and applies the
//! order / inventory / ledger mutations as a single atomic unit. Given a
//! cancellation it reverses exactly the mutations the forward path applied
//! — a compensating transaction, not a generic undo log.
//!
//! ## Atomicity model
//!
//! All mutating operations take `&mut self`, so the engine is a single
//! writer: no other mutation can interleave between a precondition check
//! and the write it gates. Every fallible step is either checked before
//! the first write or, if it fails anyway, unwinds the writes already
//! applied before returning. Callers that need cross-thread sharing wrap
//! the engine in `Arc<Mutex<_>>` — the recommended baseline of one
//! in-flight mutating transaction at a time.

pub mod conservation;
pub mod engine;

pub use conservation::ConservationLedger;
pub use engine::{PaymentTiming, PurchaseRequest, SettlementEngine, SettlementReceipt};
