//! Balance store: per-account spendable amounts.
//!
//! `adjust` deliberately does **not** enforce non-negativity — the
//! precondition (buyer can cover the total) belongs to the Settlement
//! Engine, which checks it before mutating anything. This keeps the store
//! a dumb ledger cell and the correctness argument in one place.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tradepost_types::{Account, AccountId, Result, TradepostError};

/// Holds every account's current balance.
///
/// Atomicity of a single `adjust` relative to concurrent adjustments on the
/// same account comes from `&mut self`: a caller holding the store mutably
/// is the only writer.
#[derive(Debug, Default)]
pub struct BalanceStore {
    accounts: HashMap<AccountId, Account>,
}

impl BalanceStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
        }
    }

    /// Open a new account with the given opening balance.
    pub fn open_account(&mut self, opening_balance: Decimal) -> AccountId {
        let account = Account::open(opening_balance);
        let id = account.id;
        self.accounts.insert(id, account);
        id
    }

    /// Current balance of an account.
    ///
    /// # Errors
    /// Returns [`TradepostError::AccountNotFound`] if the account does not
    /// exist or has been closed.
    pub fn balance(&self, account: AccountId) -> Result<Decimal> {
        self.live(account).map(|a| a.balance)
    }

    /// Apply `balance += delta`; `delta` may be negative.
    ///
    /// # Errors
    /// Returns [`TradepostError::AccountNotFound`] if the account does not
    /// exist or has been closed.
    pub fn adjust(&mut self, account: AccountId, delta: Decimal) -> Result<()> {
        let entry = self
            .accounts
            .get_mut(&account)
            .filter(|a| !a.deleted)
            .ok_or(TradepostError::AccountNotFound(account))?;
        entry.balance += delta;
        Ok(())
    }

    /// Credit an account (deposit from outside the marketplace).
    ///
    /// # Errors
    /// Returns [`TradepostError::AccountNotFound`] if the account does not
    /// exist or has been closed.
    pub fn deposit(&mut self, account: AccountId, amount: Decimal) -> Result<()> {
        self.adjust(account, amount)
    }

    /// Soft-close an account. The row is retained (historical orders still
    /// reference it) but it disappears from reads and rejects adjustments.
    ///
    /// # Errors
    /// Returns [`TradepostError::AccountNotFound`] if the account does not
    /// exist or is already closed.
    pub fn close_account(&mut self, account: AccountId) -> Result<()> {
        let entry = self
            .accounts
            .get_mut(&account)
            .filter(|a| !a.deleted)
            .ok_or(TradepostError::AccountNotFound(account))?;
        entry.deleted = true;
        Ok(())
    }

    /// Sum of all balances, closed accounts included. Used by the
    /// conservation checker: closing an account does not destroy money.
    #[must_use]
    pub fn total_balances(&self) -> Decimal {
        self.accounts.values().map(|a| a.balance).sum()
    }

    fn live(&self, account: AccountId) -> Result<&Account> {
        self.accounts
            .get(&account)
            .filter(|a| !a.deleted)
            .ok_or(TradepostError::AccountNotFound(account))
    }
}
