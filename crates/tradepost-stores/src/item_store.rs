//! Item availability store.
//!
//! `mark_sold` is the double-sale race guard: it refuses unless the item is
//! currently AVAILABLE, so of two competing settlements at most one can
//! flip the status. `mark_available` exists only for cancellation reversal.

use std::collections::HashMap;

use tradepost_types::{Item, ItemId, ItemStatus, Result, TradepostError};

/// Holds every listed item and its sale status.
#[derive(Debug, Default)]
pub struct ItemStore {
    items: HashMap<ItemId, Item>,
}

impl ItemStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
        }
    }

    /// Insert a freshly listed item.
    pub fn list(&mut self, item: Item) -> ItemId {
        let id = item.id;
        self.items.insert(id, item);
        id
    }

    /// Look up an item.
    ///
    /// # Errors
    /// Returns [`TradepostError::ItemNotFound`] if the item does not exist
    /// or has been delisted.
    pub fn get(&self, item: ItemId) -> Result<&Item> {
        self.items
            .get(&item)
            .filter(|i| !i.deleted)
            .ok_or(TradepostError::ItemNotFound(item))
    }

    /// Flip the item to SOLD. Refuses unless the current status is
    /// AVAILABLE — this re-check at write time is what makes concurrent
    /// double-sale impossible.
    ///
    /// # Errors
    /// - [`TradepostError::ItemNotFound`] if missing or delisted
    /// - [`TradepostError::ItemSold`] if the status is not AVAILABLE
    pub fn mark_sold(&mut self, item: ItemId) -> Result<()> {
        let entry = self
            .items
            .get_mut(&item)
            .filter(|i| !i.deleted)
            .ok_or(TradepostError::ItemNotFound(item))?;
        if entry.status != ItemStatus::Available {
            return Err(TradepostError::ItemSold(item));
        }
        entry.status = ItemStatus::Sold;
        Ok(())
    }

    /// Flip the item back to AVAILABLE. Used only by cancellation reversal.
    ///
    /// # Errors
    /// Returns [`TradepostError::ItemNotFound`] if the item does not exist.
    pub fn mark_available(&mut self, item: ItemId) -> Result<()> {
        let entry = self
            .items
            .get_mut(&item)
            .ok_or(TradepostError::ItemNotFound(item))?;
        entry.status = ItemStatus::Available;
        Ok(())
    }

    /// Soft-delete a listing. Sold items cannot be delisted — their order
    /// history still points at them and a cancellation may yet revive them.
    ///
    /// # Errors
    /// - [`TradepostError::ItemNotFound`] if missing or already delisted
    /// - [`TradepostError::ItemSold`] if the status is SOLD
    pub fn delist(&mut self, item: ItemId) -> Result<()> {
        let entry = self
            .items
            .get_mut(&item)
            .filter(|i| !i.deleted)
            .ok_or(TradepostError::ItemNotFound(item))?;
        if entry.status == ItemStatus::Sold {
            return Err(TradepostError::ItemSold(item));
        }
        entry.deleted = true;
        Ok(())
    }
}
