//! Item model: a second-hand listing with an availability status.
//!
//! The item's `status` is the single source of truth for whether it can be
//! purchased. Status transitions are owned exclusively by the Settlement
//! Engine; sellers only ever list and delist.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, ItemId};

/// Sale status of a listed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemStatus {
    Available,
    Sold,
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "AVAILABLE"),
            Self::Sold => write!(f, "SOLD"),
        }
    }
}

/// A listed item. Owned by its seller for display purposes; availability
/// transitions belong to the Settlement Engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub seller: AccountId,
    pub title: String,
    pub author: String,
    /// External identifier (ISBN for books).
    pub isbn: String,
    /// Cover image URL, empty when the seller uploaded none.
    pub cover: String,
    /// Listed price. Always positive.
    pub price: Decimal,
    pub status: ItemStatus,
    /// Soft-delete flag: delisted items are retained but not purchasable.
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Whether this item can currently be purchased.
    #[must_use]
    pub fn purchasable(&self) -> bool {
        !self.deleted && self.status == ItemStatus::Available
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Item {
    pub fn dummy(seller: AccountId, price: Decimal) -> Self {
        Self {
            id: ItemId::new(),
            seller,
            title: "Linear Algebra Done Right".to_string(),
            author: "Axler".to_string(),
            isbn: "978-3319110790".to_string(),
            cover: String::new(),
            price,
            status: ItemStatus::Available,
            deleted: false,
            created_at: Utc::now(),
        }
    }
}
