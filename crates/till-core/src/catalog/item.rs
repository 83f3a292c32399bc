//! Sellable item type.

use crate::ids::{DisplayRef, ItemKey};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// An item offered in the shop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    /// Display name, with the casing it was created with.
    pub name: String,
    /// Canonical lookup key (case-folded name).
    pub key: ItemKey,
    /// Price per unit.
    pub unit_price: Money,
    /// Units currently in stock.
    pub stock: u32,
    /// Handle to the externally rendered card for this item, if any.
    /// Owned by the rendering collaborator; the catalog only carries it.
    pub display_ref: Option<DisplayRef>,
}

impl Item {
    /// Create a new item. The name is trimmed; its folded form becomes the key.
    pub fn new(name: impl Into<String>, unit_price: Money, stock: u32) -> Self {
        let name = name.into().trim().to_string();
        let key = ItemKey::new(&name);
        Self {
            name,
            key,
            unit_price,
            stock,
            display_ref: None,
        }
    }

    /// Check whether any units are in stock.
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}
