//! Catalog store and cascade instructions.

use crate::catalog::Item;
use crate::error::ShopError;
use crate::ids::{DisplayRef, ItemKey};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A consistency instruction returned by catalog mutations.
///
/// The catalog never touches carts itself; callers apply the returned
/// cascade to every cart so line quantities stay within stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cascade {
    /// Clamp every cart line for the item to the new stock level,
    /// deleting lines that clamp to zero.
    Clamp { key: ItemKey, stock: u32 },
    /// Drop the item from every cart (the item no longer exists).
    Drop { key: ItemKey },
}

impl Cascade {
    /// The stock ceiling this cascade enforces (zero for a drop).
    pub fn stock_ceiling(&self) -> u32 {
        match self {
            Cascade::Clamp { stock, .. } => *stock,
            Cascade::Drop { .. } => 0,
        }
    }

    /// The item key this cascade applies to.
    pub fn key(&self) -> &ItemKey {
        match self {
            Cascade::Clamp { key, .. } => key,
            Cascade::Drop { key } => key,
        }
    }
}

/// The set of sellable items.
///
/// Items are unique by folded name and iterate in insertion order, so a
/// shop listing renders in the order items were added.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new item.
    ///
    /// Fails with `DuplicateItem` if an item with the same folded name
    /// already exists.
    pub fn add_item(
        &mut self,
        name: impl Into<String>,
        unit_price: Money,
        stock: u32,
    ) -> Result<&Item, ShopError> {
        let item = Item::new(name, unit_price, stock);
        if self.get_by_key(&item.key).is_some() {
            return Err(ShopError::DuplicateItem(item.name));
        }
        let idx = self.items.len();
        self.items.push(item);
        Ok(&self.items[idx])
    }

    /// Remove an item by name.
    ///
    /// Returns the removed item and the cascade the caller must apply:
    /// every cart line for the item becomes invalid and must be dropped.
    pub fn remove_item(&mut self, name: &str) -> Result<(Item, Cascade), ShopError> {
        let key = ItemKey::new(name);
        let pos = self
            .items
            .iter()
            .position(|i| i.key == key)
            .ok_or_else(|| ShopError::ItemNotFound(name.to_string()))?;
        let item = self.items.remove(pos);
        let cascade = Cascade::Drop { key };
        Ok((item, cascade))
    }

    /// Set the stock level for an item by name.
    ///
    /// Returns the cascade the caller must apply: every cart line for the
    /// item is clamped to the new level.
    pub fn set_stock(&mut self, name: &str, stock: u32) -> Result<Cascade, ShopError> {
        let key = ItemKey::new(name);
        self.set_stock_by_key(&key, stock)
            .map_err(|_| ShopError::ItemNotFound(name.to_string()))
    }

    /// Set the stock level for an item by key.
    pub fn set_stock_by_key(&mut self, key: &ItemKey, stock: u32) -> Result<Cascade, ShopError> {
        let item = self
            .items
            .iter_mut()
            .find(|i| &i.key == key)
            .ok_or_else(|| ShopError::ItemNotFound(key.to_string()))?;
        item.stock = stock;
        Ok(Cascade::Clamp {
            key: key.clone(),
            stock,
        })
    }

    /// Attach the rendered card handle for an item.
    pub fn set_display_ref(&mut self, name: &str, display_ref: DisplayRef) -> Result<(), ShopError> {
        let key = ItemKey::new(name);
        let item = self
            .items
            .iter_mut()
            .find(|i| i.key == key)
            .ok_or_else(|| ShopError::ItemNotFound(name.to_string()))?;
        item.display_ref = Some(display_ref);
        Ok(())
    }

    /// Look up an item by name (no side effect).
    pub fn get(&self, name: &str) -> Option<&Item> {
        let key = ItemKey::new(name);
        self.get_by_key(&key)
    }

    /// Look up an item by folded key.
    pub fn get_by_key(&self, key: &ItemKey) -> Option<&Item> {
        self.items.iter().find(|i| &i.key == key)
    }

    /// Iterate items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// Number of items in the catalog.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
