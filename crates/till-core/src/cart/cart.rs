//! Cart and line types.

use crate::ids::ItemKey;
use serde::{Deserialize, Serialize};

/// A pending selection in a cart. Quantity is always at least 1;
/// a line that would reach 0 is deleted instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// The item this line refers to.
    pub key: ItemKey,
    /// Units selected.
    pub quantity: u32,
}

/// A user's pending, unconfirmed selections.
///
/// Lines are kept in first-add order so the cart renders the same way
/// every time within a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current quantity for an item (0 if not in the cart).
    pub fn quantity(&self, key: &ItemKey) -> u32 {
        self.lines
            .iter()
            .find(|l| &l.key == key)
            .map(|l| l.quantity)
            .unwrap_or(0)
    }

    /// Set the quantity for an item.
    ///
    /// A quantity of 0 deletes the line. New lines append, preserving
    /// first-add order for existing ones.
    pub fn set_quantity(&mut self, key: &ItemKey, quantity: u32) {
        if quantity == 0 {
            self.lines.retain(|l| &l.key != key);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| &l.key == key) {
            line.quantity = quantity;
        } else {
            self.lines.push(CartLine {
                key: key.clone(),
                quantity,
            });
        }
    }

    /// The lines in first-add order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Total units across all lines.
    pub fn unit_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
