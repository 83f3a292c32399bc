//! Per-user cart storage.

use std::collections::HashMap;

use crate::cart::{Cart, CartLine};
use crate::catalog::{Cascade, Item};
use crate::error::ShopError;
use crate::ids::{ItemKey, UserId};
use serde::{Deserialize, Serialize};

/// Owns every user's cart and keeps them consistent with stock.
///
/// Stock checks need catalog data, so the mutating operations take the
/// resolved [`Item`]; resolving a name (and failing with `ItemNotFound`)
/// is the caller's job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartStore {
    carts: HashMap<UserId, Cart>,
}

impl CartStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of an item to a user's cart.
    ///
    /// Fails with `StockExceeded` if one more unit would not fit in the
    /// item's current stock; the cart is left unchanged.
    pub fn increment(&mut self, user: &UserId, item: &Item) -> Result<u32, ShopError> {
        let cart = self.carts.entry(user.clone()).or_default();
        let current = cart.quantity(&item.key);
        if current >= item.stock {
            return Err(ShopError::StockExceeded {
                item: item.name.clone(),
                requested: current.saturating_add(1),
                available: item.stock,
            });
        }
        let requested = current + 1;
        cart.set_quantity(&item.key, requested);
        Ok(requested)
    }

    /// Remove one unit of an item from a user's cart.
    ///
    /// Floors at 0: dropping the last unit deletes the line, and
    /// decrementing a line that does not exist is a no-op returning 0.
    pub fn decrement(&mut self, user: &UserId, key: &ItemKey) -> u32 {
        let Some(cart) = self.carts.get_mut(user) else {
            return 0;
        };
        let current = cart.quantity(key);
        if current == 0 {
            return 0;
        }
        let next = current - 1;
        cart.set_quantity(key, next);
        next
    }

    /// Clamp every cart's line for an item to the given stock level,
    /// deleting lines that clamp to 0. Returns how many carts changed.
    pub fn clamp_to_stock(&mut self, key: &ItemKey, stock: u32) -> usize {
        let mut touched = 0;
        for cart in self.carts.values_mut() {
            let current = cart.quantity(key);
            if current > stock {
                cart.set_quantity(key, stock);
                touched += 1;
            }
        }
        touched
    }

    /// Apply a catalog cascade (clamp or drop) to every cart.
    pub fn apply(&mut self, cascade: &Cascade) -> usize {
        self.clamp_to_stock(cascade.key(), cascade.stock_ceiling())
    }

    /// Current quantity of an item in a user's cart (0 if absent).
    pub fn quantity(&self, user: &UserId, key: &ItemKey) -> u32 {
        self.carts.get(user).map(|c| c.quantity(key)).unwrap_or(0)
    }

    /// A stable, insertion-ordered copy of a user's lines.
    pub fn snapshot(&self, user: &UserId) -> Vec<CartLine> {
        self.carts
            .get(user)
            .map(|c| c.lines().to_vec())
            .unwrap_or_default()
    }

    /// Empty a user's cart (used after a successful checkout).
    pub fn clear(&mut self, user: &UserId) {
        if let Some(cart) = self.carts.get_mut(user) {
            cart.clear();
        }
    }

    /// Check whether a user's cart has no lines.
    pub fn is_empty(&self, user: &UserId) -> bool {
        self.carts.get(user).map(|c| c.is_empty()).unwrap_or(true)
    }

    /// Number of users with a cart entry (empty carts included).
    pub fn cart_count(&self) -> usize {
        self.carts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::{Currency, Money};

    fn potion(stock: u32) -> Item {
        Item::new("Potion", Money::new(500, Currency::USD), stock)
    }

    fn u1() -> UserId {
        UserId::new("u1")
    }

    #[test]
    fn test_increment_until_stock_exhausted() {
        let mut store = CartStore::new();
        let item = potion(3);

        assert_eq!(store.increment(&u1(), &item).unwrap(), 1);
        assert_eq!(store.increment(&u1(), &item).unwrap(), 2);
        assert_eq!(store.increment(&u1(), &item).unwrap(), 3);

        let err = store.increment(&u1(), &item).unwrap_err();
        assert_eq!(
            err,
            ShopError::StockExceeded {
                item: "Potion".to_string(),
                requested: 4,
                available: 3,
            }
        );
        // Denied increment leaves the cart unchanged.
        assert_eq!(store.snapshot(&u1())[0].quantity, 3);
    }

    #[test]
    fn test_increment_zero_stock_item() {
        let mut store = CartStore::new();
        let item = potion(0);
        assert!(store.increment(&u1(), &item).is_err());
        assert!(store.is_empty(&u1()));
    }

    #[test]
    fn test_decrement_floors_at_zero() {
        let mut store = CartStore::new();
        let item = potion(3);
        store.increment(&u1(), &item).unwrap();

        assert_eq!(store.decrement(&u1(), &item.key), 0);
        assert!(store.is_empty(&u1()));
        // Decrementing a missing line is a no-op.
        assert_eq!(store.decrement(&u1(), &item.key), 0);
        assert_eq!(store.decrement(&UserId::new("nobody"), &item.key), 0);
    }

    #[test]
    fn test_clamp_to_stock_across_users() {
        let mut store = CartStore::new();
        let item = potion(5);
        let u2 = UserId::new("u2");
        for _ in 0..5 {
            store.increment(&u1(), &item).unwrap();
        }
        for _ in 0..2 {
            store.increment(&u2, &item).unwrap();
        }

        let touched = store.clamp_to_stock(&item.key, 3);
        assert_eq!(touched, 1);
        assert_eq!(store.snapshot(&u1())[0].quantity, 3);
        assert_eq!(store.snapshot(&u2)[0].quantity, 2);
    }

    #[test]
    fn test_clamp_to_zero_deletes_lines() {
        let mut store = CartStore::new();
        let item = potion(3);
        store.increment(&u1(), &item).unwrap();

        store.clamp_to_stock(&item.key, 0);
        assert!(store.is_empty(&u1()));
    }

    #[test]
    fn test_apply_drop_cascade() {
        let mut store = CartStore::new();
        let item = potion(3);
        store.increment(&u1(), &item).unwrap();

        let cascade = Cascade::Drop {
            key: item.key.clone(),
        };
        store.apply(&cascade);
        assert!(store.is_empty(&u1()));
    }

    #[test]
    fn test_snapshot_is_insertion_ordered() {
        let mut store = CartStore::new();
        let potion = potion(3);
        let sword = Item::new("Sword", Money::new(10_000, Currency::USD), 2);

        store.increment(&u1(), &potion).unwrap();
        store.increment(&u1(), &sword).unwrap();
        store.increment(&u1(), &potion).unwrap();

        let snapshot = store.snapshot(&u1());
        let keys: Vec<&str> = snapshot.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, vec!["potion", "sword"]);
    }

    #[test]
    fn test_clear() {
        let mut store = CartStore::new();
        let item = potion(3);
        store.increment(&u1(), &item).unwrap();
        store.clear(&u1());
        assert!(store.is_empty(&u1()));
    }
}
