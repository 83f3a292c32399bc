//! Order types.
//!
//! An order is derived, never stored: it is computed at checkout time by
//! joining the cart against the current catalog, and dropped once the
//! summary has been rendered into the ticket.

use crate::cart::CartLine;
use crate::catalog::Catalog;
use crate::error::ShopError;
use crate::ids::{ItemKey, OrderId, UserId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// One line of an order summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Item display name at checkout time.
    pub name: String,
    /// Canonical item key.
    pub key: ItemKey,
    /// Units ordered, clamped to stock at checkout time.
    pub quantity: u32,
    /// Price per unit at checkout time.
    pub unit_price: Money,
    /// unit_price * quantity.
    pub line_total: Money,
}

/// A derived order summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// The user checking out.
    pub user: UserId,
    /// Lines present in the catalog at checkout time, in cart order.
    pub lines: Vec<OrderLine>,
    /// Sum of line totals.
    pub total: Money,
}

impl Order {
    /// Build an order by joining a cart snapshot against the catalog.
    ///
    /// Lines whose item no longer exists are dropped; quantities are
    /// clamped to current stock; lines that clamp to 0 are filtered out.
    /// The result can be empty, which callers treat as an empty cart.
    pub fn build(
        user: &UserId,
        snapshot: &[CartLine],
        catalog: &Catalog,
        currency: Currency,
    ) -> Result<Order, ShopError> {
        let mut lines = Vec::with_capacity(snapshot.len());
        for cart_line in snapshot {
            let Some(item) = catalog.get_by_key(&cart_line.key) else {
                continue;
            };
            let quantity = cart_line.quantity.min(item.stock);
            if quantity == 0 {
                continue;
            }
            let line_total = item
                .unit_price
                .try_multiply(quantity as i64)
                .ok_or(ShopError::Overflow)?;
            lines.push(OrderLine {
                name: item.name.clone(),
                key: item.key.clone(),
                quantity,
                unit_price: item.unit_price,
                line_total,
            });
        }

        let total = Money::try_sum(lines.iter().map(|l| &l.line_total), currency)
            .ok_or(ShopError::Overflow)?;

        Ok(Order {
            id: OrderId::generate(),
            user: user.clone(),
            lines,
            total,
        })
    }

    /// Total units across all lines.
    pub fn unit_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Check if the order has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(cents: i64) -> Money {
        Money::new(cents, Currency::USD)
    }

    fn catalog_with(items: &[(&str, i64, u32)]) -> Catalog {
        let mut catalog = Catalog::new();
        for (name, cents, stock) in items {
            catalog.add_item(*name, usd(*cents), *stock).unwrap();
        }
        catalog
    }

    fn line(name: &str, quantity: u32) -> CartLine {
        CartLine {
            key: ItemKey::new(name),
            quantity,
        }
    }

    #[test]
    fn test_total_is_sum_of_price_times_quantity() {
        let catalog = catalog_with(&[("Potion", 500, 10), ("Sword", 10_000, 2)]);
        let snapshot = vec![line("potion", 3), line("sword", 1)];

        let order =
            Order::build(&UserId::new("u1"), &snapshot, &catalog, Currency::USD).unwrap();
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.total, usd(3 * 500 + 10_000));
        assert_eq!(order.unit_count(), 4);
    }

    #[test]
    fn test_missing_items_are_dropped() {
        let catalog = catalog_with(&[("Potion", 500, 10)]);
        let snapshot = vec![line("potion", 1), line("ghost", 2)];

        let order =
            Order::build(&UserId::new("u1"), &snapshot, &catalog, Currency::USD).unwrap();
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].name, "Potion");
    }

    #[test]
    fn test_quantities_clamp_to_current_stock() {
        let catalog = catalog_with(&[("Potion", 500, 2)]);
        let snapshot = vec![line("potion", 5)];

        let order =
            Order::build(&UserId::new("u1"), &snapshot, &catalog, Currency::USD).unwrap();
        assert_eq!(order.lines[0].quantity, 2);
        assert_eq!(order.total, usd(1000));
    }

    #[test]
    fn test_zero_stock_lines_are_filtered() {
        let catalog = catalog_with(&[("Potion", 500, 0)]);
        let snapshot = vec![line("potion", 3)];

        let order =
            Order::build(&UserId::new("u1"), &snapshot, &catalog, Currency::USD).unwrap();
        assert!(order.is_empty());
    }

    #[test]
    fn test_overflow_is_reported() {
        let catalog = catalog_with(&[("Gem", i64::MAX, 10)]);
        let snapshot = vec![line("gem", 2)];

        let err =
            Order::build(&UserId::new("u1"), &snapshot, &catalog, Currency::USD).unwrap_err();
        assert_eq!(err, ShopError::Overflow);
    }
}
