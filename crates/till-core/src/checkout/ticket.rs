//! Ticket state machine.

use std::collections::HashMap;

use crate::cart::CartLine;
use crate::catalog::Catalog;
use crate::error::ShopError;
use crate::ids::{TicketId, UserId};
use crate::money::Currency;
use crate::checkout::Order;
use serde::{Deserialize, Serialize};

/// Ticket lifecycle for one user.
///
/// Closing a ticket returns the user to `NoTicket`; the closed state is
/// terminal for the resource but immediately reusable for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TicketState {
    /// No ticket open.
    #[default]
    NoTicket,
    /// A private ticket is open for this user.
    TicketOpen,
}

impl TicketState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketState::NoTicket => "no_ticket",
            TicketState::TicketOpen => "ticket_open",
        }
    }
}

/// Drives checkout: validates the cart, derives the order, and enforces
/// the at-most-one-open-ticket-per-user invariant.
///
/// Authorization (who may close whose ticket) is the facade's concern,
/// not this state machine's.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutProcess {
    open: HashMap<UserId, TicketId>,
}

impl CheckoutProcess {
    /// Create a process with no open tickets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin checkout for a user.
    ///
    /// Fails with `TicketAlreadyOpen` if the user has an open ticket and
    /// with `EmptyCart` if the joined, clamped order has no lines. On
    /// success the user transitions to `TicketOpen` and the derived
    /// order plus the new ticket id are returned; the caller asks the
    /// external collaborator to materialize the ticket resource.
    pub fn begin_checkout(
        &mut self,
        user: &UserId,
        snapshot: &[CartLine],
        catalog: &Catalog,
        currency: Currency,
    ) -> Result<(Order, TicketId), ShopError> {
        if self.open.contains_key(user) {
            return Err(ShopError::TicketAlreadyOpen(user.to_string()));
        }

        let order = Order::build(user, snapshot, catalog, currency)?;
        if order.is_empty() {
            return Err(ShopError::EmptyCart);
        }

        let ticket = TicketId::generate();
        self.open.insert(user.clone(), ticket.clone());
        Ok((order, ticket))
    }

    /// Close the user's open ticket.
    ///
    /// Transitions back to `NoTicket` and returns the ticket id so the
    /// caller can request destruction of the resource.
    pub fn close_ticket(&mut self, user: &UserId) -> Result<TicketId, ShopError> {
        self.open.remove(user).ok_or(ShopError::NoOpenTicket)
    }

    /// The user's open ticket, if any.
    pub fn open_ticket(&self, user: &UserId) -> Option<&TicketId> {
        self.open.get(user)
    }

    /// The user's current ticket state.
    pub fn state(&self, user: &UserId) -> TicketState {
        if self.open.contains_key(user) {
            TicketState::TicketOpen
        } else {
            TicketState::NoTicket
        }
    }

    /// Number of tickets currently open.
    pub fn open_count(&self) -> usize {
        self.open.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ItemKey;
    use crate::money::Money;

    fn u1() -> UserId {
        UserId::new("u1")
    }

    fn stocked_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .add_item("Potion", Money::new(500, Currency::USD), 3)
            .unwrap();
        catalog
    }

    fn snapshot(quantity: u32) -> Vec<CartLine> {
        vec![CartLine {
            key: ItemKey::new("potion"),
            quantity,
        }]
    }

    #[test]
    fn test_checkout_with_empty_cart_fails() {
        let mut process = CheckoutProcess::new();
        let catalog = stocked_catalog();

        let err = process
            .begin_checkout(&u1(), &[], &catalog, Currency::USD)
            .unwrap_err();
        assert_eq!(err, ShopError::EmptyCart);
        assert_eq!(process.state(&u1()), TicketState::NoTicket);
    }

    #[test]
    fn test_checkout_with_only_dead_lines_fails() {
        let mut process = CheckoutProcess::new();
        let catalog = stocked_catalog();
        // The only line refers to an item the catalog no longer has.
        let dead = vec![CartLine {
            key: ItemKey::new("ghost"),
            quantity: 2,
        }];

        let err = process
            .begin_checkout(&u1(), &dead, &catalog, Currency::USD)
            .unwrap_err();
        assert_eq!(err, ShopError::EmptyCart);
    }

    #[test]
    fn test_checkout_opens_ticket() {
        let mut process = CheckoutProcess::new();
        let catalog = stocked_catalog();

        let (order, ticket) = process
            .begin_checkout(&u1(), &snapshot(2), &catalog, Currency::USD)
            .unwrap();
        assert_eq!(order.total, Money::new(1000, Currency::USD));
        assert_eq!(process.state(&u1()), TicketState::TicketOpen);
        assert_eq!(process.open_ticket(&u1()), Some(&ticket));
    }

    #[test]
    fn test_second_checkout_fails_until_closed() {
        let mut process = CheckoutProcess::new();
        let catalog = stocked_catalog();

        process
            .begin_checkout(&u1(), &snapshot(1), &catalog, Currency::USD)
            .unwrap();
        let err = process
            .begin_checkout(&u1(), &snapshot(1), &catalog, Currency::USD)
            .unwrap_err();
        assert_eq!(err, ShopError::TicketAlreadyOpen("u1".to_string()));

        process.close_ticket(&u1()).unwrap();
        assert_eq!(process.state(&u1()), TicketState::NoTicket);
        // State is reusable after close.
        process
            .begin_checkout(&u1(), &snapshot(1), &catalog, Currency::USD)
            .unwrap();
    }

    #[test]
    fn test_close_without_ticket_fails() {
        let mut process = CheckoutProcess::new();
        let err = process.close_ticket(&u1()).unwrap_err();
        assert_eq!(err, ShopError::NoOpenTicket);
    }

    #[test]
    fn test_tickets_are_per_user() {
        let mut process = CheckoutProcess::new();
        let catalog = stocked_catalog();
        let u2 = UserId::new("u2");

        process
            .begin_checkout(&u1(), &snapshot(1), &catalog, Currency::USD)
            .unwrap();
        process
            .begin_checkout(&u2, &snapshot(1), &catalog, Currency::USD)
            .unwrap();
        assert_eq!(process.open_count(), 2);

        process.close_ticket(&u1()).unwrap();
        assert_eq!(process.state(&u2), TicketState::TicketOpen);
    }
}
