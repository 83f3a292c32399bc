//! Checkout module.
//!
//! Contains the derived order summary and the per-user ticket state
//! machine that turns a cart into an open ticket.

mod order;
mod ticket;

pub use order::{Order, OrderLine};
pub use ticket::{CheckoutProcess, TicketState};
