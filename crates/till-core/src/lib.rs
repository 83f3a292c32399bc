//! Storefront domain types and logic for till.
//!
//! This crate provides the platform-agnostic core of a chat-platform
//! shop bot:
//!
//! - **Catalog**: sellable items with price and stock, unique by name
//! - **Cart**: per-user pending selections, clamped to stock
//! - **Checkout**: derived order summaries and the per-user ticket
//!   lifecycle
//!
//! Everything here is synchronous and in-memory. How commands arrive
//! (slash commands, buttons, a REPL) and how results are rendered
//! (embeds, plain text) is the caller's concern; the service crate wires
//! both up.
//!
//! # Example
//!
//! ```rust
//! use till_core::prelude::*;
//!
//! let mut catalog = Catalog::new();
//! catalog
//!     .add_item("Potion", Money::from_decimal(5.0, Currency::USD), 3)
//!     .unwrap();
//!
//! let mut carts = CartStore::new();
//! let user = UserId::new("u1");
//! let potion = catalog.get("potion").unwrap().clone();
//! carts.increment(&user, &potion).unwrap();
//!
//! let mut checkout = CheckoutProcess::new();
//! let (order, _ticket) = checkout
//!     .begin_checkout(&user, &carts.snapshot(&user), &catalog, Currency::USD)
//!     .unwrap();
//! assert_eq!(order.total.display(), "$5.00");
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod catalog;
pub mod cart;
pub mod checkout;

pub use error::ShopError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::ShopError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{Cascade, Catalog, Item};

    // Cart
    pub use crate::cart::{Cart, CartLine, CartStore};

    // Checkout
    pub use crate::checkout::{CheckoutProcess, Order, OrderLine, TicketState};
}
