//! Shop error types.

use thiserror::Error;

/// Errors that can occur in storefront operations.
///
/// Every variant is a local, recoverable condition reported back to the
/// originating actor; a failed operation leaves state unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShopError {
    /// An item with this name already exists.
    #[error("An item named \"{0}\" already exists")]
    DuplicateItem(String),

    /// Item not found in the catalog.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Stock level below zero was supplied.
    #[error("Stock cannot be negative (got {0})")]
    NegativeStock(i64),

    /// Not enough stock to cover the requested quantity.
    #[error("Not enough stock of {item}: requested {requested}, available {available}")]
    StockExceeded {
        item: String,
        requested: u32,
        available: u32,
    },

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Invalid price.
    #[error("Invalid price: {0}")]
    InvalidPrice(f64),

    /// Quantity exceeds the per-line cap.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(u32, u32),

    /// Checkout attempted with an empty cart.
    #[error("Your cart is empty")]
    EmptyCart,

    /// A ticket is already open for this user.
    #[error("A ticket is already open for {0}")]
    TicketAlreadyOpen(String),

    /// No open ticket to close.
    #[error("No open ticket")]
    NoOpenTicket,

    /// Actor is not allowed to perform this action.
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in price calculation")]
    Overflow,
}
