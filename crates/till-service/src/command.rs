//! Shop commands and replies.
//!
//! Every user-facing action is a plain variant here, whatever widget
//! triggered it upstream (slash command, button click, REPL line). The
//! facade dispatches the variant to the core and answers with a [`Reply`]
//! carrying structured data; turning a reply into an embed, message, or
//! table is the rendering collaborator's job.

use serde::{Deserialize, Serialize};
use till_core::checkout::Order;
use till_core::ids::{TicketId, UserId};
use till_core::money::Money;

/// An inbound shop command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShopCommand {
    /// Show the short usage tutorial.
    Setup,
    /// Create a new catalog item (staff only).
    AddItem {
        name: String,
        /// Decimal price as entered, e.g. 0.69.
        price: f64,
        stock: i64,
    },
    /// Remove an item from the catalog (staff only).
    RemoveItem { name: String },
    /// Set an item's stock level (staff only).
    SetStock { name: String, stock: i64 },
    /// List the catalog.
    ViewCatalog,
    /// Show the actor's cart.
    ViewCart,
    /// Add one unit of an item to the actor's cart.
    AddToCart { item: String },
    /// Remove one unit of an item from the actor's cart.
    RemoveFromCart { item: String },
    /// Convert the actor's cart into an order and open a ticket.
    Checkout,
    /// Close an open ticket. `owner` defaults to the actor; closing
    /// someone else's ticket requires staff.
    CloseTicket { owner: Option<UserId> },
}

impl ShopCommand {
    /// Command name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ShopCommand::Setup => "setup",
            ShopCommand::AddItem { .. } => "add_item",
            ShopCommand::RemoveItem { .. } => "remove_item",
            ShopCommand::SetStock { .. } => "set_stock",
            ShopCommand::ViewCatalog => "view_catalog",
            ShopCommand::ViewCart => "view_cart",
            ShopCommand::AddToCart { .. } => "add_to_cart",
            ShopCommand::RemoveFromCart { .. } => "remove_from_cart",
            ShopCommand::Checkout => "checkout",
            ShopCommand::CloseTicket { .. } => "close_ticket",
        }
    }
}

/// A catalog entry as shown in listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSummary {
    pub name: String,
    pub price: Money,
    pub stock: u32,
}

/// One cart line priced against the current catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineView {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
}

/// The structured answer to a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Reply {
    /// The usage tutorial.
    Welcome { text: String },
    /// An item was created.
    ItemAdded {
        name: String,
        price: Money,
        stock: u32,
    },
    /// An item was removed; `carts_touched` carts lost a line.
    ItemRemoved { name: String, carts_touched: usize },
    /// Stock was updated; `carts_clamped` carts were clamped down.
    StockSet {
        name: String,
        stock: u32,
        carts_clamped: usize,
    },
    /// The current catalog, in insertion order.
    CatalogView { items: Vec<ItemSummary> },
    /// The actor's cart, priced.
    CartView {
        lines: Vec<CartLineView>,
        total: Money,
    },
    /// A cart line changed; 0 means the line is gone.
    CartUpdated { item: String, quantity: u32 },
    /// Checkout succeeded and a ticket was opened.
    CheckoutStarted { ticket: TicketId, order: Order },
    /// A ticket was closed; the resource disappears after the grace
    /// period.
    TicketClosed {
        ticket: TicketId,
        teardown_secs: u64,
    },
}
