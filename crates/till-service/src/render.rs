//! Outbound rendering requests.
//!
//! The service broadcasts these over a tokio channel; whatever front end
//! is attached (chat embeds and buttons, a terminal) subscribes and
//! renders. Sends are fire-and-forget: a missing or lagging subscriber
//! never affects shop state.

use serde::{Deserialize, Serialize};
use till_core::checkout::Order;
use till_core::ids::{DisplayRef, TicketId, UserId};
use till_core::money::Money;

/// A request to the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderRequest {
    /// Display a card for a newly added item: name, price, stock, and
    /// who requested it.
    ShowItemCard {
        name: String,
        price: Money,
        stock: u32,
        requested_by: UserId,
    },
    /// Refresh an existing item card after a price or stock change.
    UpdateItemCard {
        name: String,
        price: Money,
        stock: u32,
    },
    /// Take down the card for a removed item.
    RetireItemCard {
        name: String,
        display_ref: Option<DisplayRef>,
    },
    /// Refresh the cart-button labels for one user on one item.
    UpdateCartButtons {
        user: UserId,
        item: String,
        quantity: u32,
    },
    /// Open a private ticket channel for the user.
    OpenTicket { user: UserId, ticket: TicketId },
    /// Post the order summary inside the ticket.
    PostOrderSummary { ticket: TicketId, order: Order },
    /// Delete the ticket resource (sent after the grace period).
    DeleteTicket { ticket: TicketId },
    /// A plain notice addressed to one user.
    Notice { user: UserId, text: String },
}

impl RenderRequest {
    /// Request kind for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            RenderRequest::ShowItemCard { .. } => "show_item_card",
            RenderRequest::UpdateItemCard { .. } => "update_item_card",
            RenderRequest::RetireItemCard { .. } => "retire_item_card",
            RenderRequest::UpdateCartButtons { .. } => "update_cart_buttons",
            RenderRequest::OpenTicket { .. } => "open_ticket",
            RenderRequest::PostOrderSummary { .. } => "post_order_summary",
            RenderRequest::DeleteTicket { .. } => "delete_ticket",
            RenderRequest::Notice { .. } => "notice",
        }
    }
}
