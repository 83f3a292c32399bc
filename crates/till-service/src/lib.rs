//! Concurrent shop service for till.
//!
//! Sits between the chat-platform glue (or any other front end) and the
//! domain core:
//!
//! - **Commands in**: every user-facing action is a [`ShopCommand`]
//!   variant, executed on behalf of an [`Actor`] whose role gates the
//!   staff-only operations.
//! - **State**: one [`ShopService`] owns the catalog, every cart, and
//!   the ticket state machine behind a single lock, so concurrent
//!   button clicks can never interleave a read-modify-write.
//! - **Renders out**: display work (item cards, button labels, ticket
//!   channels) is requested over a broadcast channel and never blocks
//!   or corrupts the shop.
//! - **Deferred teardown**: closed tickets are deleted after a grace
//!   period by an independent, cancellable timer task.

pub mod authz;
pub mod command;
pub mod config;
pub mod render;
pub mod service;
pub mod teardown;

pub use authz::{Actor, Role};
pub use command::{CartLineView, ItemSummary, Reply, ShopCommand};
pub use config::ShopConfig;
pub use render::RenderRequest;
pub use service::ShopService;
pub use teardown::TicketTeardown;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::authz::{Actor, Role};
    pub use crate::command::{CartLineView, ItemSummary, Reply, ShopCommand};
    pub use crate::config::ShopConfig;
    pub use crate::render::RenderRequest;
    pub use crate::service::ShopService;
    pub use till_core::prelude::*;
}
