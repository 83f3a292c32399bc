//! Shopping cart module.
//!
//! Contains the per-user cart and the store that keeps every cart
//! consistent with catalog stock.

mod cart;
mod store;

pub use cart::{Cart, CartLine};
pub use store::CartStore;
