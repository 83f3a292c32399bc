//! Shop service configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use till_core::money::Currency;

/// Configuration for a shop service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Currency every price is quoted in.
    #[serde(default)]
    pub currency: Currency,
    /// Seconds to wait after closing a ticket before requesting deletion
    /// of the ticket resource.
    #[serde(default = "default_ticket_grace_secs")]
    pub ticket_grace_secs: u64,
    /// Whether checkout deducts the ordered quantities from stock.
    /// Off by default: stock only moves through explicit stock updates.
    #[serde(default)]
    pub deduct_stock_on_checkout: bool,
    /// Upper bound on a single cart line, independent of stock.
    #[serde(default = "default_max_quantity_per_line")]
    pub max_quantity_per_line: u32,
}

fn default_ticket_grace_secs() -> u64 {
    5
}

fn default_max_quantity_per_line() -> u32 {
    99
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            currency: Currency::USD,
            ticket_grace_secs: default_ticket_grace_secs(),
            deduct_stock_on_checkout: false,
            max_quantity_per_line: default_max_quantity_per_line(),
        }
    }
}

impl ShopConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the currency.
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Set the ticket teardown grace period.
    pub fn with_ticket_grace(mut self, grace: Duration) -> Self {
        self.ticket_grace_secs = grace.as_secs();
        self
    }

    /// Enable or disable stock deduction at checkout.
    pub fn with_stock_deduction(mut self, enabled: bool) -> Self {
        self.deduct_stock_on_checkout = enabled;
        self
    }

    /// Set the per-line quantity cap.
    pub fn with_line_cap(mut self, cap: u32) -> Self {
        self.max_quantity_per_line = cap;
        self
    }

    /// The teardown grace period as a [`Duration`].
    pub fn ticket_grace(&self) -> Duration {
        Duration::from_secs(self.ticket_grace_secs)
    }
}
