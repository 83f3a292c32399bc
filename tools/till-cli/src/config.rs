//! CLI configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use till_service::ShopConfig;

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Shop service configuration.
    #[serde(default)]
    pub shop: ShopConfig,

    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Who is at the keyboard and who counts as staff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Default identity for the interactive session.
    #[serde(default = "default_user")]
    pub user: String,

    /// User ids treated as staff.
    #[serde(default = "default_staff")]
    pub staff: Vec<String>,
}

fn default_user() -> String {
    "operator".to_string()
}

fn default_staff() -> Vec<String> {
    vec![default_user()]
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user: default_user(),
            staff: default_staff(),
        }
    }
}

impl SessionConfig {
    /// Check whether a user id is on the staff roster.
    pub fn is_staff(&self, user: &str) -> bool {
        self.staff.iter().any(|s| s == user)
    }
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &str) -> Result<()> {
        let content = if path.ends_with(".json") {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path))
    }
}

/// Generate a default till.toml config file.
pub fn generate_default_config() -> String {
    r#"# till shop configuration

[shop]
currency = "USD"
ticket_grace_secs = 5
deduct_stock_on_checkout = false
max_quantity_per_line = 99

[session]
user = "operator"
staff = ["operator"]
"#
    .to_string()
}
