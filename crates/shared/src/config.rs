//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Ledger posting configuration.
    #[serde(default)]
    pub ledger: LedgerSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Ledger posting configuration.
///
/// Every society shares the same chart conventions, so these are
/// deployment-wide rather than per organization.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerSettings {
    /// Account groups whose balance grows on the receiving side.
    #[serde(default = "default_cash_like_groups")]
    pub cash_like_groups: Vec<String>,
    /// Liability account holding member advances.
    #[serde(default = "default_members_advanced_account")]
    pub members_advanced_account: String,
    /// Group of the member advances account.
    #[serde(default = "default_members_advanced_group")]
    pub members_advanced_group: String,
    /// Prefix for generated voucher numbers.
    #[serde(default = "default_voucher_prefix")]
    pub voucher_prefix: String,
    /// Length of generated payment transaction ids.
    #[serde(default = "default_transaction_id_length")]
    pub transaction_id_length: usize,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            cash_like_groups: default_cash_like_groups(),
            members_advanced_account: default_members_advanced_account(),
            members_advanced_group: default_members_advanced_group(),
            voucher_prefix: default_voucher_prefix(),
            transaction_id_length: default_transaction_id_length(),
        }
    }
}

fn default_cash_like_groups() -> Vec<String> {
    vec!["Bank Accounts".to_string(), "Cash in Hand".to_string()]
}

fn default_members_advanced_account() -> String {
    "Members Advanced".to_string()
}

fn default_members_advanced_group() -> String {
    "Current Liabilities".to_string()
}

fn default_voucher_prefix() -> String {
    "VCH-".to_string()
}

fn default_transaction_id_length() -> usize {
    12
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("SOCIETY")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("ledger.cash_like_groups")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
