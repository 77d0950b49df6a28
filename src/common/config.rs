//! Configuration file handling

use serde::Deserialize;
use std::path::Path;

use super::paths::config_path;
use super::Result;
use crate::api::types::{Credentials, Identity};

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Server under test
    #[serde(default)]
    pub target: TargetConfig,

    /// Test identities
    #[serde(default)]
    pub credentials: CredentialSet,
}

/// Where the storefront lives
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Base URL of the server, without the API prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path segment every endpoint lives under
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Per-request timeout; the HTTP client default applies when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_prefix: default_api_prefix(),
            timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5001".to_string()
}

fn default_api_prefix() -> String {
    "api".to_string()
}

/// Admin and customer credentials
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialSet {
    #[serde(default = "default_admin")]
    pub admin: Credentials,

    #[serde(default = "default_customer")]
    pub customer: Credentials,
}

impl Default for CredentialSet {
    fn default() -> Self {
        Self {
            admin: default_admin(),
            customer: default_customer(),
        }
    }
}

impl CredentialSet {
    pub fn get(&self, identity: Identity) -> &Credentials {
        match identity {
            Identity::Admin => &self.admin,
            Identity::Customer => &self.customer,
        }
    }
}

fn default_admin() -> Credentials {
    Credentials::new("admin@hyperpure.com", "admin123")
}

fn default_customer() -> Credentials {
    Credentials::new("customer@example.com", "customer123")
}

/// Environment variables consulted by [`Config::apply_overrides`]
pub const ENV_BASE_URL: &str = "STOREFRONT_BASE_URL";
pub const ENV_ADMIN_EMAIL: &str = "STOREFRONT_ADMIN_EMAIL";
pub const ENV_ADMIN_PASSWORD: &str = "STOREFRONT_ADMIN_PASSWORD";
pub const ENV_CUSTOMER_EMAIL: &str = "STOREFRONT_CUSTOMER_EMAIL";
pub const ENV_CUSTOMER_PASSWORD: &str = "STOREFRONT_CUSTOMER_PASSWORD";

impl Config {
    /// Load configuration from the default config file, then the environment
    ///
    /// Returns default configuration if the file doesn't exist
    pub fn load() -> Result<Self> {
        let mut config = match config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from an explicit file, then the environment
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| super::Error::file_read(path, e))?;
        Self::parse(&content)
    }

    /// Parse a TOML document
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }

    /// Apply environment-style overrides
    ///
    /// `lookup` maps a variable name to its value; empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_BASE_URL) {
            self.target.base_url = url;
        }
        if let Some(email) = get(ENV_ADMIN_EMAIL) {
            self.credentials.admin.email = email;
        }
        if let Some(password) = get(ENV_ADMIN_PASSWORD) {
            self.credentials.admin.password = password;
        }
        if let Some(email) = get(ENV_CUSTOMER_EMAIL) {
            self.credentials.customer.email = email;
        }
        if let Some(password) = get(ENV_CUSTOMER_PASSWORD) {
            self.credentials.customer.password = password;
        }
    }
}
