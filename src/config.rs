//! Configuration types for sfdc-export

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for an export run
///
/// Deserialized from a JSON file. Every field except the credentials has a
/// default, so a minimal config only needs `username` and `password`
/// (plus `security_token` unless the org whitelists the caller's IP).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Salesforce username
    #[serde(default)]
    pub username: String,

    /// Salesforce password
    #[serde(default)]
    pub password: String,

    /// Security token appended to the password during login (default: empty)
    #[serde(default)]
    pub security_token: String,

    /// Log in against test.salesforce.com instead of login.salesforce.com
    #[serde(default)]
    pub connect_to_sandbox: bool,

    /// Run the attachment export pass (default: true)
    #[serde(default = "default_true")]
    pub download_attachments: bool,

    /// Run the note export pass (default: true)
    #[serde(default = "default_true")]
    pub download_notes: bool,

    /// Number of record ids per batch-detail query (default: 100)
    ///
    /// Bounds the `WHERE Id IN (...)` list so batch queries stay inside the
    /// remote store's query length limits. Must be at least 1.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Log level filter for the binary's subscriber (default: "info")
    #[serde(default = "default_loglevel")]
    pub loglevel: String,

    /// Directory receiving manifests and downloaded files (default: "./export")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// ShareType column value written to every note manifest row (default: "V")
    #[serde(default = "default_sharetype")]
    pub sharetype: String,

    /// Visibility column value written to every note manifest row (default: "AllUsers")
    #[serde(default = "default_visibility")]
    pub visibility: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            security_token: String::new(),
            connect_to_sandbox: false,
            download_attachments: true,
            download_notes: true,
            batch_size: default_batch_size(),
            loglevel: default_loglevel(),
            output_dir: default_output_dir(),
            sharetype: default_sharetype(),
            visibility: default_visibility(),
        }
    }
}

impl Config {
    /// Load and validate a configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field values that serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if self.username.is_empty() {
            return Err(Error::Config {
                message: "username must not be empty".to_string(),
                key: Some("username".to_string()),
            });
        }
        if self.password.is_empty() {
            return Err(Error::Config {
                message: "password must not be empty".to_string(),
                key: Some("password".to_string()),
            });
        }
        if self.batch_size == 0 {
            return Err(Error::Config {
                message: "batch_size must be at least 1".to_string(),
                key: Some("batch_size".to_string()),
            });
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_batch_size() -> usize {
    100
}

fn default_loglevel() -> String {
    "info".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./export")
}

fn default_sharetype() -> String {
    "V".to_string()
}

fn default_visibility() -> String {
    "AllUsers".to_string()
}
