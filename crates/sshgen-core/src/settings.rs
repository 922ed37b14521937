//! Run settings: Netbox connection and asset selection

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sshgen_netbox::{DEFAULT_PAGE_SIZE, ObjectClass, Query};

use crate::error::ConfigError;

/// Netbox refuses larger pages unless `MAX_PAGE_SIZE` is raised server-side
const MAX_PAGE_SIZE: u64 = 1000;

/// Settings file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Netbox connection
    pub netbox: NetboxSettings,
    /// Tag slug selecting devices, virtual machines and services
    pub tag: String,
    /// Allowed statuses for devices and virtual machines (empty = any)
    #[serde(default)]
    pub statuses: Vec<String>,
    /// Service names that carry SSH overrides
    #[serde(default = "default_service_names")]
    pub service_names: Vec<String>,
    /// Service custom field holding a username override
    #[serde(default = "default_user_field")]
    pub user_field: String,
    /// Use the first DNS label of the inventory name as the host alias
    #[serde(default = "default_short_names")]
    pub short_names: bool,
    /// Records requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

/// Netbox connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetboxSettings {
    /// Base URL, e.g. `https://netbox.example.com`
    pub url: String,
    /// API token
    #[serde(default)]
    pub token: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_service_names() -> Vec<String> {
    vec!["ssh".to_string(), "sshd".to_string()]
}

fn default_user_field() -> String {
    "ssh_user".to_string()
}

fn default_short_names() -> bool {
    true
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

fn default_timeout_secs() -> u64 {
    30
}

impl Settings {
    /// Settings with every optional field at its default
    pub fn new(url: impl Into<String>, token: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            netbox: NetboxSettings {
                url: url.into(),
                token: token.into(),
                timeout_secs: default_timeout_secs(),
            },
            tag: tag.into(),
            statuses: Vec::new(),
            service_names: default_service_names(),
            user_field: default_user_field(),
            short_names: default_short_names(),
            page_size: default_page_size(),
        }
    }

    /// Check that the settings can drive a run
    ///
    /// # Errors
    /// Returns the first missing or invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.netbox.url.trim().is_empty() {
            return Err(ConfigError::Missing("netbox.url"));
        }
        if self.netbox.token.trim().is_empty() {
            return Err(ConfigError::Missing("netbox.token"));
        }
        if self.tag.trim().is_empty() {
            return Err(ConfigError::Missing("tag"));
        }
        if self.netbox.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "netbox.timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(ConfigError::Invalid {
                field: "page_size",
                reason: format!("must be between 1 and {MAX_PAGE_SIZE}"),
            });
        }
        if self.statuses.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "statuses",
                reason: "contains an empty status".to_string(),
            });
        }
        Ok(())
    }

    /// Per-request timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.netbox.timeout_secs)
    }

    /// Filter for tagged devices or virtual machines
    #[must_use]
    pub fn host_query(&self, class: ObjectClass) -> Query {
        Query::new(class)
            .tag(self.tag.trim())
            .statuses(self.statuses.as_slice())
    }

    /// Filter for tagged services
    #[must_use]
    pub fn service_query(&self) -> Query {
        Query::new(ObjectClass::Service).tag(self.tag.trim())
    }
}
