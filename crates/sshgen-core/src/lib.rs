//! sshgen-core: Netbox inventory to SSH client config
//!
//! Validates the tag filters, walks tagged devices, services and virtual
//! machines, merges per-asset SSH overrides and renders one `host` stanza
//! per asset with a primary IP.

pub mod asset;
pub mod collector;
pub mod error;
pub mod generator;
pub mod output;
pub mod render;
pub mod settings;
pub mod validator;

pub use asset::{Asset, AssetKind, DEFAULT_SSH_PORT, Overrides, SshOverride, is_config_token};
pub use collector::{CollectOptions, Collection, Collector, SkipReason, Skipped};
pub use error::{CollectError, ConfigError, GenerateError, OutputError, QueryError};
pub use generator::{Generated, Generator, RunSummary};
pub use output::{LockFile, write_managed};
pub use render::{Renderer, banner};
pub use settings::{NetboxSettings, Settings};
pub use validator::{QueryValidator, ValidQuery};
