//! Core error types for sshgen-core

use std::path::PathBuf;

use sshgen_netbox::{NetboxError, ObjectClass};
use thiserror::Error;

/// Invalid or missing run settings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required setting is absent or blank
    #[error("missing setting: {0}")]
    Missing(&'static str),

    /// Setting is present but unusable
    #[error("invalid setting {field}: {reason}")]
    Invalid {
        /// Setting name as written in the settings file
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// A filter that cannot be used for collection
#[derive(Error, Debug)]
pub enum QueryError {
    /// No usable tag, so the query would match the whole collection
    #[error("query for {0} has no tag filter")]
    EmptyTag(ObjectClass),

    /// Netbox refused the probe request
    #[error("query for {class} is not valid: {source}")]
    Rejected {
        /// Collection the filter targets
        class: ObjectClass,
        /// Upstream failure
        #[source]
        source: NetboxError,
    },
}

impl QueryError {
    /// Text Netbox returned with the rejection, if any
    #[must_use]
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            QueryError::Rejected {
                source: NetboxError::Api { message, .. },
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Failure while walking a validated query
#[derive(Error, Debug)]
pub enum CollectError {
    /// Request or decode failure on some page
    #[error("collecting {class} failed: {source}")]
    Transport {
        /// Collection being walked
        class: ObjectClass,
        /// Upstream failure
        #[source]
        source: NetboxError,
    },

    /// Query targets a collection that does not hold the expected records
    #[error("{0} cannot be collected here")]
    WrongClass(ObjectClass),
}

/// Failure writing the managed file
#[derive(Error, Debug)]
pub enum OutputError {
    /// Filesystem error on the destination or its temporary sibling
    #[error("cannot write {}: {source}", .path.display())]
    Io {
        /// Destination path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Another run holds the lock
    #[error("lock file {} is held, another run is in progress", .0.display())]
    Locked(PathBuf),
}

/// Any fatal pipeline error
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Collect(#[from] CollectError),

    #[error(transparent)]
    Output(#[from] OutputError),
}
