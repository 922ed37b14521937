//! Query validation against the live inventory

use sshgen_netbox::{InventoryApi, ObjectClass, Query};
use tracing::{debug, error, info, instrument};

use crate::error::QueryError;

/// A query Netbox has accepted
///
/// Only [`QueryValidator::validate`] produces one, so collection never runs
/// on an unchecked filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidQuery(Query);

impl ValidQuery {
    #[must_use]
    pub fn query(&self) -> &Query {
        &self.0
    }

    #[must_use]
    pub fn class(&self) -> ObjectClass {
        self.0.class()
    }
}

/// Checks filters with a one-record probe request
pub struct QueryValidator<'a, A: ?Sized> {
    api: &'a A,
}

impl<'a, A: InventoryApi + ?Sized> QueryValidator<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Probe `query` and return it as a [`ValidQuery`]
    ///
    /// An empty match is still valid; only a refused request is not.
    ///
    /// # Errors
    /// Returns [`QueryError::EmptyTag`] without contacting Netbox if the
    /// query has no non-blank tag, and [`QueryError::Rejected`] carrying the
    /// upstream error if the probe fails.
    #[instrument(skip_all, fields(class = %query.class()))]
    pub async fn validate(&self, query: Query) -> Result<ValidQuery, QueryError> {
        let class = query.class();
        if !query.tags().any(|tag| !tag.trim().is_empty()) {
            return Err(QueryError::EmptyTag(class));
        }

        match self.api.fetch_page(&query, 1, 0).await {
            Ok(probe) => {
                debug!(matches = probe.count, query = %query, "probe succeeded");
                info!("query for {class} is valid");
                Ok(ValidQuery(query))
            }
            Err(source) => {
                error!(error = %source, "query for {class} is not valid");
                Err(QueryError::Rejected { class, source })
            }
        }
    }
}
