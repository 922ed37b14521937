//! Inventory API trait

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::query::Query;
use crate::types::Page;

/// Read access to a paginated, filterable inventory
///
/// Pages are returned undecoded; [`crate::paginate`] turns them into typed
/// records one at a time.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// Fetch the page of `query` results starting at `offset`
    async fn fetch_page(&self, query: &Query, limit: u64, offset: u64) -> Result<Page<Value>>;
}
