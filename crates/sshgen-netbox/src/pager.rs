//! Lazy traversal of paginated list endpoints

use futures::Stream;
use futures::stream;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::query::Query;
use crate::traits::InventoryApi;

/// Netbox's default page size
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Position within a paginated result set
#[derive(Debug, Default)]
struct Cursor {
    offset: u64,
    pages: u64,
    buffered: std::vec::IntoIter<Value>,
    exhausted: bool,
}

/// Stream every record matching `query`, one page in memory at a time
///
/// The next page is requested only once the current one is drained. The
/// stream ends after a page without a `next` link or an empty page, and
/// yields an error (then ends) on the first failed request or undecodable
/// record.
pub fn paginate<'a, T, A>(
    api: &'a A,
    query: &'a Query,
    page_size: u64,
) -> impl Stream<Item = Result<T>> + Send + 'a
where
    A: InventoryApi + ?Sized,
    T: DeserializeOwned + Send + 'a,
{
    let page_size = page_size.max(1);
    stream::try_unfold(Cursor::default(), move |cursor| {
        advance::<T, A>(api, query, page_size, cursor)
    })
}

async fn advance<T, A>(
    api: &A,
    query: &Query,
    page_size: u64,
    mut cursor: Cursor,
) -> Result<Option<(T, Cursor)>>
where
    A: InventoryApi + ?Sized,
    T: DeserializeOwned,
{
    loop {
        if let Some(raw) = cursor.buffered.next() {
            let record = serde_json::from_value(raw)?;
            return Ok(Some((record, cursor)));
        }
        if cursor.exhausted {
            return Ok(None);
        }

        let page = api.fetch_page(query, page_size, cursor.offset).await?;
        let fetched = page.results.len() as u64;
        cursor.pages += 1;
        cursor.offset += fetched;
        cursor.exhausted = !page.has_next() || fetched == 0;
        debug!(
            query = %query,
            page = cursor.pages,
            fetched,
            total = page.count,
            "fetched page"
        );
        cursor.buffered = page.results.into_iter();
    }
}
