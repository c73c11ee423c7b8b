//! Source record fetcher: walks the paginated database listing.
//!
//! [`record_pages`] is a lazy stream yielding one page of records per item, so a
//! caller can validate records while later pages are still unread. Each call
//! starts again from the first page. [`fetch_all_records`] collects the whole
//! listing.
//!
//! Termination: the stream ends after a page that reports no further pages, after
//! an empty page (including an empty first page), or after a page that reports
//! more pages without a cursor to reach them. A failed query ends the stream with
//! an error.

use futures::stream::{self, Stream, TryStreamExt};
use tracing::{debug, error, info, warn};

use crate::contract::{RawRecord, SourceDatabase};
use crate::error::SyncError;

enum PageCursor {
    Start,
    At(String),
    Done,
}

/// Lazily query `database_id`, one page of records per stream item.
pub fn record_pages<'a, S>(
    source: &'a S,
    database_id: &'a str,
) -> impl Stream<Item = Result<Vec<RawRecord>, SyncError>> + 'a
where
    S: SourceDatabase + ?Sized,
{
    stream::try_unfold(PageCursor::Start, move |cursor| {
        next_page(source, database_id, cursor)
    })
}

/// Query every page of `database_id` and return all records in listing order.
pub async fn fetch_all_records<S>(
    source: &S,
    database_id: &str,
) -> Result<Vec<RawRecord>, SyncError>
where
    S: SourceDatabase + ?Sized,
{
    let records: Vec<RawRecord> = record_pages(source, database_id).try_concat().await?;
    info!(database_id, count = records.len(), "Fetched all source records");
    Ok(records)
}

async fn next_page<S>(
    source: &S,
    database_id: &str,
    cursor: PageCursor,
) -> Result<Option<(Vec<RawRecord>, PageCursor)>, SyncError>
where
    S: SourceDatabase + ?Sized,
{
    let start_cursor = match cursor {
        PageCursor::Done => return Ok(None),
        PageCursor::Start => None,
        PageCursor::At(c) => Some(c),
    };

    debug!(database_id, cursor = ?start_cursor, "Querying source database page");
    let page = source
        .query_records(database_id, start_cursor)
        .await
        .map_err(|e| {
            error!(error = %e, database_id, "Source database query failed");
            SyncError::Query {
                database_id: database_id.to_string(),
                source: e,
            }
        })?;

    if page.records.is_empty() {
        debug!(database_id, "Empty page, listing complete");
        return Ok(None);
    }

    let following = match (page.has_more, page.next_cursor) {
        (true, Some(next)) => PageCursor::At(next),
        (true, None) => {
            warn!(database_id, "Page reports more results but no cursor, stopping");
            PageCursor::Done
        }
        (false, _) => PageCursor::Done,
    };

    debug!(database_id, records = page.records.len(), "Fetched source database page");
    Ok(Some((page.records, following)))
}
