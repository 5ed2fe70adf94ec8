//! Paginated bulk fetch of a remote table.
//!
//! Pulls bounded windows of rows until the source is exhausted, pacing
//! requests with a fixed inter-batch delay. Exactly one request is in flight
//! at a time; any request error aborts the whole fetch with no partial
//! result.

use std::time::Duration;

use tracing::{debug, info};

use crate::client::{Row, TableClient};
use crate::config::FetchOptions;
use crate::error::Result;

/// Fetches every row of `table` in windows of `options.batch_size`.
///
/// The loop terminates on either of two independent conditions:
/// - an empty page (source exhausted), or
/// - a short page (fewer rows than the window requested).
///
/// A source whose row count is an exact multiple of the batch size returns
/// only full pages, so exhaustion is observed via one extra, empty request.
/// The pacing delay applies after every full page, never after the terminal
/// short or empty one.
///
/// Rows are returned in source order. An empty first window yields an empty
/// vector, not an error.
///
/// # Errors
/// Propagates the first `select` failure immediately; rows from earlier
/// pages are discarded.
pub async fn fetch_all(
    client: &dyn TableClient,
    table: &str,
    options: &FetchOptions,
) -> Result<Vec<Row>> {
    if options.batch_size == 0 {
        return Err(crate::error::TabledumpError::configuration(
            "batch size must be a positive integer",
        ));
    }

    let batch_size = u64::from(options.batch_size);
    let mut offset: u64 = 0;
    let mut rows: Vec<Row> = Vec::new();

    info!("Starting export from table '{}'", table);
    info!("Fetching in batches of {} rows", options.batch_size);

    loop {
        // Inclusive window, both ends
        let window = (offset, offset + batch_size - 1);
        let page = client.select(table, window).await?;

        if page.is_empty() {
            debug!("Window [{}, {}] returned no rows, source exhausted", window.0, window.1);
            break;
        }

        let page_len = page.len();
        rows.extend(page.rows);
        info!("Fetched {} rows (total: {})", page_len, rows.len());

        // A short page means the source ended inside this window
        if (page_len as u64) < batch_size {
            break;
        }

        offset += batch_size;

        // Pace the next request; skipped entirely once the loop has ended
        if options.throttle_ms > 0 {
            tokio::time::sleep(Duration::from_millis(options.throttle_ms)).await;
        }
    }

    info!("Total rows fetched: {}", rows.len());
    Ok(rows)
}
