//! Retrieval of provider tables.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use tracing::info;

use crate::error::Result;
use crate::sources::Source;
use crate::table::RawTable;

/// Fetches and parses the full table for `source`.
///
/// Every call performs a read; memoization happens above this layer.
///
/// # Errors
///
/// Returns [`crate::Error::SourceUnavailable`] if the location cannot be read
/// or does not hold well-formed CSV.
#[tracing::instrument(skip_all, fields(provider = %source.provider(), location = source.url()))]
pub fn fetch_table<C: HttpClient + ?Sized>(client: &C, source: &dyn Source) -> Result<RawTable> {
    let bytes = client.get(source.url())?;
    let table = RawTable::from_reader(source.provider().id(), bytes.as_slice())?;
    info!(bytes = bytes.len(), rows = table.len(), "Fetched provider table");
    Ok(table)
}
