mod client;
mod updater;
mod value;

pub use client::SheetsClient;
pub(crate) use client::AUTH_SCOPE;
pub use updater::{CellUpdater, UpdateOutcome};

#[cfg(test)]
pub(crate) use updater::mocks;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Stores values verbatim, without formula or format interpretation
pub const RAW_INPUT: &str = "RAW";

/// Rows returned by a single-range read, with the HTTP status of the response
#[derive(Debug, Clone, PartialEq)]
pub struct ReadValues {
    pub status: u16,
    pub rows: Vec<Vec<Value>>,
}

#[async_trait]
pub trait CellOperations {
    async fn read_values(&self, spreadsheet_id: &str, range: &str) -> Result<ReadValues>;

    /// Write `values` to `range`, returning the HTTP status the service answered with.
    async fn write_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<Value>>,
        value_input_option: &str,
    ) -> Result<u16>;
}
