use super::value::CellNumber;
use super::{CellOperations, RAW_INPUT};
use crate::config::Config;
use crate::error::Result;
use tracing::{info, instrument, warn};

const SUCCESS_STATUS: u16 = 200;

/// Terminal state of one read-increment-write cycle
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The cell was rewritten with `value`.
    Updated {
        status: u16,
        previous: String,
        value: String,
    },
    /// The range held no rows; nothing was written.
    NoData { status: u16 },
    /// The service answered the write with a status other than 200.
    Rejected { status: u16 },
}

impl UpdateOutcome {
    pub fn status(&self) -> u16 {
        match self {
            UpdateOutcome::Updated { status, .. }
            | UpdateOutcome::NoData { status }
            | UpdateOutcome::Rejected { status } => *status,
        }
    }
}

pub struct CellUpdater<'a, C> {
    cells: &'a C,
    spreadsheet_id: &'a str,
    sheet_name: &'a str,
}

impl<'a, C> CellUpdater<'a, C>
where
    C: CellOperations + Sync,
{
    pub fn new(config: &'a Config, cells: &'a C) -> Self {
        Self {
            cells,
            spreadsheet_id: &config.spreadsheet_id,
            sheet_name: &config.sheet_name,
        }
    }

    fn range(&self, target: &str) -> String {
        format!("{}!{}", self.sheet_name, target)
    }

    /// Read the target cell, add one, and write it back to the same range
    #[instrument(name = "Updating cell", skip(self))]
    pub async fn update(&self, target: &str) -> Result<UpdateOutcome> {
        let range = self.range(target);

        let read = self.cells.read_values(self.spreadsheet_id, &range).await?;
        let Some(first_row) = read.rows.first() else {
            info!("No data found");
            return Ok(UpdateOutcome::NoData {
                status: read.status,
            });
        };

        let previous = CellNumber::from_row(first_row);
        let next = previous.incremented();

        let status = self
            .cells
            .write_values(
                self.spreadsheet_id,
                &range,
                vec![vec![next.to_json()]],
                RAW_INPUT,
            )
            .await?;

        if status != SUCCESS_STATUS {
            warn!(status, "Update failed.");
            return Ok(UpdateOutcome::Rejected { status });
        }

        info!(%previous, value = %next, "Values updated");
        Ok(UpdateOutcome::Updated {
            status,
            previous: previous.to_string(),
            value: next.to_string(),
        })
    }
}
