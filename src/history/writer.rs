use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::types::{format_price, RunSummary, TIMESTAMP_FORMAT};

/// Column order of the history file.
pub const HEADER: [&str; 9] = [
    "timestamp",
    "listings_found",
    "total_available_tickets",
    "cheapest_price",
    "5th_cheapest_price",
    "10th_cheapest_price",
    "most_expensive_price",
    "average_price_10_cheapest",
    "average_price_all_tickets",
];

/// Written in place of a price that could not be derived.
pub const ABSENT: &str = "N/A";

/// Appends one row per run to a CSV file. The header is written only when
/// the file is created by this call.
pub struct HistoryWriter {
    path: PathBuf,
}

impl HistoryWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, summary: &RunSummary) -> Result<()> {
        let existed = self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::Writer::from_writer(file);
        if !existed {
            writer.write_record(HEADER)?;
        }
        writer.write_record(summary_row(summary))?;
        writer.flush()?;

        info!("Summary data appended to {}", self.path.display());
        Ok(())
    }
}

fn summary_row(s: &RunSummary) -> [String; 9] {
    [
        s.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        s.listings_found.to_string(),
        s.total_available_tickets.to_string(),
        price_cell(s.cheapest_price),
        price_cell(s.fifth_cheapest_price),
        price_cell(s.tenth_cheapest_price),
        price_cell(s.most_expensive_price),
        price_cell(s.average_price_10_cheapest),
        price_cell(s.average_price_all_tickets),
    ]
}

fn price_cell(price: Option<f64>) -> String {
    price.map_or_else(|| ABSENT.to_string(), format_price)
}
