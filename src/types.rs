use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// One ticket-type offering scraped from the event page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketListing {
    #[serde(rename = "type")]
    pub kind: String,
    pub availability: u32,
    pub category: String,
    pub price: f64,
}

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Aggregate of one run. Price fields are `None` when too few listings exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
    pub listings_found: usize,
    pub total_available_tickets: u64,
    pub cheapest_price: Option<f64>,
    #[serde(rename = "5th_cheapest_price")]
    pub fifth_cheapest_price: Option<f64>,
    #[serde(rename = "10th_cheapest_price")]
    pub tenth_cheapest_price: Option<f64>,
    pub most_expensive_price: Option<f64>,
    pub average_price_10_cheapest: Option<f64>,
    pub average_price_all_tickets: Option<f64>,
}

fn serialize_timestamp<S: serde::Serializer>(
    ts: &NaiveDateTime,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    s.collect_str(&ts.format(TIMESTAMP_FORMAT))
}

/// Renders a price the way the history log always has: shortest form, but
/// whole amounts keep a trailing `.0` (`300.0`, `289.5`).
pub fn format_price(price: f64) -> String {
    let s = price.to_string();
    if s.contains('.') || !price.is_finite() {
        s
    } else {
        format!("{s}.0")
    }
}

// ---------------------------------------------------------------------------
// Extraction outcome
// ---------------------------------------------------------------------------

/// Listings gathered from the page plus the reason extraction stopped early, if it did.
#[derive(Debug, Default)]
pub struct Extraction {
    pub listings: Vec<TicketListing>,
    pub failure: Option<crate::error::AppError>,
}

impl Extraction {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}
