use chrono::NaiveDateTime;

use crate::types::{RunSummary, TicketListing};

/// Aggregates one run's listings. Pure; the timestamp is supplied by the caller.
pub fn summarize(listings: &[TicketListing], timestamp: NaiveDateTime) -> RunSummary {
    let total_available_tickets = listings.iter().map(|l| u64::from(l.availability)).sum();

    let mut prices: Vec<f64> = listings.iter().map(|l| l.price).collect();
    // sort_by is stable: equal prices keep page order
    prices.sort_by(|a, b| a.total_cmp(b));

    RunSummary {
        timestamp,
        listings_found: listings.len(),
        total_available_tickets,
        cheapest_price: prices.first().copied(),
        fifth_cheapest_price: prices.get(4).copied(),
        tenth_cheapest_price: prices.get(9).copied(),
        most_expensive_price: prices.last().copied(),
        average_price_10_cheapest: rounded_mean(&prices[..prices.len().min(10)]),
        average_price_all_tickets: rounded_mean(&prices),
    }
}

/// Arithmetic mean rounded to cents, `None` for an empty slice.
fn rounded_mean(prices: &[f64]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    let mean = prices.iter().sum::<f64>() / prices.len() as f64;
    Some((mean * 100.0).round() / 100.0)
}
