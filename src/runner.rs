use chrono::{Local, NaiveDateTime};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::extractor::{extract_listings, SessionFactory};
use crate::history::HistoryWriter;
use crate::notify::{notify_all, PushTransport};
use crate::summarizer::summarize;
use crate::types::{format_price, RunSummary};

/// What one run did. Only used for reporting; nothing downstream acts on it.
#[derive(Debug)]
pub struct RunReport {
    pub summary: RunSummary,
    pub extraction_failed: bool,
    /// Cheapest price was below the alert threshold.
    pub threshold_crossed: bool,
    pub pushes_delivered: usize,
    pub logged: bool,
}

/// One check of the ticket page: extract, summarize, maybe alert, log.
pub struct Runner<'a> {
    cfg: Config,
    sessions: &'a dyn SessionFactory,
    /// `None` when no push client could be built; alerts are then only logged.
    push: Option<&'a dyn PushTransport>,
    history: HistoryWriter,
}

impl<'a> Runner<'a> {
    pub fn new(
        cfg: Config,
        sessions: &'a dyn SessionFactory,
        push: Option<&'a dyn PushTransport>,
    ) -> Self {
        let history = HistoryWriter::new(cfg.output_csv.clone());
        Self {
            cfg,
            sessions,
            push,
            history,
        }
    }

    pub async fn run(&self) -> RunReport {
        self.run_at(Local::now().naive_local()).await
    }

    async fn run_at(&self, timestamp: NaiveDateTime) -> RunReport {
        info!("Starting scraper for URL: {}", self.cfg.target_url);

        // --- Extracted ---
        let extraction = extract_listings(self.sessions, &self.cfg).await;
        let extraction_failed = !extraction.is_complete();
        if extraction.listings.is_empty() {
            warn!("No ticket information was scraped");
        }

        // --- Summarized ---
        let summary = summarize(&extraction.listings, timestamp);
        log_summary(&summary);

        // --- Alerted ---
        let (threshold_crossed, pushes_delivered) = self.maybe_alert(&summary).await;

        // --- Logged ---
        let logged = match self.history.append(&summary) {
            Ok(()) => true,
            Err(e) => {
                error!("Error saving summary to {}: {e}", self.history.path().display());
                false
            }
        };

        RunReport {
            summary,
            extraction_failed,
            threshold_crossed,
            pushes_delivered,
            logged,
        }
    }

    /// Returns whether the threshold was crossed and how many pushes went out.
    async fn maybe_alert(&self, summary: &RunSummary) -> (bool, usize) {
        let threshold = format_price(self.cfg.price_alert_threshold);
        let Some(cheapest_value) = summary.cheapest_price else {
            info!("No prices found; no alert to send");
            return (false, 0);
        };

        let cheapest = format_price(cheapest_value);
        if cheapest_value >= self.cfg.price_alert_threshold {
            info!("No tickets found under €{threshold}. Cheapest is €{cheapest}.");
            return (false, 0);
        }

        info!("Cheap ticket found! Price: €{cheapest}");
        let title = format!("Cheap Ticket Alert: €{cheapest}");
        let body = format!(
            "A ticket for {} is available for €{cheapest}. Total tickets found: {}.",
            self.cfg.event_name, summary.total_available_tickets,
        );
        let Some(push) = self.push else {
            warn!("Push delivery unavailable; alert not sent");
            return (true, 0);
        };
        let delivered = notify_all(push, &self.cfg.pushbullet_tokens, &title, &body).await;
        (true, delivered)
    }
}

fn log_summary(summary: &RunSummary) {
    match serde_json::to_string_pretty(summary) {
        Ok(json) => info!("Summary ticket information:\n{json}"),
        Err(e) => warn!("Could not render summary: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::scrape::tests::{container, test_config, FakeFactory, FakePage};
    use crate::notify::pushbullet::tests::RecordingTransport;
    use chrono::NaiveDate;
    use std::sync::{Arc, Mutex};

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn config_in(dir: &tempfile::TempDir) -> Config {
        let mut cfg = test_config();
        cfg.output_csv = dir.path().join("log.csv");
        cfg.screenshot_path = dir.path().join("shot.png");
        cfg.pushbullet_tokens = vec!["o.token1234".to_string()];
        cfg
    }

    fn page_with_prices(prices: &[&str]) -> FakeFactory {
        FakeFactory(Arc::new(Mutex::new(FakePage {
            visible_after_probes: Some(0),
            containers: prices
                .iter()
                .map(|p| container("Weekend", "2 beschikbaar", "Regulier", p))
                .collect(),
            ..Default::default()
        })))
    }

    #[tokio::test(start_paused = true)]
    async fn cheap_listing_alerts_and_logs() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(&dir);
        let factory = page_with_prices(&["€ 250,00 per stuk", "€ 320,00 per stuk"]);
        let push = RecordingTransport::default();

        let report = Runner::new(cfg.clone(), &factory, Some(&push)).run_at(ts()).await;

        assert!(report.threshold_crossed);
        assert_eq!(report.pushes_delivered, 1);
        assert!(report.logged);
        assert!(!report.extraction_failed);
        assert_eq!(report.summary.cheapest_price, Some(250.0));
        let sent = push.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, "Cheap Ticket Alert: €250.0");
        assert_eq!(
            sent[0].2,
            "A ticket for Lowlands is available for €250.0. Total tickets found: 4."
        );
        let text = std::fs::read_to_string(&cfg.output_csv).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn price_at_threshold_does_not_alert() {
        let dir = tempfile::tempdir().unwrap();
        let factory = page_with_prices(&["€ 300,00 per stuk"]);
        let push = RecordingTransport::default();

        let report = Runner::new(config_in(&dir), &factory, Some(&push)).run_at(ts()).await;

        assert!(!report.threshold_crossed);
        assert_eq!(report.pushes_delivered, 0);
        assert!(report.logged);
        assert!(push.sent.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_extraction_still_logs_an_empty_row() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(&dir);
        let factory = FakeFactory::default();
        let push = RecordingTransport::default();

        let report = Runner::new(cfg.clone(), &factory, Some(&push)).run_at(ts()).await;

        assert!(report.extraction_failed);
        assert!(!report.threshold_crossed);
        assert!(report.logged);
        assert_eq!(report.summary.listings_found, 0);
        let text = std::fs::read_to_string(&cfg.output_csv).unwrap();
        assert!(text.trim_end().ends_with("2025-06-01 08:00:00,0,0,N/A,N/A,N/A,N/A,N/A,N/A"));
    }

    #[tokio::test(start_paused = true)]
    async fn log_write_failure_does_not_abort_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config_in(&dir);
        cfg.output_csv = dir.path().join("no_such_dir").join("log.csv");
        let factory = page_with_prices(&["€ 100,00 per stuk"]);
        let push = RecordingTransport::default();

        let report = Runner::new(cfg, &factory, Some(&push)).run_at(ts()).await;

        assert!(report.threshold_crossed);
        assert!(!report.logged);
    }

    #[tokio::test(start_paused = true)]
    async fn crossing_with_no_tokens_delivers_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config_in(&dir);
        cfg.pushbullet_tokens.clear();
        let factory = page_with_prices(&["€ 120,00 per stuk"]);
        let push = RecordingTransport::default();

        let report = Runner::new(cfg, &factory, Some(&push)).run_at(ts()).await;

        assert!(report.threshold_crossed);
        assert_eq!(report.pushes_delivered, 0);
        assert!(push.sent.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_push_client_still_logs() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(&dir);
        let factory = page_with_prices(&["€ 120,00 per stuk"]);

        let report = Runner::new(cfg.clone(), &factory, None).run_at(ts()).await;

        assert!(report.threshold_crossed);
        assert_eq!(report.pushes_delivered, 0);
        assert!(report.logged);
        let text = std::fs::read_to_string(&cfg.output_csv).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
