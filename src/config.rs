use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, Result};

pub const TARGET_URL: &str =
    "https://www.ticketmaster.nl/event/lowlands-2025-%7C-festivalticket-tickets/658441016";
pub const EVENT_NAME: &str = "Lowlands";
pub const OUTPUT_CSV: &str = "tickets_summary_log.csv";
pub const SCREENSHOT_PATH: &str = "debug_screenshot.png";
pub const PUSHBULLET_API_URL: &str = "https://api.pushbullet.com/v2/pushes";

/// Alert fires when the cheapest listing is strictly below this price.
pub const PRICE_ALERT_THRESHOLD: f64 = 300.0;

/// Upper bound on the initial page navigation.
pub const NAVIGATION_TIMEOUT_SECS: u64 = 60;

/// How long to look for the cookie consent button before giving up.
pub const CONSENT_TIMEOUT_SECS: u64 = 5;

/// Total budget for the ticket containers to render and become visible.
pub const CONTENT_TIMEOUT_SECS: u64 = 60;

/// Browser viewport, tall enough for the whole ticket list in one screenshot.
pub const VIEWPORT_WIDTH: u32 = 1000;
pub const VIEWPORT_HEIGHT: u32 = 2000;

/// Poll backoff for element waits, in milliseconds. The last value repeats.
pub const POLL_BACKOFF_MS: &[u64] = &[250, 500, 1000, 2000];

/// Timeout applied to each outbound push request.
pub const PUSH_REQUEST_TIMEOUT_SECS: u64 = 30;

pub mod selectors {
    pub const CONSENT_BUTTON: &str = "#onetrust-accept-btn-handler";
    pub const TICKET_CONTAINER: &str = r#"[data-testid="ticketTypeInfo"]"#;
    pub const TICKET_FIELD: &str = "span";
}

#[derive(Debug, Clone)]
pub struct Config {
    pub target_url: String,
    /// Event name used in alert text (EVENT_NAME)
    pub event_name: String,
    pub output_csv: PathBuf,
    pub screenshot_path: PathBuf,
    pub log_level: String,
    pub price_alert_threshold: f64,
    pub pushbullet_api_url: String,
    /// Access tokens from PUSHBULLET_TOKENS_JSON, a JSON array of strings.
    pub pushbullet_tokens: Vec<String>,
    pub navigation_timeout: Duration,
    pub consent_timeout: Duration,
    pub content_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let price_alert_threshold = match lookup("PRICE_ALERT_THRESHOLD") {
            Some(raw) => raw.trim().parse::<f64>().map_err(|_| {
                AppError::Config("PRICE_ALERT_THRESHOLD must be a number".to_string())
            })?,
            None => PRICE_ALERT_THRESHOLD,
        };

        Ok(Self {
            target_url: lookup("TARGET_URL").unwrap_or_else(|| TARGET_URL.to_string()),
            event_name: lookup("EVENT_NAME").unwrap_or_else(|| EVENT_NAME.to_string()),
            output_csv: lookup("OUTPUT_CSV")
                .unwrap_or_else(|| OUTPUT_CSV.to_string())
                .into(),
            screenshot_path: lookup("SCREENSHOT_PATH")
                .unwrap_or_else(|| SCREENSHOT_PATH.to_string())
                .into(),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            price_alert_threshold,
            pushbullet_api_url: lookup("PUSHBULLET_API_URL")
                .unwrap_or_else(|| PUSHBULLET_API_URL.to_string()),
            pushbullet_tokens: parse_tokens(lookup("PUSHBULLET_TOKENS_JSON").as_deref())?,
            navigation_timeout: Duration::from_secs(NAVIGATION_TIMEOUT_SECS),
            consent_timeout: Duration::from_secs(CONSENT_TIMEOUT_SECS),
            content_timeout: Duration::from_secs(CONTENT_TIMEOUT_SECS),
        })
    }
}

/// Absent or blank means no tokens. Anything else must be a JSON array of strings.
pub fn parse_tokens(raw: Option<&str>) -> Result<Vec<String>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(json) => serde_json::from_str(json).map_err(|e| {
            AppError::Config(format!("PUSHBULLET_TOKENS_JSON is not a JSON string array: {e}"))
        }),
    }
}
