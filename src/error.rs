use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Navigation did not complete within {0:?}")]
    NavigationTimeout(Duration),

    #[error("Element {selector} not visible within {waited:?}")]
    ElementWaitTimeout { selector: String, waited: Duration },

    #[error("Could not parse {field} from {input:?}")]
    Parse { field: &'static str, input: String },

    #[error("Notification delivery failed: {0}")]
    NotificationDelivery(String),

    #[error("Log write error: {0}")]
    LogWrite(#[from] csv::Error),

    #[error("Browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("Browser setup error: {0}")]
    BrowserSetup(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
