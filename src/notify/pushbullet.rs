use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::PUSH_REQUEST_TIMEOUT_SECS;
use crate::error::{AppError, Result};

/// Substring marking a token left over from the sample configuration.
pub const PLACEHOLDER_TOKEN: &str = "YOUR_PUSHBULLET_ACCESS_TOKEN";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: &'a str,
    pub body: &'a str,
}

impl<'a> Note<'a> {
    pub fn new(title: &'a str, body: &'a str) -> Self {
        Self {
            kind: "note",
            title,
            body,
        }
    }
}

/// One push delivery to one access token.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn push(&self, token: &str, note: &Note<'_>) -> Result<()>;
}

pub struct PushbulletClient {
    client: reqwest::Client,
    api_url: String,
}

impl PushbulletClient {
    pub fn new(api_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(PUSH_REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }
}

#[async_trait]
impl PushTransport for PushbulletClient {
    async fn push(&self, token: &str, note: &Note<'_>) -> Result<()> {
        let resp = self
            .client
            .post(&self.api_url)
            .header("Access-Token", token)
            .json(note)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(AppError::NotificationDelivery(format!("{status} - {body}")))
    }
}

/// Sends `title`/`body` to every usable token, one at a time. Each token
/// succeeds or fails on its own. Returns how many pushes were delivered.
pub async fn notify_all(
    transport: &dyn PushTransport,
    tokens: &[String],
    title: &str,
    body: &str,
) -> usize {
    if tokens.is_empty() {
        info!("No Pushbullet tokens provided. Skipping notification.");
        return 0;
    }

    info!("Attempting to send Pushbullet notifications");
    let note = Note::new(title, body);
    let mut delivered = 0;
    for token in tokens {
        if is_placeholder(token) {
            warn!("Skipping invalid or placeholder token");
            continue;
        }

        let tail = token_tail(token);
        info!("Sending alert to token ending in ...{tail}");
        match transport.push(token, &note).await {
            Ok(()) => {
                info!("Pushbullet alert sent to ...{tail}");
                delivered += 1;
            }
            Err(e) => warn!("Failed to send Pushbullet alert to ...{tail}: {e}"),
        }
    }
    delivered
}

fn is_placeholder(token: &str) -> bool {
    token.trim().is_empty() || token.contains(PLACEHOLDER_TOKEN)
}

/// Last four characters, the only part of a token that is ever logged.
fn token_tail(token: &str) -> &str {
    let start = token
        .char_indices()
        .rev()
        .nth(3)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &token[start..]
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every push; tokens listed in `failing` get a delivery error.
    #[derive(Default)]
    pub(crate) struct RecordingTransport {
        pub sent: Mutex<Vec<(String, String, String)>>,
        pub failing: Vec<String>,
    }

    #[async_trait]
    impl PushTransport for RecordingTransport {
        async fn push(&self, token: &str, note: &Note<'_>) -> Result<()> {
            self.sent.lock().unwrap().push((
                token.to_string(),
                note.title.to_string(),
                note.body.to_string(),
            ));
            if self.failing.iter().any(|t| t == token) {
                return Err(AppError::NotificationDelivery("401 - unauthorized".to_string()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn empty_token_list_makes_no_calls() {
        let transport = RecordingTransport::default();
        assert_eq!(notify_all(&transport, &[], "t", "b").await, 0);
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn placeholder_and_blank_tokens_are_skipped() {
        let transport = RecordingTransport::default();
        let tokens = vec![
            "o.realtoken1234".to_string(),
            "YOUR_PUSHBULLET_ACCESS_TOKEN_2".to_string(),
            "   ".to_string(),
        ];
        assert_eq!(notify_all(&transport, &tokens, "Cheap", "Go").await, 1);

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], ("o.realtoken1234".into(), "Cheap".into(), "Go".into()));
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_rest() {
        let transport = RecordingTransport {
            failing: vec!["first".to_string()],
            ..Default::default()
        };
        let tokens = vec!["first".to_string(), "second".to_string()];
        let delivered = notify_all(&transport, &tokens, "t", "b").await;
        assert_eq!(delivered, 1);
        assert_eq!(transport.sent.lock().unwrap().len(), 2);
    }

    #[test]
    fn note_serializes_as_pushbullet_expects() {
        let json = serde_json::to_value(Note::new("Title", "Body")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "note", "title": "Title", "body": "Body"})
        );
    }

    #[test]
    fn token_tail_is_last_four_chars() {
        assert_eq!(token_tail("o.abcdefWXYZ"), "WXYZ");
        assert_eq!(token_tail("ab"), "ab");
    }
}
