//! Notification boundary: send a text payload to one or more destinations.
//!
//! The core hands over a finished payload; delivery reports success or a
//! `DeliveryError` per destination. Every destination is attempted even after
//! one fails.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Per-request timeout for message delivery.
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("missing credential: {0} is not set")]
    MissingCredentials(&'static str),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// A "send text message" operation.
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    fn send(&self, destination: &str, text: &str) -> Result<(), DeliveryError>;
}

/// Outcome of one destination.
#[derive(Debug)]
pub struct DeliveryOutcome {
    pub destination: String,
    pub result: Result<(), DeliveryError>,
}

/// Send `text` to every destination, in order, and report each result.
pub fn deliver_all(
    notifier: &dyn Notifier,
    destinations: &[String],
    text: &str,
) -> Vec<DeliveryOutcome> {
    destinations
        .iter()
        .map(|destination| {
            let result = notifier.send(destination, text);
            match &result {
                Ok(()) => info!(notifier = notifier.name(), destination, "message delivered"),
                Err(e) => {
                    warn!(notifier = notifier.name(), destination, error = %e, "delivery failed")
                }
            }
            DeliveryOutcome {
                destination: destination.clone(),
                result,
            }
        })
        .collect()
}

// ─── Telegram ───────────────────────────────────────────────────────

/// Telegram bot credentials, read from `TELEGRAM_TOKEN` and `TELEGRAM_TO`.
/// `TELEGRAM_TO` may hold several comma-separated chat ids.
#[derive(Clone)]
pub struct TelegramSettings {
    pub token: String,
    pub destinations: Vec<String>,
}

impl std::fmt::Debug for TelegramSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSettings")
            .field("token", &"<redacted>")
            .field("destinations", &self.destinations)
            .finish()
    }
}

impl TelegramSettings {
    /// Load from the environment, after reading `.env` if present.
    pub fn from_env() -> Result<Self, DeliveryError> {
        dotenvy::dotenv().ok();
        Self::from_values(
            std::env::var("TELEGRAM_TOKEN").ok(),
            std::env::var("TELEGRAM_TO").ok(),
        )
    }

    pub fn from_values(token: Option<String>, to: Option<String>) -> Result<Self, DeliveryError> {
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(DeliveryError::MissingCredentials("TELEGRAM_TOKEN"))?;
        let destinations: Vec<String> = to
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if destinations.is_empty() {
            return Err(DeliveryError::MissingCredentials("TELEGRAM_TO"));
        }
        Ok(Self {
            token,
            destinations,
        })
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// Telegram Bot API `sendMessage` over a blocking HTTP client.
pub struct TelegramNotifier {
    client: reqwest::blocking::Client,
    token: String,
    api_base: String,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>) -> Result<Self, DeliveryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(DELIVERY_TIMEOUT)
            .build()
            .map_err(|e| DeliveryError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            token: token.into(),
            api_base: TELEGRAM_API_BASE.to_string(),
        })
    }

    /// Point at another API host.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Contains the token; never log it.
    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.token
        )
    }
}

impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    fn send(&self, destination: &str, text: &str) -> Result<(), DeliveryError> {
        let body = SendMessage {
            chat_id: destination,
            text,
            parse_mode: "Markdown",
        };
        let resp = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .map_err(|e| DeliveryError::Http(e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
