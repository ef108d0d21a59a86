//! Outbound alert channels and the fan-out dispatcher.

use alertbot_domain::config::MonitorConfig;
use alertbot_domain::services::telemetry::ALERTS_DISPATCHED_TOTAL;
use async_trait::async_trait;
use metrics::counter;
use thiserror::Error;
use tracing::{info, warn};

mod email;
mod telegram;

pub use email::SendGridEmail;
pub use telegram::TelegramBot;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("message rejected: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for NotifyError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}

/// A one-way text notification sink.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &'static str;
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}

/// Delivery result of a single channel.
#[derive(Debug)]
pub struct ChannelOutcome {
    pub channel: &'static str,
    pub result: Result<(), NotifyError>,
}

/// Sends each alert to every enabled channel. A failing channel is logged
/// and never stops the remaining ones.
#[derive(Default)]
pub struct AlertDispatcher {
    channels: Vec<Box<dyn NotificationChannel>>,
}

impl AlertDispatcher {
    pub fn new(channels: Vec<Box<dyn NotificationChannel>>) -> Self {
        Self { channels }
    }

    /// Registers the channels switched on in `config`.
    pub fn from_config(config: &MonitorConfig, http: reqwest::Client) -> Self {
        let mut channels: Vec<Box<dyn NotificationChannel>> = Vec::new();
        if let Some(telegram) = config.telegram() {
            channels.push(Box::new(TelegramBot::new(http.clone(), telegram.clone())));
        }
        if let Some(email) = config.email() {
            channels.push(Box::new(SendGridEmail::new(http, email.clone())));
        }
        Self::new(channels)
    }

    pub fn channel_names(&self) -> Vec<&'static str> {
        self.channels.iter().map(|channel| channel.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Sends `message` to each channel in registration order and returns one
    /// outcome per channel, in that order.
    ///
    /// Sends are awaited one at a time, so a channel that stalls holds back
    /// the next one for at most the HTTP client timeout. A failure never
    /// prevents the next send.
    pub async fn dispatch(&self, message: &str) -> Vec<ChannelOutcome> {
        let mut outcomes = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            let name = channel.name();
            let result = channel.send(message).await;
            match &result {
                Ok(()) => {
                    counter!(ALERTS_DISPATCHED_TOTAL, "channel" => name, "result" => "ok")
                        .increment(1);
                    info!(channel = name, "alert delivered");
                }
                Err(err) => {
                    counter!(ALERTS_DISPATCHED_TOTAL, "channel" => name, "result" => "error")
                        .increment(1);
                    warn!(channel = name, ?err, "alert delivery failed");
                }
            }
            outcomes.push(ChannelOutcome {
                channel: name,
                result,
            });
        }
        outcomes
    }
}
