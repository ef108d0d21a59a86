use alertbot_domain::config::EmailConfig;
use async_trait::async_trait;
use serde_json::json;

use super::{NotificationChannel, NotifyError};

const SUBJECT: &str = "Validator alert";

/// SendGrid v3 mail channel delivering plain-text alerts.
pub struct SendGridEmail {
    http: reqwest::Client,
    config: EmailConfig,
}

impl SendGridEmail {
    pub fn new(http: reqwest::Client, config: EmailConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl NotificationChannel for SendGridEmail {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let payload = json!({
            "personalizations": [{"to": [{"email": self.config.receiver}]}],
            "from": {"email": self.config.sender},
            "subject": SUBJECT,
            "content": [{"type": "text/plain", "value": message}],
        });

        let response = self
            .http
            .post(format!(
                "{}/v3/mail/send",
                self.config.api_base.trim_end_matches('/')
            ))
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let detail = response.text().await.unwrap_or_default();
        Err(NotifyError::Rejected(format!(
            "HTTP {}: {}",
            status.as_u16(),
            detail.trim()
        )))
    }
}
