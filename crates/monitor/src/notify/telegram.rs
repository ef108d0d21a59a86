use alertbot_domain::config::TelegramConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{NotificationChannel, NotifyError};

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Bot API `sendMessage` channel.
pub struct TelegramBot {
    http: reqwest::Client,
    config: TelegramConfig,
}

impl TelegramBot {
    pub fn new(http: reqwest::Client, config: TelegramConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token
        )
    }
}

#[async_trait]
impl NotificationChannel for TelegramBot {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(self.endpoint())
            .json(&SendMessageRequest {
                chat_id: &self.config.chat_id,
                text: message,
            })
            .send()
            .await?;

        let status = response.status();
        let body: Option<SendMessageResponse> = response.json().await.ok();
        match body {
            Some(reply) if status.is_success() && reply.ok => Ok(()),
            Some(reply) => Err(NotifyError::Rejected(
                reply
                    .description
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            )),
            None => Err(NotifyError::Rejected(format!("HTTP {}", status.as_u16()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn bot(server: &MockServer) -> TelegramBot {
        TelegramBot::new(
            reqwest::Client::new(),
            TelegramConfig {
                api_base: server.uri(),
                bot_token: "123:abc".into(),
                chat_id: "-1001".into(),
            },
        )
    }

    #[tokio::test]
    async fn posts_message_to_chat() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_json(json!({"chat_id": "-1001", "text": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {}})))
            .expect(1)
            .mount(&server)
            .await;

        bot(&server).send("hello").await.expect("message delivered");
    }

    #[tokio::test]
    async fn api_error_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "description": "Bad Request: chat not found"
            })))
            .mount(&server)
            .await;

        let err = bot(&server).send("hello").await.unwrap_err();
        match err {
            NotifyError::Rejected(reason) => assert_eq!(reason, "Bad Request: chat not found"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
