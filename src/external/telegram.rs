use crate::config::TelegramConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Outbound chat channel used for staff and customer messages.
#[async_trait]
pub trait ChatSender: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> AppResult<()>;
}

pub type SharedChatSender = Arc<dyn ChatSender>;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    description: Option<String>,
}

#[derive(Clone)]
pub struct TelegramService {
    client: Client,
    config: TelegramConfig,
}

impl TelegramService {
    pub fn new(config: TelegramConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn is_enabled(&self) -> bool {
        !self.config.bot_token.is_empty()
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.bot_token,
            method
        )
    }
}

#[async_trait]
impl ChatSender for TelegramService {
    async fn send_message(&self, chat_id: i64, text: &str) -> AppResult<()> {
        if !self.is_enabled() {
            log::debug!("Telegram disabled, dropping message to chat {chat_id}");
            return Ok(());
        }

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&SendMessageRequest { chat_id, text })
            .send()
            .await?;

        let status = response.status();
        let body: TelegramResponse = response.json().await?;
        if status.is_success() && body.ok {
            log::debug!("Telegram message sent to chat {chat_id}");
            Ok(())
        } else {
            let reason = body.description.unwrap_or_else(|| status.to_string());
            Err(AppError::ExternalApiError(format!(
                "Telegram sendMessage to {chat_id} failed: {reason}"
            )))
        }
    }
}
