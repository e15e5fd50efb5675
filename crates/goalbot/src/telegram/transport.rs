use async_trait::async_trait;
use goalcore::{AppError, AppResult, Transport};
use teloxide::prelude::*;

/// Sends replies through the Bot API.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send(&self, chat_id: i64, text: &str) -> AppResult<()> {
        self.bot
            .send_message(ChatId(chat_id), text.to_string())
            .await
            .map_err(|e| AppError::Transport(format!("send to chat {} failed: {}", chat_id, e)))?;
        Ok(())
    }
}
