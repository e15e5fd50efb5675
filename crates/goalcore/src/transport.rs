//! Messaging transport boundary

use async_trait::async_trait;

use crate::core::error::AppResult;

/// A text message from a chat participant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inbound {
    pub text: String,
    /// Telegram user id of the sender
    pub sender_id: i64,
    pub chat_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    /// IETF tag reported by the client, e.g. `en` or `ru-RU`
    pub language_code: Option<String>,
}

impl Inbound {
    /// Message from a private chat, where chat id and sender id coincide.
    pub fn private(sender_id: i64, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender_id,
            chat_id: sender_id,
            ..Default::default()
        }
    }
}

/// A reply to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub chat_id: i64,
    pub text: String,
}

impl Reply {
    pub fn new(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
        }
    }
}

/// Outbound side of the messenger.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str) -> AppResult<()>;
}
