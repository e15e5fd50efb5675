//! Test doubles shared by unit and integration tests

use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::error::{AppError, AppResult};
use crate::transport::{Reply, Transport};

/// Transport that keeps every sent message instead of delivering it.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Reply>>,
    fail: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose every `send` fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Everything sent so far.
    pub fn sent(&self) -> Vec<Reply> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Texts sent so far, draining the recording.
    pub fn take_texts(&self) -> Vec<String> {
        match self.sent.lock() {
            Ok(mut sent) => sent.drain(..).map(|r| r.text).collect(),
            Err(_) => Vec::new(),
        }
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, chat_id: i64, text: &str) -> AppResult<()> {
        if self.fail {
            return Err(AppError::Transport(format!("chat {} unreachable", chat_id)));
        }
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| AppError::Transport("recording poisoned".to_string()))?;
        sent.push(Reply::new(chat_id, text));
        Ok(())
    }
}
