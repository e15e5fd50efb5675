//! Telegram bot handler tree configuration
//!
//! Every private text message is converted to an `Inbound` and handed to the
//! command router; replies go back through `TelegramTransport`.

use std::sync::Arc;

use goalcore::{CommandRouter, Inbound, SqliteStore};
use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use crate::telegram::transport::TelegramTransport;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub router: Arc<CommandRouter<SqliteStore>>,
}

impl HandlerDeps {
    pub fn new(router: Arc<CommandRouter<SqliteStore>>) -> Self {
        Self { router }
    }
}

/// Builds an `Inbound` from a text message with a known sender.
pub fn inbound_from_message(msg: &Message) -> Option<Inbound> {
    let text = msg.text()?;
    let from = msg.from.as_ref()?;

    Some(Inbound {
        text: text.to_string(),
        sender_id: i64::try_from(from.id.0).ok()?,
        chat_id: msg.chat.id.0,
        username: from.username.clone(),
        first_name: Some(from.first_name.clone()),
        language_code: from.language_code.clone(),
    })
}

/// Creates the main handler tree for the bot
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.chat.is_private())
        .branch(message_handler(deps))
}

fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::filter_map(|msg: Message| inbound_from_message(&msg)).endpoint(move |bot: Bot, inbound: Inbound| {
        let deps = deps.clone();
        async move {
            log::info!("Message from {} in chat {}", inbound.sender_id, inbound.chat_id);
            let transport = TelegramTransport::new(bot);
            deps.router.receive(&transport, &inbound).await?;
            Ok::<(), HandlerError>(())
        }
    })
}
