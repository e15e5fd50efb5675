//! Bot initialization
//!
//! This module contains:
//! - Command enum shown in the Telegram command menu
//! - Bot instance creation

use reqwest::ClientBuilder;
use secrecy::{ExposeSecret, SecretString};
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use goalcore::config;

/// Bot commands enum with descriptions
///
/// Parsing of incoming text is done by `goalcore::Command`; this enum feeds the menu.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "The bot understands:")]
pub enum Command {
    #[command(description = "greeting and command list")]
    Start,
    #[command(description = "command list")]
    Help,
    #[command(description = "list your boards")]
    Board,
    #[command(description = "list your categories")]
    Category,
    #[command(description = "list your goals")]
    Goals,
    #[command(description = "create a new goal")]
    Create,
    #[command(description = "cancel goal creation")]
    Cancel,
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Missing token, invalid `BOT_API_URL` or HTTP client failure
pub fn create_bot() -> anyhow::Result<Bot> {
    let token = SecretString::from(config::BOT_TOKEN.clone());
    if token.expose_secret().is_empty() {
        return Err(anyhow::anyhow!("BOT_TOKEN environment variable not set"));
    }

    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(token.expose_secret(), client);

    // Check if local Bot API server is configured
    let bot = match config::BOT_API_URL.as_deref() {
        Some(bot_api_url) => {
            log::info!("Using custom Bot API URL: {}", bot_api_url);
            let url = url::Url::parse(bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
            bot.set_api_url(url)
        }
        None => bot,
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_descriptions() {
        let command_list = format!("{}", Command::descriptions());

        assert!(command_list.contains("The bot understands"));
        assert!(command_list.contains("/create"));
        assert!(command_list.contains("/cancel"));
    }

    #[test]
    fn test_menu_commands_are_routed() {
        for command in Command::bot_commands() {
            let text = format!("/{}", command.command.trim_start_matches('/'));
            assert!(goalcore::Command::parse(&text).is_some(), "{} is not routed", text);
        }
    }
}
