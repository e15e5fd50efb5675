//! Routes every inbound message: account check, listing commands and the
//! goal-creation flow.

use std::str::FromStr;
use std::sync::Arc;

use fluent_templates::fluent_bundle::FluentArgs;
use strum::{EnumString, IntoStaticStr};
use unic_langid::LanguageIdentifier;

use crate::conversation::{GoalFlow, SessionRegistry};
use crate::core::error::AppResult;
use crate::core::metrics;
use crate::i18n;
use crate::storage::goals::GoalView;
use crate::storage::store::GoalStore;
use crate::transport::{Inbound, Reply, Transport};

/// Commands understood by the bot. They are never treated as session input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Command {
    Start,
    Help,
    Cancel,
    Board,
    Category,
    Goals,
    Create,
}

impl Command {
    /// Parses `/name`, `/name@botname` or `/name args`.
    ///
    /// Returns `None` for plain text and for unknown commands.
    pub fn parse(text: &str) -> Option<Self> {
        let token = text.split_whitespace().next()?;
        let name = token.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);
        Command::from_str(name).ok()
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

pub struct CommandRouter<S: GoalStore> {
    store: Arc<S>,
    flow: GoalFlow<S>,
    site_url: String,
}

impl<S: GoalStore> CommandRouter<S> {
    pub fn new(store: Arc<S>, sessions: SessionRegistry, site_url: impl Into<String>) -> Self {
        Self {
            flow: GoalFlow::new(Arc::clone(&store), sessions),
            store,
            site_url: site_url.into(),
        }
    }

    pub fn flow(&self) -> &GoalFlow<S> {
        &self.flow
    }

    /// Replies to one inbound message. Failures become a generic apology.
    pub fn handle(&self, msg: &Inbound) -> Vec<Reply> {
        let lang = i18n::lang_from_code(msg.language_code.as_deref());

        let texts = match self.route(msg, &lang) {
            Ok(texts) => texts,
            Err(e) => {
                log::error!("Failed to handle message from {}: {}", msg.sender_id, e);
                metrics::record_failure(e.kind());
                vec![i18n::t(&lang, "generic-failure")]
            }
        };

        texts.into_iter().map(|text| Reply::new(msg.chat_id, text)).collect()
    }

    /// Handles the message and sends the replies, in order, through `transport`.
    pub async fn receive<T>(&self, transport: &T, msg: &Inbound) -> AppResult<()>
    where
        T: Transport + ?Sized,
    {
        for reply in self.handle(msg) {
            transport.send(reply.chat_id, &reply.text).await?;
        }
        Ok(())
    }

    fn route(&self, msg: &Inbound, lang: &LanguageIdentifier) -> AppResult<Vec<String>> {
        let account = self
            .store
            .find_or_create_account(msg.sender_id, msg.chat_id, msg.username.as_deref())?;

        let Some(owner) = account.user_id else {
            metrics::record_command("unlinked");
            if self.flow.cancel(msg.sender_id) {
                log::warn!("Dropped goal session of unlinked sender {}", msg.sender_id);
            }
            let code = self.store.issue_verification_code(msg.sender_id)?;

            let mut args = FluentArgs::new();
            args.set("site", self.site_url.clone());
            let prompt = i18n::t_args(lang, "link-required", &args);

            let mut args = FluentArgs::new();
            args.set("code", code);
            return Ok(vec![prompt, i18n::t_args(lang, "verification-code", &args)]);
        };

        let command = Command::parse(&msg.text);
        metrics::record_command(command.map_or("text", Command::name));

        let Some(command) = command else {
            return Ok(match self.flow.handle_input(msg.sender_id, &msg.text, lang) {
                Some(reply) => vec![reply?],
                None => vec![i18n::t(lang, "unknown-command")],
            });
        };

        log::debug!("Command /{} from {}", command.name(), msg.sender_id);

        match command {
            Command::Start => {
                let name = msg
                    .first_name
                    .as_deref()
                    .or(msg.username.as_deref())
                    .unwrap_or_default();
                let mut args = FluentArgs::new();
                args.set("name", name.to_string());
                let greeting = format!(
                    "{}\n{}",
                    i18n::t_args(lang, "start-greeting", &args),
                    i18n::t(lang, "help-commands")
                );
                Ok(self.with_cancellation(msg.sender_id, greeting, lang))
            }
            Command::Help => Ok(self.with_cancellation(msg.sender_id, i18n::t(lang, "help-commands"), lang)),
            Command::Cancel => Ok(vec![if self.flow.cancel(msg.sender_id) {
                i18n::t(lang, "operation-cancelled")
            } else {
                i18n::t(lang, "nothing-to-cancel")
            }]),
            Command::Board => self.list_boards(owner, lang),
            Command::Category => self.list_categories(owner, lang),
            Command::Goals => self.list_goals(owner, lang),
            Command::Create => Ok(vec![self.flow.begin(msg.sender_id, owner, msg.chat_id, lang)?]),
        }
    }

    /// `/start` and `/help` also end an open session.
    fn with_cancellation(&self, sender_id: i64, text: String, lang: &LanguageIdentifier) -> Vec<String> {
        let mut replies = vec![text];
        if self.flow.cancel(sender_id) {
            replies.push(i18n::t(lang, "operation-cancelled"));
        }
        replies
    }

    fn list_boards(&self, owner: i64, lang: &LanguageIdentifier) -> AppResult<Vec<String>> {
        let boards = self.store.list_boards(owner)?;
        if boards.is_empty() {
            return Ok(vec![i18n::t(lang, "boards-empty")]);
        }

        Ok(boards
            .into_iter()
            .map(|membership| {
                let mut args = FluentArgs::new();
                args.set("title", membership.board.title);
                args.set("role", i18n::t(lang, &membership.role.label_key()));
                i18n::t_args(lang, "board-item", &args)
            })
            .collect())
    }

    fn list_categories(&self, owner: i64, lang: &LanguageIdentifier) -> AppResult<Vec<String>> {
        let categories = self.store.list_participant_categories(owner)?;
        if categories.is_empty() {
            return Ok(vec![i18n::t(lang, "categories-empty")]);
        }

        let mut text = i18n::t(lang, "categories-header");
        for category in &categories {
            text.push('\n');
            text.push_str(&format!("{} {}", category.id, category.title));
        }
        Ok(vec![text])
    }

    fn list_goals(&self, owner: i64, lang: &LanguageIdentifier) -> AppResult<Vec<String>> {
        let goals = self.store.list_goals(owner)?;
        if goals.is_empty() {
            return Ok(vec![i18n::t(lang, "goals-empty")]);
        }

        Ok(goals.into_iter().map(|view| goal_card(view, lang)).collect())
    }
}

fn goal_card(view: GoalView, lang: &LanguageIdentifier) -> String {
    let none = i18n::t(lang, "goal-no-value");
    let goal = view.goal;

    let mut args = FluentArgs::new();
    args.set("title", goal.title);
    args.set("category", view.category_title);
    args.set("description", goal.description.unwrap_or_else(|| none.clone()));
    args.set("status", i18n::t(lang, &goal.status.label_key()));
    args.set("owner", view.owner_username);
    args.set("due", goal.due_date.map_or(none, |d| d.to_string()));
    i18n::t_args(lang, "goal-card", &args)
}
