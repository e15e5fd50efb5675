//! The goal-creation state machine
//!
//! `Idle` → `AwaitingCategory` → `AwaitingTitle` → `AwaitingDescription` →
//! `AwaitingDueDate` → `Idle`, persisting exactly one goal per completed cycle.
//! Intermediate fields live only in the sender's `Session`.

use std::sync::Arc;

use fluent_templates::fluent_bundle::FluentArgs;
use itertools::Itertools;
use thiserror::Error;
use unic_langid::LanguageIdentifier;

use crate::conversation::registry::SessionRegistry;
use crate::conversation::session::{Session, SessionError, Stage};
use crate::core::error::{AppError, AppResult};
use crate::core::metrics;
use crate::i18n;
use crate::storage::boards::{validate_title, MAX_TITLE_LEN};
use crate::storage::categories::GoalCategory;
use crate::storage::goals::Goal;
use crate::storage::store::GoalStore;

/// Why a message did not advance the session.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Not a number, or not one of the sender's categories
    #[error("invalid category '{0}'")]
    InvalidCategory(String),

    #[error("invalid title")]
    InvalidTitle,

    /// Rejected by the store's date parser
    #[error("invalid due date '{0}'")]
    InvalidDueDate(String),

    /// The selected category was deleted while the session was open
    #[error("category {0} is no longer available")]
    CategoryUnavailable(i64),

    #[error(transparent)]
    OutOfOrder(#[from] SessionError),

    #[error(transparent)]
    Store(#[from] AppError),
}

impl FlowError {
    /// Label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            FlowError::InvalidCategory(_) => "invalid_category",
            FlowError::InvalidTitle => "invalid_title",
            FlowError::InvalidDueDate(_) => "invalid_due_date",
            FlowError::CategoryUnavailable(_) => "category_unavailable",
            FlowError::OutOfOrder(_) => "out_of_order",
            FlowError::Store(_) => "store",
        }
    }

    /// Whether the session must be thrown away instead of re-prompting.
    fn ends_session(&self) -> bool {
        matches!(self, FlowError::OutOfOrder(_) | FlowError::CategoryUnavailable(_))
    }
}

/// Outcome of one accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    CategorySelected(GoalCategory),
    TitleRecorded,
    DescriptionRecorded,
    GoalCreated(Goal),
}

/// Drives goal-creation sessions against a store.
pub struct GoalFlow<S: GoalStore> {
    store: Arc<S>,
    sessions: SessionRegistry,
}

impl<S: GoalStore> GoalFlow<S> {
    pub fn new(store: Arc<S>, sessions: SessionRegistry) -> Self {
        Self { store, sessions }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn stage(&self, sender_id: i64) -> Stage {
        self.sessions.stage(sender_id)
    }

    /// `/create`: shows the sender's categories and opens a session.
    ///
    /// Restarts the flow when a session is already open. With no categories
    /// the sender stays idle.
    pub fn begin(&self, sender_id: i64, owner: i64, chat_id: i64, lang: &LanguageIdentifier) -> AppResult<String> {
        let categories = self.store.list_categories(owner)?;

        if categories.is_empty() {
            self.sessions.remove(sender_id);
            return Ok(i18n::t(lang, "categories-empty"));
        }

        let lines = categories.iter().map(|c| format!("{}: {}", c.id, c.title)).join("\n");
        if self.sessions.get(sender_id).is_some() {
            log::info!("Restarting goal session of {}", sender_id);
        }
        self.sessions.put(sender_id, Session::open(owner, chat_id));

        Ok(format!(
            "{}\n{}\n{}",
            i18n::t(lang, "create-choose-category"),
            lines,
            i18n::t(lang, "create-cancel-hint")
        ))
    }

    /// Drops the sender's session. Returns whether one was open.
    pub fn cancel(&self, sender_id: i64) -> bool {
        self.sessions.remove(sender_id).is_some()
    }

    /// Feeds a non-command message into the sender's session.
    ///
    /// `None` when the sender has no open session. Input errors become a
    /// re-prompt; only store failures are returned as `Err`, leaving the
    /// session as it was.
    pub fn handle_input(&self, sender_id: i64, text: &str, lang: &LanguageIdentifier) -> Option<AppResult<String>> {
        let original = self.sessions.get(sender_id)?;
        let mut session = original.clone();

        let reply = match self.step(&mut session, text) {
            Ok(step) => {
                if let Step::GoalCreated(_) = step {
                    self.sessions.remove(sender_id);
                    metrics::GOALS_CREATED_TOTAL.inc();
                } else {
                    session.touch();
                    self.sessions.put(sender_id, session);
                }
                step_reply(&step, lang)
            }
            Err(FlowError::Store(err)) => return Some(Err(err)),
            Err(err) => {
                log::info!("Rejected input from {} at {:?}: {}", sender_id, original.stage(), err);
                metrics::record_flow_error(err.kind());
                if err.ends_session() {
                    self.sessions.remove(sender_id);
                } else {
                    // Fields stay as they were, only the idle clock restarts
                    let mut kept = original;
                    kept.touch();
                    self.sessions.put(sender_id, kept);
                }
                error_reply(&err, lang)
            }
        };

        Some(Ok(reply))
    }

    /// Applies one message to `session` according to its stage.
    pub fn step(&self, session: &mut Session, text: &str) -> Result<Step, FlowError> {
        match session.stage() {
            Stage::AwaitingCategory => {
                let input = text.trim();
                let category_id: i64 = input
                    .parse()
                    .map_err(|_| FlowError::InvalidCategory(input.to_string()))?;
                let category = self
                    .store
                    .get_category(category_id, session.owner())?
                    .ok_or_else(|| FlowError::InvalidCategory(input.to_string()))?;
                session.set_category(category.clone())?;
                Ok(Step::CategorySelected(category))
            }
            Stage::AwaitingTitle => {
                validate_title(text).map_err(|_| FlowError::InvalidTitle)?;
                session.set_title(text)?;
                Ok(Step::TitleRecorded)
            }
            Stage::AwaitingDescription => {
                session.set_description(text)?;
                Ok(Step::DescriptionRecorded)
            }
            Stage::AwaitingDueDate => {
                let new_goal = session.set_due_date(text)?;
                let category_id = new_goal.category_id;
                match self.store.create_goal(new_goal) {
                    Ok(goal) => Ok(Step::GoalCreated(goal)),
                    Err(AppError::Validation(_)) => Err(FlowError::InvalidDueDate(text.trim().to_string())),
                    Err(AppError::NotFound(_)) => Err(FlowError::CategoryUnavailable(category_id)),
                    Err(err) => Err(FlowError::Store(err)),
                }
            }
            Stage::Idle => Err(SessionError::OutOfOrder {
                expected: Stage::AwaitingCategory,
                actual: Stage::Idle,
            }
            .into()),
        }
    }
}

fn step_reply(step: &Step, lang: &LanguageIdentifier) -> String {
    match step {
        Step::CategorySelected(category) => {
            let mut args = FluentArgs::new();
            args.set("category", category.title.clone());
            i18n::t_args(lang, "create-category-selected", &args)
        }
        Step::TitleRecorded => i18n::t(lang, "create-enter-description"),
        Step::DescriptionRecorded => i18n::t(lang, "create-enter-due-date"),
        Step::GoalCreated(goal) => {
            let mut args = FluentArgs::new();
            args.set("title", goal.title.clone());
            i18n::t_args(lang, "create-goal-created", &args)
        }
    }
}

fn error_reply(err: &FlowError, lang: &LanguageIdentifier) -> String {
    let mut args = FluentArgs::new();
    match err {
        FlowError::InvalidCategory(input) => {
            args.set("input", input.clone());
            i18n::t_args(lang, "create-invalid-category", &args)
        }
        FlowError::InvalidTitle => {
            args.set("max", MAX_TITLE_LEN);
            i18n::t_args(lang, "create-invalid-title", &args)
        }
        FlowError::InvalidDueDate(input) => {
            args.set("input", input.clone());
            i18n::t_args(lang, "create-invalid-due-date", &args)
        }
        FlowError::CategoryUnavailable(_) => i18n::t(lang, "create-category-gone"),
        FlowError::OutOfOrder(_) | FlowError::Store(_) => i18n::t(lang, "create-out-of-order"),
    }
}
