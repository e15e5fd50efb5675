//! One sender's goal-creation session
//!
//! Fields are collected strictly in the order category → title → description →
//! due date. Each setter checks the current `Stage` and refuses to run out of order.

use std::time::{Duration, Instant};

use thiserror::Error;

use crate::storage::categories::GoalCategory;
use crate::storage::goals::NewGoal;

/// Where a sender is in the goal-creation flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Idle,
    AwaitingCategory,
    AwaitingTitle,
    AwaitingDescription,
    AwaitingDueDate,
}

/// Fields collected so far. Each is set at most once per session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalDraft {
    pub category: Option<GoalCategory>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("expected stage {expected:?}, session is at {actual:?}")]
    OutOfOrder { expected: Stage, actual: Stage },
}

#[derive(Debug, Clone)]
pub struct Session {
    owner: i64,
    chat_id: i64,
    stage: Stage,
    draft: GoalDraft,
    last_activity: Instant,
}

impl Session {
    /// Opens a session for `owner` right after the category list was shown.
    pub fn open(owner: i64, chat_id: i64) -> Self {
        Self {
            owner,
            chat_id,
            stage: Stage::AwaitingCategory,
            draft: GoalDraft::default(),
            last_activity: Instant::now(),
        }
    }

    pub fn owner(&self) -> i64 {
        self.owner
    }

    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn draft(&self) -> &GoalDraft {
        &self.draft
    }

    fn expect(&self, expected: Stage) -> Result<(), SessionError> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(SessionError::OutOfOrder {
                expected,
                actual: self.stage,
            })
        }
    }

    pub fn set_category(&mut self, category: GoalCategory) -> Result<(), SessionError> {
        self.expect(Stage::AwaitingCategory)?;
        self.draft.category = Some(category);
        self.stage = Stage::AwaitingTitle;
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), SessionError> {
        self.expect(Stage::AwaitingTitle)?;
        self.draft.title = Some(title.into());
        self.stage = Stage::AwaitingDescription;
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<(), SessionError> {
        self.expect(Stage::AwaitingDescription)?;
        self.draft.description = Some(description.into());
        self.stage = Stage::AwaitingDueDate;
        Ok(())
    }

    /// Records the raw due date and returns the goal to persist.
    ///
    /// The session is finished afterwards (`Stage::Idle`); the caller drops it
    /// once the goal is stored.
    pub fn set_due_date(&mut self, due_date: impl Into<String>) -> Result<NewGoal, SessionError> {
        self.expect(Stage::AwaitingDueDate)?;
        let due_date = due_date.into();
        self.draft.due_date = Some(due_date.clone());
        self.stage = Stage::Idle;

        let (Some(category), Some(title)) = (self.draft.category.as_ref(), self.draft.title.clone()) else {
            // Stages only advance after their field is set
            return Err(SessionError::OutOfOrder {
                expected: Stage::AwaitingCategory,
                actual: Stage::AwaitingDueDate,
            });
        };

        Ok(NewGoal {
            owner: self.owner,
            category_id: category.id,
            title,
            description: self.draft.description.clone(),
            due_date: Some(due_date),
            priority: Default::default(),
        })
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Whether the session has been left alone for longer than `timeout`.
    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.elapsed() > timeout
    }
}
