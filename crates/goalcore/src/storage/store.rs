//! The store interface used by the command router

use std::sync::Arc;

use crate::core::error::AppResult;
use crate::storage::boards::{self, BoardMembership};
use crate::storage::categories::{self, GoalCategory};
use crate::storage::db::{get_connection, DbPool};
use crate::storage::goals::{self, Goal, GoalView, NewGoal};
use crate::storage::users::{self, TgAccount};

/// Persistence operations the bot needs.
///
/// Calls are synchronous; implementations must be shareable across the
/// dispatcher's tasks.
pub trait GoalStore: Send + Sync {
    /// Returns the Telegram account for `tg_user_id`, creating it on first contact.
    fn find_or_create_account(&self, tg_user_id: i64, chat_id: i64, username: Option<&str>) -> AppResult<TgAccount>;

    /// Replaces the account's verification code and returns the new one.
    fn issue_verification_code(&self, tg_user_id: i64) -> AppResult<String>;

    /// Boards the user participates in.
    fn list_boards(&self, owner: i64) -> AppResult<Vec<BoardMembership>>;

    /// Categories authored by the user, the ones goals can be created in.
    fn list_categories(&self, owner: i64) -> AppResult<Vec<GoalCategory>>;

    /// Categories on every board the user participates in.
    fn list_participant_categories(&self, owner: i64) -> AppResult<Vec<GoalCategory>>;

    /// A live category authored by `owner`, `None` otherwise.
    fn get_category(&self, category_id: i64, owner: i64) -> AppResult<Option<GoalCategory>>;

    /// Persists a goal. The raw due date is parsed here.
    fn create_goal(&self, new_goal: NewGoal) -> AppResult<Goal>;

    fn list_goals(&self, owner: i64) -> AppResult<Vec<GoalView>>;
}

/// `GoalStore` over the SQLite connection pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Arc<DbPool>,
}

impl SqliteStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl GoalStore for SqliteStore {
    fn find_or_create_account(&self, tg_user_id: i64, chat_id: i64, username: Option<&str>) -> AppResult<TgAccount> {
        let conn = get_connection(&self.pool)?;
        Ok(users::find_or_create_account(&conn, tg_user_id, chat_id, username)?)
    }

    fn issue_verification_code(&self, tg_user_id: i64) -> AppResult<String> {
        let conn = get_connection(&self.pool)?;
        users::issue_verification_code(&conn, tg_user_id)
    }

    fn list_boards(&self, owner: i64) -> AppResult<Vec<BoardMembership>> {
        let conn = get_connection(&self.pool)?;
        Ok(boards::list_user_boards(&conn, owner)?)
    }

    fn list_categories(&self, owner: i64) -> AppResult<Vec<GoalCategory>> {
        let conn = get_connection(&self.pool)?;
        Ok(categories::list_user_categories(&conn, owner)?)
    }

    fn list_participant_categories(&self, owner: i64) -> AppResult<Vec<GoalCategory>> {
        let conn = get_connection(&self.pool)?;
        Ok(categories::list_participant_categories(&conn, owner)?)
    }

    fn get_category(&self, category_id: i64, owner: i64) -> AppResult<Option<GoalCategory>> {
        let conn = get_connection(&self.pool)?;
        Ok(categories::get_user_category(&conn, category_id, owner)?)
    }

    fn create_goal(&self, new_goal: NewGoal) -> AppResult<Goal> {
        let conn = get_connection(&self.pool)?;
        let goal = goals::create_goal(&conn, &new_goal)?;
        log::info!("Created goal {} for user {}", goal.id, goal.user_id);
        Ok(goal)
    }

    fn list_goals(&self, owner: i64) -> AppResult<Vec<GoalView>> {
        let conn = get_connection(&self.pool)?;
        Ok(goals::list_user_goals(&conn, owner)?)
    }
}
