use rusqlite::{params, Connection, Result};
use serde::Serialize;

use crate::core::error::{AppError, AppResult};
use crate::storage::db::now_timestamp;
use crate::storage::goals::get_user_goal;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalComment {
    pub id: i64,
    pub goal_id: i64,
    pub user_id: i64,
    pub text: String,
    pub created: String,
}

/// Adds a comment to one of the user's goals.
pub fn add_comment(conn: &Connection, goal_id: i64, user_id: i64, text: &str) -> AppResult<GoalComment> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("comment must not be empty".to_string()));
    }
    if get_user_goal(conn, goal_id, user_id)?.is_none() {
        return Err(AppError::NotFound(format!("goal {}", goal_id)));
    }

    let now = now_timestamp();
    conn.execute(
        "INSERT INTO goal_comments (goal_id, user_id, text, created, updated) VALUES (?1, ?2, ?3, ?4, ?4)",
        params![goal_id, user_id, text, now],
    )?;

    Ok(GoalComment {
        id: conn.last_insert_rowid(),
        goal_id,
        user_id,
        text: text.to_string(),
        created: now,
    })
}

/// Comments of a goal, newest first.
pub fn list_goal_comments(conn: &Connection, goal_id: i64) -> Result<Vec<GoalComment>> {
    let mut stmt = conn.prepare(
        "SELECT id, goal_id, user_id, text, created FROM goal_comments WHERE goal_id = ?1 ORDER BY id DESC",
    )?;
    let rows = stmt.query_map(params![goal_id], |row| {
        Ok(GoalComment {
            id: row.get(0)?,
            goal_id: row.get(1)?,
            user_id: row.get(2)?,
            text: row.get(3)?,
            created: row.get(4)?,
        })
    })?;
    rows.collect()
}
