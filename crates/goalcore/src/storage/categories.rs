//! Goal categories. A category belongs to one board and one author.

use indoc::indoc;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::Serialize;

use crate::core::error::{AppError, AppResult};
use crate::storage::boards::{validate_title, Role};
use crate::storage::db::now_timestamp;
use crate::storage::goals::GoalStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalCategory {
    pub id: i64,
    pub board_id: i64,
    pub title: String,
    /// Author of the category
    pub user_id: i64,
    pub is_deleted: bool,
}

impl GoalCategory {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            board_id: row.get(1)?,
            title: row.get(2)?,
            user_id: row.get(3)?,
            is_deleted: row.get(4)?,
        })
    }
}

impl std::fmt::Display for GoalCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

/// Live categories on live boards
const SELECT_LIVE_CATEGORY: &str = indoc! {"
    SELECT c.id, c.board_id, c.title, c.user_id, c.is_deleted
    FROM goal_categories c
    JOIN boards b ON b.id = c.board_id
    WHERE c.is_deleted = 0 AND b.is_deleted = 0
"};

/// Creates a category on a board.
///
/// The author must be an owner or writer of the board.
pub fn create_category(conn: &Connection, board_id: i64, user_id: i64, title: &str) -> AppResult<GoalCategory> {
    let title = validate_title(title)?;

    let role: Option<i64> = conn
        .query_row(
            indoc! {"
                SELECT p.role FROM board_participants p
                JOIN boards b ON b.id = p.board_id
                WHERE p.board_id = ?1 AND p.user_id = ?2 AND b.is_deleted = 0
            "},
            params![board_id, user_id],
            |row| row.get(0),
        )
        .optional()?;

    match role.and_then(Role::from_code) {
        Some(Role::Owner | Role::Writer) => {}
        Some(Role::Reader) => {
            return Err(AppError::Validation(format!(
                "user {} may only read board {}",
                user_id, board_id
            )))
        }
        None => return Err(AppError::NotFound(format!("board {}", board_id))),
    }

    let now = now_timestamp();
    conn.execute(
        "INSERT INTO goal_categories (board_id, title, user_id, is_deleted, created, updated) VALUES (?1, ?2, ?3, 0, ?4, ?4)",
        params![board_id, title, user_id, now],
    )?;

    Ok(GoalCategory {
        id: conn.last_insert_rowid(),
        board_id,
        title: title.to_string(),
        user_id,
        is_deleted: false,
    })
}

/// Categories authored by the user, the ones goals can be created in.
///
/// Categories of deleted boards are left out.
pub fn list_user_categories(conn: &Connection, user_id: i64) -> Result<Vec<GoalCategory>> {
    let mut stmt = conn.prepare(&format!("{SELECT_LIVE_CATEGORY} AND c.user_id = ?1 ORDER BY c.id"))?;
    let rows = stmt.query_map(params![user_id], GoalCategory::from_row)?;
    rows.collect()
}

/// Categories on every live board the user participates in.
pub fn list_participant_categories(conn: &Connection, user_id: i64) -> Result<Vec<GoalCategory>> {
    let mut stmt = conn.prepare(indoc! {"
        SELECT c.id, c.board_id, c.title, c.user_id, c.is_deleted
        FROM goal_categories c
        JOIN boards b ON b.id = c.board_id
        WHERE c.is_deleted = 0 AND b.is_deleted = 0 AND EXISTS (
            SELECT 1 FROM board_participants p WHERE p.board_id = c.board_id AND p.user_id = ?1
        )
        ORDER BY c.title, c.id
    "})?;
    let rows = stmt.query_map(params![user_id], GoalCategory::from_row)?;
    rows.collect()
}

/// Looks up a live category on a live board, authored by the user.
pub fn get_user_category(conn: &Connection, category_id: i64, user_id: i64) -> Result<Option<GoalCategory>> {
    conn.query_row(
        &format!("{SELECT_LIVE_CATEGORY} AND c.id = ?1 AND c.user_id = ?2"),
        params![category_id, user_id],
        GoalCategory::from_row,
    )
    .optional()
}

/// Marks a category as deleted and archives its goals.
///
/// Returns `false` when the category does not exist or belongs to someone else.
pub fn soft_delete_category(conn: &Connection, category_id: i64, user_id: i64) -> Result<bool> {
    let now = now_timestamp();
    let tx = conn.unchecked_transaction()?;
    let updated = tx.execute(
        "UPDATE goal_categories SET is_deleted = 1, updated = ?1 WHERE id = ?2 AND user_id = ?3 AND is_deleted = 0",
        params![now, category_id, user_id],
    )?;
    if updated == 0 {
        return Ok(false);
    }
    let archived = tx.execute(
        "UPDATE goals SET status = ?1, updated = ?2 WHERE category_id = ?3",
        params![GoalStatus::Archived.code(), now, category_id],
    )?;
    tx.commit()?;

    log::info!("Deleted category {} and archived {} goals", category_id, archived);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::boards::{add_participant, create_board, soft_delete_board};
    use crate::storage::migrations::run_migrations;
    use crate::storage::users::create_user;

    fn conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&mut conn).unwrap();
        conn
    }

    #[test]
    fn test_author_sees_own_categories_only() {
        let conn = conn();
        let alice = create_user(&conn, "alice", None, None, None).unwrap();
        let bob = create_user(&conn, "bob", None, None, None).unwrap();
        let board = create_board(&conn, "Shared", alice.id).unwrap();
        add_participant(&conn, board.id, bob.id, Role::Writer).unwrap();

        let work = create_category(&conn, board.id, alice.id, "Work").unwrap();
        let gym = create_category(&conn, board.id, bob.id, "Gym").unwrap();

        assert_eq!(list_user_categories(&conn, alice.id).unwrap(), vec![work.clone()]);
        assert_eq!(get_user_category(&conn, gym.id, alice.id).unwrap(), None);
        assert_eq!(get_user_category(&conn, work.id, alice.id).unwrap(), Some(work));

        // Both participants see both categories of the shared board
        assert_eq!(list_participant_categories(&conn, bob.id).unwrap().len(), 2);
    }

    #[test]
    fn test_reader_cannot_create_category() {
        let conn = conn();
        let alice = create_user(&conn, "alice", None, None, None).unwrap();
        let bob = create_user(&conn, "bob", None, None, None).unwrap();
        let board = create_board(&conn, "Shared", alice.id).unwrap();
        add_participant(&conn, board.id, bob.id, Role::Reader).unwrap();

        assert!(matches!(
            create_category(&conn, board.id, bob.id, "Nope"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            create_category(&conn, board.id + 1, alice.id, "Nope"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_deleted_category_is_hidden() {
        let conn = conn();
        let alice = create_user(&conn, "alice", None, None, None).unwrap();
        let board = create_board(&conn, "Home", alice.id).unwrap();
        let category = create_category(&conn, board.id, alice.id, "Chores").unwrap();

        assert!(soft_delete_category(&conn, category.id, alice.id).unwrap());
        assert!(!soft_delete_category(&conn, category.id, alice.id).unwrap());
        assert!(list_user_categories(&conn, alice.id).unwrap().is_empty());
        assert!(list_participant_categories(&conn, alice.id).unwrap().is_empty());
        assert_eq!(get_user_category(&conn, category.id, alice.id).unwrap(), None);
    }

    #[test]
    fn test_categories_of_deleted_board_are_hidden() {
        let conn = conn();
        let alice = create_user(&conn, "alice", None, None, None).unwrap();
        let home = create_board(&conn, "Home", alice.id).unwrap();
        let work = create_board(&conn, "Work", alice.id).unwrap();
        let chores = create_category(&conn, home.id, alice.id, "Chores").unwrap();
        let reports = create_category(&conn, work.id, alice.id, "Reports").unwrap();

        assert!(soft_delete_board(&conn, home.id, alice.id).unwrap());

        assert_eq!(list_user_categories(&conn, alice.id).unwrap(), vec![reports.clone()]);
        assert_eq!(get_user_category(&conn, chores.id, alice.id).unwrap(), None);
        assert_eq!(get_user_category(&conn, reports.id, alice.id).unwrap(), Some(reports));
    }
}
