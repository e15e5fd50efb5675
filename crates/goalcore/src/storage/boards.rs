//! Boards and their participants

use indoc::indoc;
use rusqlite::{params, Connection, OptionalExtension, Result};
use serde::Serialize;
use strum::{FromRepr, IntoStaticStr};

use crate::core::error::{AppError, AppResult};
use crate::storage::db::now_timestamp;

/// Longest title accepted for boards, categories and goals
pub const MAX_TITLE_LEN: usize = 255;

/// Participant role on a board. Only the owner may manage participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, FromRepr, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
#[repr(u8)]
pub enum Role {
    Owner = 1,
    Writer = 2,
    Reader = 3,
}

impl Role {
    /// Stored integer value
    pub fn code(self) -> i64 {
        self as i64
    }

    /// Parses the stored integer value
    pub fn from_code(code: i64) -> Option<Self> {
        u8::try_from(code).ok().and_then(Self::from_repr)
    }

    /// Localization key for the human readable label
    pub fn label_key(self) -> String {
        let name: &'static str = self.into();
        format!("role-{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    pub id: i64,
    pub title: String,
    pub is_deleted: bool,
}

/// A board together with the caller's role on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardMembership {
    pub board: Board,
    pub role: Role,
}

/// Trims a title and checks it against `MAX_TITLE_LEN`.
pub(crate) fn validate_title(title: &str) -> AppResult<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title must not be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::Validation(format!(
            "title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(title)
}

fn role_from_sql(code: i64) -> Result<Role> {
    Role::from_code(code).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Integer,
            format!("unknown role {}", code).into(),
        )
    })
}

/// Creates a board and makes `owner_id` its owner.
pub fn create_board(conn: &Connection, title: &str, owner_id: i64) -> AppResult<Board> {
    let title = validate_title(title)?;
    let now = now_timestamp();

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO boards (title, is_deleted, created, updated) VALUES (?1, 0, ?2, ?2)",
        params![title, now],
    )?;
    let board_id = tx.last_insert_rowid();
    tx.execute(
        "INSERT INTO board_participants (board_id, user_id, role, created, updated) VALUES (?1, ?2, ?3, ?4, ?4)",
        params![board_id, owner_id, Role::Owner.code(), now],
    )?;
    tx.commit()?;

    Ok(Board {
        id: board_id,
        title: title.to_string(),
        is_deleted: false,
    })
}

/// Adds a participant or changes the role of an existing one.
pub fn add_participant(conn: &Connection, board_id: i64, user_id: i64, role: Role) -> AppResult<()> {
    let board_exists: Option<i64> = conn
        .query_row(
            "SELECT id FROM boards WHERE id = ?1 AND is_deleted = 0",
            params![board_id],
            |row| row.get(0),
        )
        .optional()?;
    if board_exists.is_none() {
        return Err(AppError::NotFound(format!("board {}", board_id)));
    }

    conn.execute(
        indoc! {"
            INSERT INTO board_participants (board_id, user_id, role, created, updated)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT(board_id, user_id) DO UPDATE SET role = excluded.role, updated = excluded.updated
        "},
        params![board_id, user_id, role.code(), now_timestamp()],
    )?;
    Ok(())
}

/// Lists non-deleted boards the user participates in, with their role.
pub fn list_user_boards(conn: &Connection, user_id: i64) -> Result<Vec<BoardMembership>> {
    let mut stmt = conn.prepare(indoc! {"
        SELECT b.id, b.title, b.is_deleted, p.role
        FROM board_participants p
        JOIN boards b ON b.id = p.board_id
        WHERE p.user_id = ?1 AND b.is_deleted = 0
        ORDER BY b.title, b.id
    "})?;

    let rows = stmt.query_map(params![user_id], |row| {
        Ok(BoardMembership {
            board: Board {
                id: row.get(0)?,
                title: row.get(1)?,
                is_deleted: row.get(2)?,
            },
            role: role_from_sql(row.get(3)?)?,
        })
    })?;

    rows.collect()
}

/// Marks a board as deleted. Only the owner may do this.
///
/// Returns `false` when the board does not exist or the user is not its owner.
pub fn soft_delete_board(conn: &Connection, board_id: i64, user_id: i64) -> Result<bool> {
    let updated = conn.execute(
        indoc! {"
            UPDATE boards SET is_deleted = 1, updated = ?1
            WHERE id = ?2 AND is_deleted = 0 AND EXISTS (
                SELECT 1 FROM board_participants
                WHERE board_id = ?2 AND user_id = ?3 AND role = ?4
            )
        "},
        params![now_timestamp(), board_id, user_id, Role::Owner.code()],
    )?;
    Ok(updated > 0)
}
