//! Site users and the Telegram accounts linked to them

use indoc::indoc;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::Serialize;

use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::storage::db::now_timestamp;

/// A goal tracker user (the account on the site).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl User {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            email: row.get(4)?,
        })
    }
}

/// A Telegram identity, optionally linked to a `User`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TgAccount {
    /// Telegram user id of the sender
    pub tg_user_id: i64,
    /// Private chat with the bot
    pub chat_id: i64,
    pub username: Option<String>,
    /// Linked site user, `None` until the verification code is redeemed
    pub user_id: Option<i64>,
    pub verification_code: Option<String>,
}

impl TgAccount {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            tg_user_id: row.get(0)?,
            chat_id: row.get(1)?,
            username: row.get(2)?,
            user_id: row.get(3)?,
            verification_code: row.get(4)?,
        })
    }

    /// Whether this Telegram identity may use the bot.
    pub fn is_linked(&self) -> bool {
        self.user_id.is_some()
    }
}

const SELECT_USER: &str = "SELECT id, username, first_name, last_name, email FROM users";
const SELECT_ACCOUNT: &str = "SELECT tg_user_id, chat_id, username, user_id, verification_code FROM tg_accounts";

/// Creates a site user.
///
/// # Errors
///
/// `AppError::Validation` for an empty username, `AppError::Database` when the
/// username is already taken.
pub fn create_user(
    conn: &Connection,
    username: &str,
    first_name: Option<&str>,
    last_name: Option<&str>,
    email: Option<&str>,
) -> AppResult<User> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::Validation("username must not be empty".to_string()));
    }

    let now = now_timestamp();
    conn.execute(
        "INSERT INTO users (username, first_name, last_name, email, created, updated) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![username, first_name, last_name, email, now],
    )?;

    Ok(User {
        id: conn.last_insert_rowid(),
        username: username.to_string(),
        first_name: first_name.map(str::to_string),
        last_name: last_name.map(str::to_string),
        email: email.map(str::to_string),
    })
}

/// Looks up a user by id.
pub fn get_user(conn: &Connection, user_id: i64) -> Result<Option<User>> {
    conn.query_row(&format!("{SELECT_USER} WHERE id = ?1"), params![user_id], User::from_row)
        .optional()
}

/// Looks up a user by username.
pub fn get_user_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
    conn.query_row(
        &format!("{SELECT_USER} WHERE username = ?1"),
        params![username],
        User::from_row,
    )
    .optional()
}

/// Returns the Telegram account for `tg_user_id`, creating it on first contact.
///
/// The stored chat id and username are refreshed on every call so replies
/// always go to the chat the user last wrote from.
pub fn find_or_create_account(
    conn: &Connection,
    tg_user_id: i64,
    chat_id: i64,
    username: Option<&str>,
) -> Result<TgAccount> {
    let now = now_timestamp();
    conn.execute(
        indoc! {"
            INSERT INTO tg_accounts (tg_user_id, chat_id, username, created, updated)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT(tg_user_id) DO UPDATE SET
                chat_id = excluded.chat_id,
                username = excluded.username,
                updated = excluded.updated
        "},
        params![tg_user_id, chat_id, username, now],
    )?;

    conn.query_row(
        &format!("{SELECT_ACCOUNT} WHERE tg_user_id = ?1"),
        params![tg_user_id],
        TgAccount::from_row,
    )
}

/// Generates a fresh one-time verification code.
pub fn generate_verification_code() -> String {
    uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(config::verification::CODE_LENGTH)
        .collect::<String>()
        .to_uppercase()
}

/// Stores a new verification code for the account and returns it.
///
/// Any previously issued code stops working.
pub fn issue_verification_code(conn: &Connection, tg_user_id: i64) -> AppResult<String> {
    let code = generate_verification_code();
    let updated = conn.execute(
        "UPDATE tg_accounts SET verification_code = ?1, updated = ?2 WHERE tg_user_id = ?3",
        params![code, now_timestamp(), tg_user_id],
    )?;
    if updated == 0 {
        return Err(AppError::NotFound(format!("telegram account {}", tg_user_id)));
    }
    Ok(code)
}

/// Redeems a verification code, linking the Telegram account to `user_id`.
///
/// The code is consumed on success.
pub fn link_account(conn: &Connection, code: &str, user_id: i64) -> AppResult<TgAccount> {
    let code = code.trim().to_uppercase();
    let account = conn
        .query_row(
            &format!("{SELECT_ACCOUNT} WHERE verification_code = ?1"),
            params![code],
            TgAccount::from_row,
        )
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("verification code {}", code)))?;

    if get_user(conn, user_id)?.is_none() {
        return Err(AppError::NotFound(format!("user {}", user_id)));
    }

    conn.execute(
        "UPDATE tg_accounts SET user_id = ?1, verification_code = NULL, updated = ?2 WHERE tg_user_id = ?3",
        params![user_id, now_timestamp(), account.tg_user_id],
    )?;

    log::info!("Linked telegram account {} to user {}", account.tg_user_id, user_id);

    Ok(TgAccount {
        user_id: Some(user_id),
        verification_code: None,
        ..account
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::migrations::run_migrations;

    fn conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&mut conn).unwrap();
        conn
    }

    #[test]
    fn test_create_and_get_user() {
        let conn = conn();
        let user = create_user(&conn, "alice", Some("Alice"), None, None).unwrap();

        assert_eq!(get_user(&conn, user.id).unwrap(), Some(user.clone()));
        assert_eq!(get_user_by_username(&conn, "alice").unwrap(), Some(user));
        assert_eq!(get_user_by_username(&conn, "bob").unwrap(), None);
    }

    #[test]
    fn test_create_user_rejects_blank_username() {
        let conn = conn();
        assert!(matches!(
            create_user(&conn, "  ", None, None, None),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_find_or_create_account_is_idempotent() {
        let conn = conn();
        let first = find_or_create_account(&conn, 42, 100, Some("tg_alice")).unwrap();
        let second = find_or_create_account(&conn, 42, 101, Some("tg_alice")).unwrap();

        assert!(!first.is_linked());
        assert_eq!(second.tg_user_id, 42);
        assert_eq!(second.chat_id, 101);
    }

    #[test]
    fn test_verification_code_links_account_once() {
        let conn = conn();
        let user = create_user(&conn, "alice", None, None, None).unwrap();
        find_or_create_account(&conn, 42, 100, None).unwrap();

        let code = issue_verification_code(&conn, 42).unwrap();
        assert_eq!(code.len(), config::verification::CODE_LENGTH);

        let linked = link_account(&conn, &code.to_lowercase(), user.id).unwrap();
        assert_eq!(linked.user_id, Some(user.id));
        assert!(linked.verification_code.is_none());

        assert!(matches!(link_account(&conn, &code, user.id), Err(AppError::NotFound(_))));
        assert!(find_or_create_account(&conn, 42, 100, None).unwrap().is_linked());
    }

    #[test]
    fn test_issue_code_for_unknown_account() {
        let conn = conn();
        assert!(matches!(issue_verification_code(&conn, 7), Err(AppError::NotFound(_))));
    }
}
