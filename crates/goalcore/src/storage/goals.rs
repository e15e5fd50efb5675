//! Goals: creation, listing and status changes

use bon::Builder;
use chrono::NaiveDate;
use indoc::indoc;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::Serialize;
use strum::{FromRepr, IntoStaticStr};

use crate::core::error::{AppError, AppResult};
use crate::storage::boards::validate_title;
use crate::storage::categories::get_user_category;
use crate::storage::db::now_timestamp;

/// Format accepted for due dates, e.g. `2024-03-01`
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, FromRepr, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
#[repr(u8)]
pub enum GoalStatus {
    #[default]
    ToDo = 1,
    InProgress = 2,
    Done = 3,
    Archived = 4,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, FromRepr, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
#[repr(u8)]
pub enum Priority {
    Low = 1,
    #[default]
    Medium = 2,
    High = 3,
    Critical = 4,
}

macro_rules! stored_code {
    ($ty:ty, $prefix:literal) => {
        impl $ty {
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
                format!(concat!($prefix, "-{}"), name)
            }
        }
    };
}

stored_code!(GoalStatus, "status");
stored_code!(Priority, "priority");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Goal {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: GoalStatus,
    pub priority: Priority,
}

/// A goal with the names needed to display it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalView {
    #[serde(flatten)]
    pub goal: Goal,
    pub category_title: String,
    pub owner_username: String,
}

/// Input for `create_goal`.
///
/// `due_date` is the raw user text; it is parsed and validated by the store.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct NewGoal {
    pub owner: i64,
    pub category_id: i64,
    #[builder(into)]
    pub title: String,
    #[builder(into)]
    pub description: Option<String>,
    #[builder(into)]
    pub due_date: Option<String>,
    #[builder(default)]
    pub priority: Priority,
}

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Integer, message.into())
}

impl Goal {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        let due_date: Option<String> = row.get(5)?;
        let status: i64 = row.get(6)?;
        let priority: i64 = row.get(7)?;

        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            category_id: row.get(2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            due_date: due_date.as_deref().and_then(|d| NaiveDate::parse_from_str(d, DUE_DATE_FORMAT).ok()),
            status: GoalStatus::from_code(status).ok_or_else(|| conversion_error(6, format!("unknown status {}", status)))?,
            priority: Priority::from_code(priority)
                .ok_or_else(|| conversion_error(7, format!("unknown priority {}", priority)))?,
        })
    }
}

const SELECT_GOAL: &str =
    "SELECT g.id, g.user_id, g.category_id, g.title, g.description, g.due_date, g.status, g.priority FROM goals g";

/// Parses a `YYYY-MM-DD` due date.
///
/// # Errors
///
/// `AppError::Validation` when the text is not a valid calendar date in that format.
pub fn parse_due_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DUE_DATE_FORMAT)
        .map_err(|e| AppError::Validation(format!("invalid due date '{}': {}", raw.trim(), e)))
}

/// Persists a new goal in one of the owner's categories.
///
/// # Errors
///
/// - `AppError::Validation` for an empty/too long title or a malformed due date
/// - `AppError::NotFound` when the category is missing, deleted or not the owner's
pub fn create_goal(conn: &Connection, new_goal: &NewGoal) -> AppResult<Goal> {
    let title = validate_title(&new_goal.title)?;
    let due_date = new_goal.due_date.as_deref().map(parse_due_date).transpose()?;
    let description = new_goal
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    if get_user_category(conn, new_goal.category_id, new_goal.owner)?.is_none() {
        return Err(AppError::NotFound(format!("category {}", new_goal.category_id)));
    }

    let now = now_timestamp();
    conn.execute(
        indoc! {"
            INSERT INTO goals (user_id, category_id, title, description, due_date, status, priority, created, updated)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
        "},
        params![
            new_goal.owner,
            new_goal.category_id,
            title,
            description,
            due_date.map(|d| d.format(DUE_DATE_FORMAT).to_string()),
            GoalStatus::default().code(),
            new_goal.priority.code(),
            now,
        ],
    )?;

    Ok(Goal {
        id: conn.last_insert_rowid(),
        user_id: new_goal.owner,
        category_id: new_goal.category_id,
        title: title.to_string(),
        description: description.map(str::to_string),
        due_date,
        status: GoalStatus::default(),
        priority: new_goal.priority,
    })
}

/// Lists every goal of the user, oldest first, with category and owner names.
pub fn list_user_goals(conn: &Connection, user_id: i64) -> Result<Vec<GoalView>> {
    let mut stmt = conn.prepare(indoc! {"
        SELECT g.id, g.user_id, g.category_id, g.title, g.description, g.due_date, g.status, g.priority,
               c.title, u.username
        FROM goals g
        JOIN goal_categories c ON c.id = g.category_id
        JOIN users u ON u.id = g.user_id
        WHERE g.user_id = ?1
        ORDER BY g.id
    "})?;

    let rows = stmt.query_map(params![user_id], |row| {
        Ok(GoalView {
            goal: Goal::from_row(row)?,
            category_title: row.get(8)?,
            owner_username: row.get(9)?,
        })
    })?;

    rows.collect()
}

/// Looks up one of the user's goals.
pub fn get_user_goal(conn: &Connection, goal_id: i64, user_id: i64) -> Result<Option<Goal>> {
    conn.query_row(
        &format!("{SELECT_GOAL} WHERE g.id = ?1 AND g.user_id = ?2"),
        params![goal_id, user_id],
        Goal::from_row,
    )
    .optional()
}

/// Changes the status of one of the user's goals.
///
/// Returns `false` when the goal does not exist or belongs to someone else.
pub fn update_goal_status(conn: &Connection, goal_id: i64, user_id: i64, status: GoalStatus) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE goals SET status = ?1, updated = ?2 WHERE id = ?3 AND user_id = ?4",
        params![status.code(), now_timestamp(), goal_id, user_id],
    )?;
    Ok(updated > 0)
}

/// Deleting a goal archives it; the row is kept.
pub fn archive_goal(conn: &Connection, goal_id: i64, user_id: i64) -> Result<bool> {
    update_goal_status(conn, goal_id, user_id, GoalStatus::Archived)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::boards::create_board;
    use crate::storage::categories::create_category;
    use crate::storage::migrations::run_migrations;
    use crate::storage::users::create_user;
    use pretty_assertions::assert_eq;

    struct Fixture {
        conn: Connection,
        owner: i64,
        category_id: i64,
    }

    fn fixture() -> Fixture {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&mut conn).unwrap();
        let owner = create_user(&conn, "alice", None, None, None).unwrap().id;
        let board = create_board(&conn, "Home", owner).unwrap();
        let category_id = create_category(&conn, board.id, owner, "Work").unwrap().id;
        Fixture {
            conn,
            owner,
            category_id,
        }
    }

    #[test]
    fn test_parse_due_date() {
        assert_eq!(
            parse_due_date("2024-03-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert_eq!(
            parse_due_date(" 2024-03-01 ").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert!(parse_due_date("01.03.2024").is_err());
        assert!(parse_due_date("2024-02-30").is_err());
        assert!(parse_due_date("tomorrow").is_err());
    }

    #[test]
    fn test_status_and_priority_labels() {
        assert_eq!(GoalStatus::InProgress.label_key(), "status-in-progress");
        assert_eq!(GoalStatus::ToDo.label_key(), "status-to-do");
        assert_eq!(Priority::Critical.label_key(), "priority-critical");
        assert_eq!(GoalStatus::from_code(4), Some(GoalStatus::Archived));
        assert_eq!(Priority::from_code(9), None);
    }

    #[test]
    fn test_create_goal_with_defaults() {
        let f = fixture();
        let new_goal = NewGoal::builder()
            .owner(f.owner)
            .category_id(f.category_id)
            .title("Write report")
            .description("Finish draft")
            .due_date("2024-03-01")
            .build();

        let goal = create_goal(&f.conn, &new_goal).unwrap();
        assert_eq!(goal.title, "Write report");
        assert_eq!(goal.description.as_deref(), Some("Finish draft"));
        assert_eq!(goal.due_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(goal.status, GoalStatus::ToDo);
        assert_eq!(goal.priority, Priority::Medium);

        let listed = list_user_goals(&f.conn, f.owner).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].goal, goal);
        assert_eq!(listed[0].category_title, "Work");
        assert_eq!(listed[0].owner_username, "alice");
    }

    #[test]
    fn test_create_goal_trims_text_fields() {
        let f = fixture();
        let new_goal = NewGoal::builder()
            .owner(f.owner)
            .category_id(f.category_id)
            .title("  Write report \n")
            .description("   ")
            .build();

        let goal = create_goal(&f.conn, &new_goal).unwrap();
        assert_eq!(goal.title, "Write report");
        assert_eq!(goal.description, None);
        assert_eq!(list_user_goals(&f.conn, f.owner).unwrap()[0].goal, goal);
    }

    #[test]
    fn test_create_goal_rejects_bad_date_without_writing() {
        let f = fixture();
        let new_goal = NewGoal::builder()
            .owner(f.owner)
            .category_id(f.category_id)
            .title("Write report")
            .due_date("next week")
            .build();

        assert!(matches!(create_goal(&f.conn, &new_goal), Err(AppError::Validation(_))));
        assert!(list_user_goals(&f.conn, f.owner).unwrap().is_empty());
    }

    #[test]
    fn test_create_goal_in_foreign_category() {
        let f = fixture();
        let mallory = create_user(&f.conn, "mallory", None, None, None).unwrap();
        let new_goal = NewGoal::builder()
            .owner(mallory.id)
            .category_id(f.category_id)
            .title("Sneaky")
            .build();

        assert!(matches!(create_goal(&f.conn, &new_goal), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_archive_goal() {
        let f = fixture();
        let goal = create_goal(
            &f.conn,
            &NewGoal::builder()
                .owner(f.owner)
                .category_id(f.category_id)
                .title("Old")
                .build(),
        )
        .unwrap();

        assert!(update_goal_status(&f.conn, goal.id, f.owner, GoalStatus::InProgress).unwrap());
        assert!(archive_goal(&f.conn, goal.id, f.owner).unwrap());
        assert!(!archive_goal(&f.conn, goal.id, f.owner + 100).unwrap());

        let stored = get_user_goal(&f.conn, goal.id, f.owner).unwrap().unwrap();
        assert_eq!(stored.status, GoalStatus::Archived);
    }
}
