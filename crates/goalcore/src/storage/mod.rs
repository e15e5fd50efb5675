//! SQLite storage for users, boards, categories, goals and comments

pub mod boards;
pub mod categories;
pub mod comments;
pub mod db;
pub mod goals;
pub mod migrations;
pub mod store;
pub mod users;

// Re-exports for convenience
pub use boards::{Board, BoardMembership, Role};
pub use categories::GoalCategory;
pub use comments::GoalComment;
pub use db::{create_pool, get_connection, DbConnection, DbPool};
pub use goals::{Goal, GoalStatus, GoalView, NewGoal, Priority};
pub use store::{GoalStore, SqliteStore};
pub use users::{TgAccount, User};
