//! goalcore - goal tracker core without any Telegram dependency
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging and metrics
//! - `storage`: SQLite store for users, boards, categories, goals and comments
//! - `conversation`: per-sender goal-creation sessions and the state machine
//! - `router`: command parsing and routing of inbound messages
//! - `transport`: the messenger boundary
//! - `i18n`: localized reply texts

pub mod conversation;
pub mod core;
pub mod i18n;
pub mod router;
pub mod storage;
pub mod testing;
pub mod transport;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult};
pub use conversation::{SessionRegistry, Stage};
pub use router::{Command, CommandRouter};
pub use storage::{create_pool, get_connection, DbConnection, DbPool, GoalStore, SqliteStore};
pub use transport::{Inbound, Reply, Transport};
