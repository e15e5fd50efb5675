//! Common test utilities
//!
//! This module is shared across all integration tests

#![allow(dead_code)]

use std::sync::Arc;

use goalcore::conversation::SessionRegistry;
use goalcore::storage::{boards, categories, get_connection, users, GoalCategory, User};
use goalcore::testing::RecordingTransport;
use goalcore::{create_pool, CommandRouter, Inbound, SqliteStore};
use tempfile::TempDir;

pub const SITE_URL: &str = "http://goals.test/";

/// A store in a temporary database file plus a router and a recording transport.
pub struct TestEnvironment {
    _dir: TempDir,
    pub store: Arc<SqliteStore>,
    pub router: CommandRouter<SqliteStore>,
    pub transport: RecordingTransport,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self::with_sessions(SessionRegistry::new(None))
    }

    pub fn with_sessions(sessions: SessionRegistry) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("goals.sqlite");
        let pool = create_pool(path.to_str().unwrap()).unwrap();
        let store = Arc::new(SqliteStore::new(Arc::new(pool)));

        Self {
            _dir: dir,
            router: CommandRouter::new(Arc::clone(&store), sessions, SITE_URL),
            store,
            transport: RecordingTransport::new(),
        }
    }

    /// Creates a site user and links Telegram id `tg_user_id` to it.
    pub fn linked_user(&self, username: &str, tg_user_id: i64) -> User {
        let conn = get_connection(self.store.pool()).unwrap();
        let user = users::create_user(&conn, username, Some(username), None, None).unwrap();
        users::find_or_create_account(&conn, tg_user_id, tg_user_id, Some(username)).unwrap();
        let code = users::issue_verification_code(&conn, tg_user_id).unwrap();
        users::link_account(&conn, &code, user.id).unwrap();
        user
    }

    /// Creates a board owned by `user` with one category per title.
    pub fn categories(&self, user: &User, titles: &[&str]) -> Vec<GoalCategory> {
        let conn = get_connection(self.store.pool()).unwrap();
        let board = boards::create_board(&conn, &format!("{} board", user.username), user.id).unwrap();
        titles
            .iter()
            .map(|title| categories::create_category(&conn, board.id, user.id, title).unwrap())
            .collect()
    }

    /// Sends `text` as `tg_user_id` and returns the texts of the replies.
    pub async fn say(&self, tg_user_id: i64, text: &str) -> Vec<String> {
        let msg = message(tg_user_id, text);
        self.router.receive(&self.transport, &msg).await.unwrap();
        self.transport.take_texts()
    }

    pub fn goal_count(&self, user: &User) -> usize {
        let conn = get_connection(self.store.pool()).unwrap();
        goalcore::storage::goals::list_user_goals(&conn, user.id).unwrap().len()
    }
}

/// Private-chat message in English.
pub fn message(tg_user_id: i64, text: &str) -> Inbound {
    Inbound {
        language_code: Some("en".to_string()),
        first_name: Some("Tester".to_string()),
        ..Inbound::private(tg_user_id, text)
    }
}
