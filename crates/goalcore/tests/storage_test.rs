//! Integration tests for the SQLite store
//!
//! Run with: cargo test -p goalcore --test storage_test

use goalcore::storage::{boards, categories, comments, create_pool, get_connection, goals, users, GoalStatus, NewGoal, Role};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn test_reopening_database_keeps_data() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("goals.sqlite");
    let path = path.to_str().unwrap();

    {
        let pool = create_pool(path).unwrap();
        let conn = get_connection(&pool).unwrap();
        users::create_user(&conn, "alice", None, None, Some("alice@example.com")).unwrap();
    }

    // Migrations are already applied the second time
    let pool = create_pool(path).unwrap();
    let conn = get_connection(&pool).unwrap();
    let alice = users::get_user_by_username(&conn, "alice").unwrap().unwrap();
    assert_eq!(alice.email.as_deref(), Some("alice@example.com"));
}

#[test]
fn test_board_lifecycle() {
    let dir = TempDir::new().unwrap();
    let pool = create_pool(dir.path().join("goals.sqlite").to_str().unwrap()).unwrap();
    let conn = get_connection(&pool).unwrap();

    let alice = users::create_user(&conn, "alice", None, None, None).unwrap();
    let bob = users::create_user(&conn, "bob", None, None, None).unwrap();
    let board = boards::create_board(&conn, "Family", alice.id).unwrap();
    boards::add_participant(&conn, board.id, bob.id, Role::Writer).unwrap();

    let groceries = categories::create_category(&conn, board.id, bob.id, "Groceries").unwrap();
    let goal = goals::create_goal(
        &conn,
        &NewGoal::builder()
            .owner(bob.id)
            .category_id(groceries.id)
            .title("Buy milk")
            .build(),
    )
    .unwrap();
    comments::add_comment(&conn, goal.id, bob.id, "2 liters").unwrap();

    assert_eq!(categories::list_participant_categories(&conn, alice.id).unwrap(), vec![groceries.clone()]);
    assert!(categories::list_user_categories(&conn, alice.id).unwrap().is_empty());

    assert!(categories::soft_delete_category(&conn, groceries.id, bob.id).unwrap());
    let archived = goals::get_user_goal(&conn, goal.id, bob.id).unwrap().unwrap();
    assert_eq!(archived.status, GoalStatus::Archived);
    assert_eq!(comments::list_goal_comments(&conn, goal.id).unwrap().len(), 1);

    assert!(boards::soft_delete_board(&conn, board.id, alice.id).unwrap());
    assert!(boards::list_user_boards(&conn, bob.id).unwrap().is_empty());
}

#[test]
fn test_foreign_keys_are_enforced() {
    let dir = TempDir::new().unwrap();
    let pool = create_pool(dir.path().join("goals.sqlite").to_str().unwrap()).unwrap();
    let conn = get_connection(&pool).unwrap();

    let result = conn.execute(
        "INSERT INTO goal_categories (board_id, title, user_id, is_deleted, created, updated) VALUES (99, 'x', 99, 0, '', '')",
        [],
    );
    assert!(result.is_err());
}
