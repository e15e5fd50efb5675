//! Operator subcommands: users, boards, categories, goals, account linking and comments

use anyhow::{anyhow, Result};
use goalcore::storage::{boards, categories, comments, goals, users, DbConnection, GoalStatus, User};
use itertools::Itertools;

use crate::cli::{BoardAction, CategoryAction, Commands, CommentAction, GoalAction, UserAction};

fn user_by_name(conn: &DbConnection, username: &str) -> Result<User> {
    users::get_user_by_username(conn, username)?.ok_or_else(|| anyhow!("No user named '{}'", username))
}

fn set_goal_status(conn: &DbConnection, goal_id: i64, user: &User, status: GoalStatus) -> Result<String> {
    if !goals::update_goal_status(conn, goal_id, user.id, status)? {
        return Err(anyhow!("{} has no goal {}", user.username, goal_id));
    }
    Ok(format!("Goal {} is now {:?}", goal_id, status))
}

/// Runs one operator command and returns the text to print.
///
/// `Run` and `Migrate` are handled by the caller.
pub fn execute(conn: &DbConnection, command: Commands) -> Result<String> {
    match command {
        Commands::User {
            action:
                UserAction::Add {
                    username,
                    first_name,
                    last_name,
                    email,
                },
        } => {
            let user = users::create_user(
                conn,
                &username,
                first_name.as_deref(),
                last_name.as_deref(),
                email.as_deref(),
            )?;
            log::info!("Created user {} ({})", user.id, user.username);
            Ok(format!("Created user {} with id {}", user.username, user.id))
        }
        Commands::Board {
            action: BoardAction::Add { title, owner },
        } => {
            let owner = user_by_name(conn, &owner)?;
            let board = boards::create_board(conn, &title, owner.id)?;
            Ok(format!("Created board '{}' with id {}", board.title, board.id))
        }
        Commands::Board {
            action: BoardAction::Share {
                board_id,
                username,
                role,
            },
        } => {
            let user = user_by_name(conn, &username)?;
            boards::add_participant(conn, board_id, user.id, role.into())?;
            Ok(format!("{} is now {:?} of board {}", user.username, role, board_id))
        }
        Commands::Board {
            action: BoardAction::Delete { board_id, owner },
        } => {
            let owner = user_by_name(conn, &owner)?;
            if !boards::soft_delete_board(conn, board_id, owner.id)? {
                return Err(anyhow!("Board {} does not exist or is not owned by {}", board_id, owner.username));
            }
            log::info!("Deleted board {} on behalf of {}", board_id, owner.username);
            Ok(format!("Deleted board {}", board_id))
        }
        Commands::Category {
            action: CategoryAction::Add {
                board_id,
                title,
                author,
            },
        } => {
            let author = user_by_name(conn, &author)?;
            let category = categories::create_category(conn, board_id, author.id, &title)?;
            Ok(format!("Created category '{}' with id {}", category.title, category.id))
        }
        Commands::Category {
            action: CategoryAction::Delete { category_id, author },
        } => {
            let author = user_by_name(conn, &author)?;
            if !categories::soft_delete_category(conn, category_id, author.id)? {
                return Err(anyhow!(
                    "Category {} does not exist or was not created by {}",
                    category_id,
                    author.username
                ));
            }
            Ok(format!("Deleted category {} and archived its goals", category_id))
        }
        Commands::Goal {
            action: GoalAction::Status {
                goal_id,
                username,
                status,
            },
        } => {
            let user = user_by_name(conn, &username)?;
            set_goal_status(conn, goal_id, &user, status.into())
        }
        Commands::Goal {
            action: GoalAction::Archive { goal_id, username },
        } => {
            let user = user_by_name(conn, &username)?;
            if !goals::archive_goal(conn, goal_id, user.id)? {
                return Err(anyhow!("{} has no goal {}", user.username, goal_id));
            }
            Ok(format!("Archived goal {}", goal_id))
        }
        Commands::Link { code, username } => {
            let user = user_by_name(conn, &username)?;
            let account = users::link_account(conn, &code, user.id)?;
            Ok(format!(
                "Linked Telegram account {} to {}",
                account.tg_user_id, user.username
            ))
        }
        Commands::Comment {
            action: CommentAction::Add {
                goal_id,
                username,
                text,
            },
        } => {
            let user = user_by_name(conn, &username)?;
            let comment = comments::add_comment(conn, goal_id, user.id, &text)?;
            Ok(format!("Added comment {} to goal {}", comment.id, goal_id))
        }
        Commands::Comment {
            action: CommentAction::List { goal_id },
        } => {
            let list = comments::list_goal_comments(conn, goal_id)?;
            if list.is_empty() {
                return Ok(format!("Goal {} has no comments", goal_id));
            }
            Ok(list
                .into_iter()
                .map(|c| format!("[{}] user {}: {}", c.created, c.user_id, c.text))
                .join("\n"))
        }
        Commands::Run | Commands::Migrate => Err(anyhow!("not an operator command")),
    }
}
