use clap::{Parser, Subcommand, ValueEnum};
use goalcore::storage::{GoalStatus, Role};

#[derive(Parser)]
#[command(name = "goalbot")]
#[command(author, version, about = "Telegram bot for creating and listing goals", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (long polling)
    Run,

    /// Create or upgrade the database schema and exit
    Migrate,

    /// Manage site users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage boards
    Board {
        #[command(subcommand)]
        action: BoardAction,
    },

    /// Manage goal categories
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Link a Telegram account to a user with the code the bot showed
    Link {
        /// Verification code
        code: String,

        /// Username of the site user
        username: String,
    },

    /// Change the status of goals
    Goal {
        #[command(subcommand)]
        action: GoalAction,
    },

    /// Goal comments
    Comment {
        #[command(subcommand)]
        action: CommentAction,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum UserAction {
    /// Create a user
    Add {
        username: String,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum BoardAction {
    /// Create a board owned by a user
    Add {
        title: String,

        /// Username of the owner
        #[arg(long)]
        owner: String,
    },

    /// Add a participant to a board or change their role
    Share {
        board_id: i64,

        username: String,

        #[arg(long, value_enum, default_value_t = RoleArg::Writer)]
        role: RoleArg,
    },

    /// Delete a board; only its owner may do this
    Delete {
        board_id: i64,

        #[arg(long)]
        owner: String,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum CategoryAction {
    /// Create a category on a board
    Add {
        board_id: i64,

        title: String,

        /// Username of the author; must be owner or writer of the board
        #[arg(long)]
        author: String,
    },

    /// Delete a category and archive its goals
    Delete {
        category_id: i64,

        #[arg(long)]
        author: String,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum GoalAction {
    /// Move a goal to another status
    Status {
        goal_id: i64,

        /// Username of the goal owner
        username: String,

        #[arg(value_enum)]
        status: StatusArg,
    },

    /// Archive a goal. The goal and its comments are kept
    Archive {
        goal_id: i64,

        /// Username of the goal owner
        username: String,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum CommentAction {
    /// Comment on a goal
    Add {
        goal_id: i64,

        /// Username of the goal owner
        username: String,

        text: String,
    },

    /// Show the comments of a goal, newest first
    List { goal_id: i64 },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoleArg {
    Owner,
    Writer,
    Reader,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Owner => Role::Owner,
            RoleArg::Writer => Role::Writer,
            RoleArg::Reader => Role::Reader,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusArg {
    ToDo,
    InProgress,
    Done,
}

impl From<StatusArg> for GoalStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::ToDo => GoalStatus::ToDo,
            StatusArg::InProgress => GoalStatus::InProgress,
            StatusArg::Done => GoalStatus::Done,
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
