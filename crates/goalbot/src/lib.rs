//! goalbot - Telegram front end of goaltrack
//!
//! - `cli`: command line arguments
//! - `admin`: operator subcommands
//! - `metrics_server`: /metrics and /health
//! - `telegram`: bot creation, handler tree and the Bot API transport

pub mod admin;
pub mod cli;
pub mod metrics_server;
pub mod telegram;
