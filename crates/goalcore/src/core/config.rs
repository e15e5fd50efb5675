//! Configuration read from the environment once, at first use.
//!
//! Callers are expected to load `.env` (via `dotenvy`) before touching any of these.

use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: goaltrack.sqlite
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "goaltrack.sqlite".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: goaltrack.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "goaltrack.log".to_string()));

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Custom Bot API server URL (local telegram-bot-api instance)
/// Read from BOT_API_URL environment variable
pub static BOT_API_URL: Lazy<Option<String>> = Lazy::new(|| env::var("BOT_API_URL").ok().filter(|s| !s.is_empty()));

/// Site where users link their Telegram account with the verification code
/// Read from SITE_URL environment variable
pub static SITE_URL: Lazy<String> =
    Lazy::new(|| env::var("SITE_URL").unwrap_or_else(|_| "http://localhost:8000/".to_string()));

/// Port for the /metrics and /health endpoints; 0 disables the server
/// Read from METRICS_PORT environment variable
/// Default: 9090
pub static METRICS_PORT: Lazy<u16> = Lazy::new(|| {
    env::var("METRICS_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(9090)
});

/// Language used when the Telegram client does not report a supported one
/// Read from DEFAULT_LANG environment variable
/// Default: en
pub static DEFAULT_LANG: Lazy<String> = Lazy::new(|| env::var("DEFAULT_LANG").unwrap_or_else(|_| "en".to_string()));

/// Goal-creation session configuration
pub mod session {
    use super::*;

    /// Idle timeout for an unfinished goal-creation session, in seconds.
    /// 0 keeps sessions until they are finished or cancelled.
    /// Read from SESSION_IDLE_TIMEOUT_SECS environment variable
    pub static IDLE_TIMEOUT_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("SESSION_IDLE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    });

    /// Idle timeout as a `Duration`, `None` when disabled
    pub fn idle_timeout() -> Option<Duration> {
        match *IDLE_TIMEOUT_SECS {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

/// Account verification configuration
pub mod verification {
    /// Length of the one-time code shown to unlinked Telegram users
    pub const CODE_LENGTH: usize = 8;
}

/// Retry configuration
pub mod retry {
    use super::Duration;

    /// Maximum number of restarts of the update dispatcher
    pub const MAX_DISPATCHER_RETRIES: u32 = 5;

    /// Delay between dispatcher restarts (in seconds)
    pub const DISPATCHER_RETRY_DELAY_SECS: u64 = 5;

    /// Dispatcher retry delay duration
    pub fn dispatcher_delay() -> Duration {
        Duration::from_secs(DISPATCHER_RETRY_DELAY_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API calls (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_matches_constant() {
        assert_eq!(retry::dispatcher_delay(), Duration::from_secs(retry::DISPATCHER_RETRY_DELAY_SECS));
    }

    #[test]
    fn test_network_timeout_matches_constant() {
        assert_eq!(network::timeout().as_secs(), network::REQUEST_TIMEOUT_SECS);
    }
}
