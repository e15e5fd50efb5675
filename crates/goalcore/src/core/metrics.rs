//! Prometheus metrics for the bot
//!
//! Tracks command usage, goal creation, recoverable input errors and the
//! number of open goal-creation sessions. Exposed over HTTP by the bot binary.

use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, register_int_gauge, IntCounter, IntCounterVec, IntGauge};

/// Handled messages by command
/// Labels: command (start/help/cancel/board/category/goals/create/text)
pub static COMMANDS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "goaltrack_commands_total",
        "Total number of handled messages by command",
        &["command"]
    )
    .unwrap()
});

/// Goals persisted through the conversation flow
pub static GOALS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("goaltrack_goals_created_total", "Total number of goals created from Telegram").unwrap()
});

/// Recoverable input errors that led to a re-prompt
/// Labels: kind (invalid_category/invalid_due_date/out_of_order)
pub static FLOW_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "goaltrack_flow_errors_total",
        "Total number of rejected inputs during goal creation",
        &["kind"]
    )
    .unwrap()
});

/// Failures that produced a generic error reply
/// Labels: kind (see `AppError::kind`)
pub static FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "goaltrack_failures_total",
        "Total number of requests that failed with a store or transport error",
        &["kind"]
    )
    .unwrap()
});

/// Goal-creation sessions currently open
pub static ACTIVE_SESSIONS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("goaltrack_active_sessions", "Number of unfinished goal-creation sessions").unwrap()
});

/// Touch every metric so they show up in /metrics before the first event.
pub fn init_metrics() {
    Lazy::force(&COMMANDS_TOTAL);
    Lazy::force(&GOALS_CREATED_TOTAL);
    Lazy::force(&FLOW_ERRORS_TOTAL);
    Lazy::force(&FAILURES_TOTAL);
    Lazy::force(&ACTIVE_SESSIONS);
    log::info!("Metrics registry initialized");
}

/// Records one handled message for `command`.
pub fn record_command(command: &str) {
    COMMANDS_TOTAL.with_label_values(&[command]).inc();
}

/// Records a rejected input of the given kind.
pub fn record_flow_error(kind: &str) {
    FLOW_ERRORS_TOTAL.with_label_values(&[kind]).inc();
}

/// Records a failed request.
pub fn record_failure(kind: &str) {
    FAILURES_TOTAL.with_label_values(&[kind]).inc();
}
