//! Per-sender goal-creation conversations

pub mod flow;
pub mod registry;
pub mod session;

pub use flow::{FlowError, GoalFlow, Step};
pub use registry::SessionRegistry;
pub use session::{GoalDraft, Session, SessionError, Stage};
