#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Per-user conversation state and the relay between chat users and a
//! completion backend.
//!
//! # Key Features
//! - Lazily created, in-memory history per user id
//! - Per-user locking around each exchange, users run in parallel
//! - Oversized replies split into ordered chunks
//! - Completion failures reported to the user, never propagated

mod handler;
mod history;
mod session;
mod sink;

pub use handler::{
    ConversationHandler, EMPTY_REPLY_MESSAGE, ERROR_PREFIX, HELP_TEXT, HandleOutcome,
    RESET_MESSAGE, welcome_text,
};
pub use history::{HistoryStore, SharedHistory};
pub use session::ConversationHistory;
pub use sink::ReplySink;
