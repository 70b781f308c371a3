//! Run reporting.
//!
//! Each processed session produces a [`SessionReport`] describing what
//! happened to its rows. A [`RunLog`] counts sessions and rows across a
//! whole (possibly multi-threaded) run.

pub mod log;
pub mod session;

pub use log::{create_shared_log, RunLog, RunStats, SharedRunLog};
pub use session::SessionReport;
