//! Thread-safe counters for a pipeline run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters shared by every worker of a run.
#[derive(Debug)]
pub struct RunLog {
    /// Sessions written successfully
    sessions_processed: AtomicU64,
    /// Sessions that failed with an error
    sessions_failed: AtomicU64,
    /// Output rows written across all sessions
    rows_written: AtomicU64,
    run_start: DateTime<Utc>,
}

impl RunLog {
    pub fn new() -> Self {
        Self {
            sessions_processed: AtomicU64::new(0),
            sessions_failed: AtomicU64::new(0),
            rows_written: AtomicU64::new(0),
            run_start: Utc::now(),
        }
    }

    /// Record a session written with `rows` output rows.
    pub fn record_session(&self, rows: u64) {
        self.sessions_processed.fetch_add(1, Ordering::Relaxed);
        self.rows_written.fetch_add(rows, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.sessions_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> RunStats {
        RunStats {
            sessions_processed: self.sessions_processed.load(Ordering::Relaxed),
            sessions_failed: self.sessions_failed.load(Ordering::Relaxed),
            rows_written: self.rows_written.load(Ordering::Relaxed),
            run_start: self.run_start,
            run_duration_secs: (Utc::now() - self.run_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Run Summary:\n\
             - Sessions processed: {}\n\
             - Sessions failed: {}\n\
             - Rows written: {}\n\
             - Duration: {} seconds",
            stats.sessions_processed,
            stats.sessions_failed,
            stats.rows_written,
            stats.run_duration_secs
        )
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of run statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    pub sessions_processed: u64,
    pub sessions_failed: u64,
    pub rows_written: u64,
    pub run_start: DateTime<Utc>,
    pub run_duration_secs: u64,
}

/// Thread-safe shared run log.
pub type SharedRunLog = Arc<RunLog>;

pub fn create_shared_log() -> SharedRunLog {
    Arc::new(RunLog::new())
}
