//! Preprocessing many sessions in parallel.
//!
//! Sessions share no state, so each worker takes a session directory from
//! a channel and runs the whole pipeline on it. A failed session is logged
//! and counted; the others still run.

use crate::config::Config;
use crate::core::schedule::SCHEDULE_FILE;
use crate::error::{PipelineError, Result};
use crate::pipeline::preprocess_session;
use crate::report::SharedRunLog;
use crossbeam_channel::{bounded, unbounded};
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{info, warn};

/// File name of each session's cleaned table.
pub const OUTPUT_FILE: &str = "preprocessing.csv";

/// File name of each session's JSON report.
pub const REPORT_FILE: &str = "report.json";

/// Outcome of one session of a batch.
#[derive(Debug)]
pub struct SessionResult {
    pub session: PathBuf,
    /// Path of the written table, or the error that stopped the session
    pub outcome: Result<PathBuf>,
}

impl SessionResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Subdirectories of `root` holding an event log, sorted by path.
pub fn discover_sessions(root: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(root).map_err(|e| PipelineError::io(root, e))?;

    let mut sessions = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| PipelineError::io(root, e))?.path();
        if path.is_dir() && path.join(SCHEDULE_FILE).is_file() {
            sessions.push(path);
        }
    }
    sessions.sort();
    Ok(sessions)
}

/// Where a session's outputs go inside `out_dir`.
pub fn session_output_dir(out_dir: &Path, session: &Path) -> PathBuf {
    match session.file_name() {
        Some(name) => out_dir.join(name),
        None => out_dir.to_path_buf(),
    }
}

/// Preprocess every session under `root`, writing into `out_dir`.
///
/// Results come back in session order.
pub fn run_batch(
    root: &Path,
    out_dir: &Path,
    config: &Config,
    log: &SharedRunLog,
) -> Result<Vec<SessionResult>> {
    let sessions = discover_sessions(root)?;
    if sessions.is_empty() {
        warn!(root = %root.display(), "No session directories found");
        return Ok(Vec::new());
    }

    let workers = config.jobs.clamp(1, sessions.len());
    info!(sessions = sessions.len(), workers, "Starting batch");

    let (job_tx, job_rx) = bounded::<PathBuf>(sessions.len());
    let (result_tx, result_rx) = unbounded::<SessionResult>();
    for session in &sessions {
        job_tx
            .send(session.clone())
            .map_err(|e| PipelineError::Invariant(format!("job queue closed: {e}")))?;
    }
    drop(job_tx);

    thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for session in job_rx {
                    let outcome = process_one(&session, out_dir, config, log);
                    if result_tx.send(SessionResult { session, outcome }).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(result_tx);

    let mut results: Vec<SessionResult> = result_rx.into_iter().collect();
    results.sort_by(|a, b| a.session.cmp(&b.session));
    Ok(results)
}

fn process_one(
    session: &Path,
    out_dir: &Path,
    config: &Config,
    log: &SharedRunLog,
) -> Result<PathBuf> {
    let target = session_output_dir(out_dir, session);
    let result = preprocess_session(session, config).and_then(|output| {
        let csv_path = target.join(OUTPUT_FILE);
        output.table.write_csv(&csv_path)?;
        output.report.save(&target.join(REPORT_FILE))?;
        Ok((csv_path, output.table.len()))
    });

    match result {
        Ok((csv_path, rows)) => {
            log.record_session(rows as u64);
            info!(session = %session.display(), rows, "Wrote {}", csv_path.display());
            Ok(csv_path)
        }
        Err(e) => {
            log.record_failure();
            warn!(session = %session.display(), error = %e, "Session failed");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::create_shared_log;

    #[test]
    fn test_discover_sessions() {
        let root = tempfile::tempdir().unwrap();
        for name in ["b_session", "a_session"] {
            let meta = root.path().join(name).join("meta");
            std::fs::create_dir_all(&meta).unwrap();
            std::fs::write(meta.join("time.csv"), "").unwrap();
        }
        std::fs::create_dir_all(root.path().join("not_a_session")).unwrap();
        std::fs::write(root.path().join("notes.txt"), "x").unwrap();

        let sessions = discover_sessions(root.path()).unwrap();
        let names: Vec<_> = sessions
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a_session", "b_session"]);
    }

    #[test]
    fn test_failed_sessions_are_counted() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let meta = root.path().join("broken").join("meta");
        std::fs::create_dir_all(&meta).unwrap();
        std::fs::write(meta.join("time.csv"), "event,experiment time,system time text\n").unwrap();

        let log = create_shared_log();
        let results = run_batch(root.path(), out.path(), &Config::default(), &log).unwrap();
        assert_eq!(results.len(), 1);
        assert!(!results[0].is_ok());
        assert_eq!(log.stats().sessions_failed, 1);
        assert_eq!(log.stats().sessions_processed, 0);
    }

    #[test]
    fn test_output_dir_per_session() {
        assert_eq!(
            session_output_dir(Path::new("out"), Path::new("data/s1")),
            PathBuf::from("out/s1")
        );
    }
}
