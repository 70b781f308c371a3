//! Per-session JSON report.

use crate::core::clean::CleanStats;
use crate::core::timeline::Frequency;
use crate::error::{PipelineError, Result};
use crate::sensors::loader::SensorStats;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// What one preprocessing run did to a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub session: PathBuf,
    pub frequency: Frequency,
    /// Recording intervals resolved from the event log
    pub intervals: usize,
    pub timeline_len: usize,
    pub sensors: Vec<SensorStats>,
    pub cleaning: CleanStats,
    /// Rows in the final table
    pub rows: usize,
}

impl SessionReport {
    pub fn new(session: &Path, frequency: Frequency) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            session: session.to_path_buf(),
            frequency,
            intervals: 0,
            timeline_len: 0,
            sensors: Vec::new(),
            cleaning: CleanStats::default(),
            rows: 0,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PipelineError::Invariant(format!("report serialization failed: {e}")))
    }

    /// Write the report as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| PipelineError::io(path, e))
    }
}
