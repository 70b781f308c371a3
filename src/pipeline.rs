//! Preprocessing of one session directory.
//!
//! Schedule → mapper → timeline → every sensor → merge → clean.

use crate::config::Config;
use crate::core::clean::clean_with_stats;
use crate::core::columns::target_column;
use crate::core::mapper::TimeMapper;
use crate::core::merge::merge;
use crate::core::schedule::Schedule;
use crate::core::table::AlignedTable;
use crate::core::timeline::{Frequency, Timeline};
use crate::error::{PipelineError, Result};
use crate::report::SessionReport;
use crate::sensors::kind::SensorKind;
use crate::sensors::loader::load_sensor;
use crate::sensors::source::SensorSource;
use std::path::Path;
use tracing::info;

/// The cleaned table of a session and the report describing it.
#[derive(Debug, Clone)]
pub struct SessionOutput {
    pub table: AlignedTable,
    pub report: SessionReport,
}

/// Build the session timeline from the schedule's wall-clock span.
pub fn build_timeline(schedule: &Schedule, frequency: Frequency, close_final_bucket: bool) -> Timeline {
    let timeline = Timeline::date_range(schedule.start(), schedule.end(), frequency);
    if close_final_bucket {
        timeline.with_trailing_point()
    } else {
        timeline
    }
}

/// Load every sensor of a session onto one timeline and merge them.
///
/// Returns the uncleaned aligned table; `report` receives the schedule and
/// per-sensor statistics.
pub fn align_session(
    session_dir: &Path,
    sensors: &[&dyn SensorSource],
    config: &Config,
    report: &mut SessionReport,
) -> Result<AlignedTable> {
    let schedule = Schedule::load(session_dir)?;
    let timeline = build_timeline(&schedule, config.frequency, config.close_final_bucket);
    report.intervals = schedule.intervals().len();
    report.timeline_len = timeline.len();

    let mapper = TimeMapper::new(schedule);
    let mut tables = Vec::with_capacity(sensors.len());
    for sensor in sensors {
        let load = load_sensor(*sensor, session_dir, &mapper, &timeline)?;
        report.sensors.push(load.stats);
        tables.push(load.table);
    }

    merge(&timeline, tables)
}

/// Run the full preprocessing of a session directory.
pub fn preprocess_session(session_dir: &Path, config: &Config) -> Result<SessionOutput> {
    let mut report = SessionReport::new(session_dir, config.frequency);
    let sensors: Vec<&dyn SensorSource> = SensorKind::ALL
        .iter()
        .map(|kind| kind as &dyn SensorSource)
        .collect();

    let merged = align_session(session_dir, &sensors, config, &mut report)?;
    let (table, cleaning) = clean_with_stats(&merged)?;
    let table = target_last(table)?;
    report.cleaning = cleaning;
    report.rows = table.len();

    info!(
        session = %session_dir.display(),
        intervals = report.intervals,
        timeline = report.timeline_len,
        rows = report.rows,
        "Preprocessed session"
    );
    Ok(SessionOutput { table, report })
}

/// Move the target column to the end of the table.
pub fn target_last(table: AlignedTable) -> Result<AlignedTable> {
    let (mut table, target) = table.take_column(target_column());
    let target = target.ok_or_else(|| PipelineError::schema(target_column(), "aligned table"))?;
    table.push_column(target)?;
    Ok(table)
}
