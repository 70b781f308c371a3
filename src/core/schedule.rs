//! Recording schedule resolution.
//!
//! A session's `meta/time.csv` logs every start and pause of the recorder
//! with both the experiment clock (seconds since the first start, frozen
//! while paused) and the system wall clock. Consecutive start/pause rows are
//! folded into [`Interval`]s that anchor one clock to the other.

use crate::core::clock::{offset_from_secs, parse_wall_clock};
use crate::error::{PipelineError, Result};
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Location of the event log inside a session directory.
pub const SCHEDULE_FILE: &str = "meta/time.csv";

const EVENT_COLUMN: &str = "event";
const OFFSET_COLUMN: &str = "experiment time";
const WALL_CLOCK_COLUMN: &str = "system time text";

/// One clock reading taken on both clocks at the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeAnchor {
    /// Experiment-relative offset
    #[serde(serialize_with = "serialize_offset")]
    pub offset: Duration,
    /// Wall-clock time (timezone-naive)
    pub wall_clock: NaiveDateTime,
}

/// A contiguous span of valid recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub start: TimeAnchor,
    pub end: TimeAnchor,
}

impl Interval {
    /// Whether an experiment offset was recorded inside this interval.
    ///
    /// The start is inclusive and the end exclusive.
    pub fn contains_offset(&self, offset: Duration) -> bool {
        offset >= self.start.offset && offset < self.end.offset
    }

    /// Wall-clock time for an offset of this interval.
    pub fn wall_clock_at(&self, offset: Duration) -> NaiveDateTime {
        self.start.wall_clock + (offset - self.start.offset)
    }
}

/// A raw row of the event log.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRecord {
    /// Event label ("START", "PAUSE"), when the log carries one
    pub event: Option<String>,
    /// Experiment time in seconds
    pub offset_secs: f64,
    /// System time text as written by the recorder
    pub wall_clock: String,
}

impl ScheduleRecord {
    pub fn new(event: &str, offset_secs: f64, wall_clock: &str) -> Self {
        Self {
            event: Some(event.to_string()),
            offset_secs,
            wall_clock: wall_clock.to_string(),
        }
    }
}

/// The resolved recording intervals of one session.
///
/// Immutable once built: intervals are disjoint and sorted by wall-clock
/// start.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    intervals: Vec<Interval>,
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl Schedule {
    /// Read and resolve `meta/time.csv` of a session directory.
    pub fn load(session_dir: &Path) -> Result<Self> {
        Self::from_path(&session_dir.join(SCHEDULE_FILE))
    }

    /// Read and resolve an event log file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let records = read_records(path)?;
        Self::from_records(&records, path)
    }

    /// Resolve already-parsed event log rows.
    ///
    /// `source` only labels errors.
    pub fn from_records(records: &[ScheduleRecord], source: &Path) -> Result<Self> {
        let malformed = |reason: String| PipelineError::MalformedSchedule {
            path: source.to_path_buf(),
            reason,
        };

        if records.is_empty() {
            return Err(PipelineError::EmptySchedule {
                path: source.to_path_buf(),
            });
        }
        if records.len() % 2 != 0 {
            return Err(malformed(format!(
                "expected start/pause pairs but found {} rows",
                records.len()
            )));
        }

        let mut intervals = Vec::with_capacity(records.len() / 2);
        for (pair_index, pair) in records.chunks_exact(2).enumerate() {
            let (start, pause) = (&pair[0], &pair[1]);
            check_label(start, &["start"], 2 * pair_index).map_err(&malformed)?;
            check_label(pause, &["pause", "stop"], 2 * pair_index + 1).map_err(&malformed)?;

            let start = anchor(start, source, 2 * pair_index)?;
            let end = anchor(pause, source, 2 * pair_index + 1)?;
            if start.offset >= end.offset {
                return Err(malformed(format!(
                    "interval {pair_index} does not advance the experiment clock"
                )));
            }
            if start.wall_clock >= end.wall_clock {
                return Err(malformed(format!(
                    "interval {pair_index} does not advance the wall clock"
                )));
            }
            intervals.push(Interval { start, end });
        }

        intervals.sort_by_key(|interval| interval.start.wall_clock);
        for pair in intervals.windows(2) {
            if pair[1].start.wall_clock < pair[0].end.wall_clock
                || pair[1].start.offset < pair[0].end.offset
            {
                return Err(malformed(format!(
                    "interval starting at {} overlaps the previous one",
                    pair[1].start.wall_clock
                )));
            }
        }

        let start = intervals
            .iter()
            .map(|interval| interval.start.wall_clock)
            .min()
            .ok_or_else(|| PipelineError::EmptySchedule {
                path: source.to_path_buf(),
            })?;
        let end = intervals
            .iter()
            .map(|interval| interval.end.wall_clock)
            .max()
            .unwrap_or(start);
        if end <= start {
            return Err(malformed(format!(
                "session ends at {end}, not after its start at {start}"
            )));
        }

        debug!(
            intervals = intervals.len(),
            %start,
            %end,
            "Resolved recording schedule"
        );

        Ok(Self {
            intervals,
            start,
            end,
        })
    }

    /// Recording intervals, sorted by wall-clock start.
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Earliest wall-clock start across intervals.
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Latest wall-clock end across intervals.
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Total recorded time, excluding pauses.
    pub fn recorded_duration(&self) -> Duration {
        self.intervals
            .iter()
            .fold(Duration::zero(), |acc, i| acc + (i.end.offset - i.start.offset))
    }
}

fn check_label(
    record: &ScheduleRecord,
    accepted: &[&str],
    row: usize,
) -> std::result::Result<(), String> {
    match &record.event {
        Some(label) if !label.trim().is_empty() => {
            let label = label.trim().to_lowercase();
            if accepted.contains(&label.as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "row {row} is '{label}' but a {} event was expected",
                    accepted.join("/")
                ))
            }
        }
        _ => Ok(()),
    }
}

fn anchor(record: &ScheduleRecord, source: &Path, row: usize) -> Result<TimeAnchor> {
    let invalid = |column: &str, value: String| PipelineError::InvalidValue {
        path: source.to_path_buf(),
        column: column.to_string(),
        record: row as u64 + 1,
        value,
    };

    let offset = offset_from_secs(record.offset_secs)
        .ok_or_else(|| invalid(OFFSET_COLUMN, record.offset_secs.to_string()))?;
    let wall_clock = parse_wall_clock(&record.wall_clock)
        .ok_or_else(|| invalid(WALL_CLOCK_COLUMN, record.wall_clock.clone()))?;

    Ok(TimeAnchor { offset, wall_clock })
}

fn read_records(path: &Path) -> Result<Vec<ScheduleRecord>> {
    if !path.exists() {
        return Err(PipelineError::io(
            PathBuf::from(path),
            std::io::Error::new(std::io::ErrorKind::NotFound, "event log not found"),
        ));
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| PipelineError::csv(path, e))?;

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::csv(path, e))?
        .clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == name)
    };
    let context = path.display().to_string();
    let offset_idx =
        position(OFFSET_COLUMN).ok_or_else(|| PipelineError::schema(OFFSET_COLUMN, &context))?;
    let wall_idx = position(WALL_CLOCK_COLUMN)
        .ok_or_else(|| PipelineError::schema(WALL_CLOCK_COLUMN, &context))?;
    let event_idx = position(EVENT_COLUMN);

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row.map_err(|e| PipelineError::csv(path, e))?;
        let raw_offset = row.get(offset_idx).unwrap_or_default();
        let offset_secs = raw_offset
            .parse::<f64>()
            .map_err(|_| PipelineError::InvalidValue {
                path: path.to_path_buf(),
                column: OFFSET_COLUMN.to_string(),
                record: i as u64 + 1,
                value: raw_offset.to_string(),
            })?;

        records.push(ScheduleRecord {
            event: event_idx.and_then(|idx| row.get(idx)).map(str::to_string),
            offset_secs,
            wall_clock: row.get(wall_idx).unwrap_or_default().to_string(),
        });
    }

    Ok(records)
}

fn serialize_offset<S: serde::Serializer>(
    offset: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let secs = offset.num_seconds() as f64 + f64::from(offset.subsec_nanos()) / 1e9;
    serializer.serialize_f64(secs)
}

#[cfg(test)]
pub(crate) fn two_interval_records() -> Vec<ScheduleRecord> {
    vec![
        ScheduleRecord::new("START", 0.0, "2024-01-01 00:00:00"),
        ScheduleRecord::new("PAUSE", 10.0, "2024-01-01 00:00:10"),
        ScheduleRecord::new("START", 20.0, "2024-01-01 00:01:00"),
        ScheduleRecord::new("PAUSE", 30.0, "2024-01-01 00:01:10"),
    ]
}
