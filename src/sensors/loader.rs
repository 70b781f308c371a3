//! Loading one sensor file onto the session timeline.

use crate::core::aggregate::aggregate;
use crate::core::clock::parse_wall_clock;
use crate::core::interpolate::interpolate_time;
use crate::core::mapper::{MappedOffset, TimeMapper};
use crate::core::table::{parse_cell, AlignedTable, Column};
use crate::core::timeline::Timeline;
use crate::error::{PipelineError, Result};
use crate::sensors::source::{ClockSource, GapPolicy, SensorSource};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What happened to one sensor's rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SensorStats {
    pub sensor: String,
    /// Data rows in the source file
    pub rows_read: usize,
    /// Rows without a wall-clock time (recorded during a pause or blank)
    pub rows_unmapped: usize,
    /// Buckets where at least one field received a value
    pub buckets_filled: usize,
}

/// A sensor aggregated onto the timeline.
#[derive(Debug, Clone)]
pub struct SensorLoad {
    /// One row per timeline point, one column per declared field
    pub table: AlignedTable,
    pub stats: SensorStats,
}

/// Raw rows of a sensor file, restricted to the declared columns.
#[derive(Debug, Default)]
struct RawSamples {
    clock: Vec<String>,
    fields: Vec<Vec<Option<f64>>>,
}

/// Wall-clock-indexed samples, sorted by time.
#[derive(Debug, Default)]
struct ResolvedSamples {
    index: Vec<NaiveDateTime>,
    fields: Vec<Vec<Option<f64>>>,
}

/// Read a sensor's file from `session_dir` and aggregate every declared
/// field onto `timeline`.
pub fn load_sensor<S: SensorSource + ?Sized>(
    sensor: &S,
    session_dir: &Path,
    mapper: &TimeMapper,
    timeline: &Timeline,
) -> Result<SensorLoad> {
    let path = session_dir.join(sensor.file_name());
    if !path.is_file() {
        return Err(PipelineError::MissingSourceFile {
            sensor: sensor.name().to_string(),
            path,
        });
    }

    let raw = read_raw(sensor, &path)?;
    let rows_read = raw.clock.len();
    let resolved = resolve(sensor, raw, mapper, &path)?;
    let rows_unmapped = rows_read.saturating_sub(resolved.index.len());
    if rows_read > 0 && resolved.index.is_empty() {
        warn!(sensor = sensor.name(), "No samples fall inside the recording intervals");
    }

    let mut table = AlignedTable::new(timeline.points().to_vec());
    for (field, values) in sensor.fields().iter().zip(&resolved.fields) {
        let values = match sensor.gap_policy() {
            GapPolicy::InterpolateTime => interpolate_time(&resolved.index, values),
            GapPolicy::Keep => values.clone(),
        };
        let aggregated = aggregate(&resolved.index, &values, timeline, field.aggregation);
        table.push_column(Column::new(sensor.column_name(field), aggregated))?;
    }

    let buckets_filled = (0..table.len())
        .filter(|&row| table.columns().iter().any(|c| c.values[row].is_some()))
        .count();

    debug!(
        sensor = sensor.name(),
        rows_read,
        rows_unmapped,
        buckets_filled,
        "Loaded sensor"
    );

    Ok(SensorLoad {
        table,
        stats: SensorStats {
            sensor: sensor.name().to_string(),
            rows_read,
            rows_unmapped,
            buckets_filled,
        },
    })
}

fn read_raw<S: SensorSource + ?Sized>(sensor: &S, path: &Path) -> Result<RawSamples> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| PipelineError::csv(path, e))?;

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::csv(path, e))?
        .clone();
    let context = path.display().to_string();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == name)
            .ok_or_else(|| PipelineError::schema(name, &context))
    };

    let clock_idx = position(sensor.clock().column())?;
    let field_idx = sensor
        .fields()
        .iter()
        .map(|f| position(f.header))
        .collect::<Result<Vec<_>>>()?;

    let mut raw = RawSamples {
        clock: Vec::new(),
        fields: vec![Vec::new(); field_idx.len()],
    };
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| PipelineError::csv(path, e))?;
        raw.clock
            .push(record.get(clock_idx).unwrap_or_default().to_string());

        for ((column, &idx), field) in raw.fields.iter_mut().zip(&field_idx).zip(sensor.fields()) {
            let cell = record.get(idx).unwrap_or_default();
            let value = parse_cell(cell).map_err(|_| PipelineError::InvalidValue {
                path: path.to_path_buf(),
                column: field.header.to_string(),
                record: i as u64 + 1,
                value: cell.to_string(),
            })?;
            column.push(value);
        }
    }

    Ok(raw)
}

/// Attach a wall-clock time to every row that has one, sorted by time.
fn resolve<S: SensorSource + ?Sized>(
    sensor: &S,
    raw: RawSamples,
    mapper: &TimeMapper,
    path: &Path,
) -> Result<ResolvedSamples> {
    let invalid = |row: usize, value: &str| PipelineError::InvalidValue {
        path: PathBuf::from(path),
        column: sensor.clock().column().to_string(),
        record: row as u64 + 1,
        value: value.to_string(),
    };

    let mut mapped: Vec<MappedOffset> = match sensor.clock() {
        ClockSource::ExperimentRelative { .. } => {
            let offsets = raw
                .clock
                .iter()
                .enumerate()
                .map(|(row, text)| {
                    if text.is_empty() {
                        Ok(f64::NAN)
                    } else {
                        text.parse::<f64>().map_err(|_| invalid(row, text.as_str()))
                    }
                })
                .collect::<Result<Vec<f64>>>()?;
            mapper.map(&offsets)
        }
        ClockSource::WallClock { .. } => raw
            .clock
            .iter()
            .enumerate()
            .filter(|(_, text)| !text.is_empty())
            .map(|(index, text)| {
                parse_wall_clock(text)
                    .map(|wall_clock| MappedOffset { index, wall_clock })
                    .ok_or_else(|| invalid(index, text.as_str()))
            })
            .collect::<Result<Vec<_>>>()?,
    };

    mapped.sort_by_key(|m| m.wall_clock);

    Ok(ResolvedSamples {
        index: mapped.iter().map(|m| m.wall_clock).collect(),
        fields: raw
            .fields
            .iter()
            .map(|column| mapped.iter().map(|m| column[m.index]).collect())
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ts;
    use crate::core::schedule::{two_interval_records, Schedule};
    use crate::core::timeline::Frequency;
    use crate::sensors::kind::SensorKind;

    fn mapper() -> TimeMapper {
        TimeMapper::new(Schedule::from_records(&two_interval_records(), Path::new("time.csv")).unwrap())
    }

    fn timeline(mapper: &TimeMapper) -> Timeline {
        let schedule = mapper.schedule();
        Timeline::date_range(schedule.start(), schedule.end(), Frequency::from_millis(10_000).unwrap())
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mapper = mapper();
        let err = load_sensor(&SensorKind::Gyroscope, dir.path(), &mapper, &timeline(&mapper))
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingSourceFile { ref sensor, .. } if sensor == "Gyroscope"
        ));
    }

    #[test]
    fn test_missing_header_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Barometer.csv"), "Time (s),Pressure\n1.0,1000\n").unwrap();
        let mapper = mapper();
        let err = load_sensor(&SensorKind::Barometer, dir.path(), &mapper, &timeline(&mapper))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Schema { ref column, .. } if column == "X (hPa)"));
    }

    #[test]
    fn test_experiment_relative_sensor() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Barometer.csv"),
            "\"Time (s)\",\"X (hPa)\"\n1.0,1000\n3.0,1002\n15.0,9999\n25.0,1010\n",
        )
        .unwrap();

        let mapper = mapper();
        let timeline = timeline(&mapper);
        let load = load_sensor(&SensorKind::Barometer, dir.path(), &mapper, &timeline).unwrap();

        // Timeline: 00:00:00, 00:00:10, ..., 00:01:10 (8 points)
        assert_eq!(load.table.len(), 8);
        let column = load.table.column("Barometer_X").unwrap();
        assert_eq!(column[0], Some(1001.0));
        assert_eq!(column[6], Some(1010.0));
        assert_eq!(column[7], None);
        assert_eq!(load.stats.rows_read, 4);
        assert_eq!(load.stats.rows_unmapped, 1);
        assert_eq!(load.stats.buckets_filled, 2);
    }

    #[test]
    fn test_heart_rate_interpolates_before_bucketing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Heart_rate.csv"),
            "Date/Time,Min (count/min),Max (count/min),Avg (count/min)\n\
             2024-01-01 00:00:00,60,70,60\n\
             2024-01-01 00:00:20,,,\n\
             2024-01-01 00:00:40,80,90,80\n",
        )
        .unwrap();

        let mapper = mapper();
        let timeline = timeline(&mapper);
        let load = load_sensor(&SensorKind::HeartRate, dir.path(), &mapper, &timeline).unwrap();

        let column = load.table.column("Heart_rate_Avg").unwrap();
        assert_eq!(column[0], Some(60.0));
        assert_eq!(column[1], None);
        assert_eq!(column[2], Some(70.0));
        assert_eq!(column[4], Some(80.0));
        assert_eq!(load.stats.rows_unmapped, 0);
    }

    #[test]
    fn test_bad_cell_is_invalid_value() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Proximity.csv"), "Time (s),Distance (cm)\n1.0,far\n").unwrap();
        let mapper = mapper();
        let err = load_sensor(&SensorKind::Proximity, dir.path(), &mapper, &timeline(&mapper))
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidValue { record: 1, .. }));
    }

    #[test]
    fn test_unsorted_rows_are_ordered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Location.csv"),
            "Time (s),Latitude (°),Longitude (°),Height (m),Velocity (m/s)\n\
             8.0,2.0,2.0,2.0,2.0\n\
             1.0,1.0,1.0,1.0,1.0\n",
        )
        .unwrap();
        let mapper = mapper();
        let load =
            load_sensor(&SensorKind::Location, dir.path(), &mapper, &timeline(&mapper)).unwrap();
        assert_eq!(load.table.column("Location_Latitude").unwrap()[0], Some(2.0));
        assert_eq!(ts("2024-01-01 00:00:00"), load.table.time()[0]);
    }
}
