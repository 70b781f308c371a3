//! Feature stage over a preprocessed table.
//!
//! For every configured window size and every feature column this adds
//! rolling min/max/mean/std/median columns, then one dominant-frequency
//! column. The target is held aside while features are generated and
//! re-appended as the last column. Rows left with any null are dropped.

pub mod rolling;
pub mod spectral;

pub use rolling::{rolling, rolling_column_name, ROLLING_STATISTICS};
pub use spectral::{dominant_column_name, dominant_frequencies, DominantFrequency};

use crate::core::columns::{feature_columns, target_column};
use crate::core::table::{AlignedTable, Column};
use crate::core::timeline::Frequency;
use crate::error::{PipelineError, Result};
use tracing::debug;

const CONTEXT: &str = "preprocessed table";

/// Build the feature table from a cleaned, aligned table.
///
/// `frequency` is the spacing the table was resampled at; it fixes the
/// sample rate of the spectral features.
pub fn build_features(
    table: AlignedTable,
    windows: &[usize],
    frequency: Frequency,
) -> Result<AlignedTable> {
    if let Some(&w) = windows.iter().find(|&&w| w < 2) {
        return Err(PipelineError::Invariant(format!(
            "feature window of {w} rows is too small"
        )));
    }
    for name in feature_columns() {
        table.require_column(name, CONTEXT)?;
    }

    let (mut table, target) = table.take_column(target_column());
    let target = target.ok_or_else(|| PipelineError::schema(target_column(), CONTEXT))?;
    let rows_in = table.len();

    let mut generated = Vec::new();
    for &window in windows {
        for name in feature_columns() {
            let values = table.require_column(name, CONTEXT)?;
            for (label, aggregation) in ROLLING_STATISTICS {
                generated.push(Column::new(
                    rolling_column_name(name, label, window),
                    rolling(values, window, aggregation),
                ));
            }
        }
    }

    let sample_rate_hz = frequency.sample_rate_hz();
    for &window in windows {
        for name in feature_columns() {
            let values = table.require_column(name, CONTEXT)?;
            generated.push(Column::new(
                dominant_column_name(name, window),
                dominant_frequencies(values, window, sample_rate_hz),
            ));
        }
    }

    let added = generated.len();
    for column in generated {
        table.push_column(column)?;
    }
    table.push_column(target)?;

    let complete = table.filter_rows(|row| table.columns().iter().all(|c| c.values[row].is_some()));

    debug!(
        columns_added = added,
        rows_in,
        rows_out = complete.len(),
        "Built feature table"
    );
    Ok(complete)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ts;
    use crate::core::columns::{BAROMETER_X, HEART_RATE, PROXIMITY_DISTANCE};
    use chrono::Duration;

    fn preprocessed(rows: i64) -> AlignedTable {
        let time = (0..rows)
            .map(|s| ts("2024-01-01 00:00:00") + Duration::seconds(s))
            .collect();
        let mut table = AlignedTable::new(time);
        for name in feature_columns() {
            let values = (0..rows).map(|i| Some(i as f64)).collect();
            table.push_column(Column::new(*name, values)).unwrap();
        }
        table
            .push_column(Column::new(HEART_RATE, (0..rows).map(|_| Some(70.0)).collect()))
            .unwrap();
        table
    }

    #[test]
    fn test_target_is_last_and_incomplete_rows_dropped() {
        let features = build_features(preprocessed(20), &[3, 5], Frequency::default()).unwrap();

        // Rows 0..=3 lack a full 5-row window.
        assert_eq!(features.len(), 16);
        assert_eq!(features.columns().last().unwrap().name, HEART_RATE);
        assert_eq!(features.time()[0], ts("2024-01-01 00:00:04"));

        // 17 inputs + 17 * 2 windows * (5 rolling + 1 spectral) + target
        assert_eq!(features.columns().len(), 17 + 17 * 2 * 6 + 1);

        let mean = features.column("Barometer_X_mean_3").unwrap();
        assert!((mean[0].unwrap() - 3.0).abs() < 1e-9);
        // Population deviation of [2, 3, 4]
        let std = features.column("Barometer_X_std_3").unwrap();
        assert!((std[0].unwrap() - 0.816_496_580_927_726).abs() < 1e-9);
        assert!(features.column("Barometer_X_dominant_freq_5").is_some());
        assert!(features.column(PROXIMITY_DISTANCE).is_none());
    }

    #[test]
    fn test_missing_target_is_schema_error() {
        let (table, _) = preprocessed(10).take_column(HEART_RATE);
        let err = build_features(table, &[3], Frequency::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Schema { ref column, .. } if column == HEART_RATE));
    }

    #[test]
    fn test_missing_feature_is_schema_error() {
        let (table, _) = preprocessed(10).take_column(BAROMETER_X);
        let err = build_features(table, &[3], Frequency::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Schema { ref column, .. } if column == BAROMETER_X));
    }

    #[test]
    fn test_window_too_small() {
        let err = build_features(preprocessed(10), &[1], Frequency::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Invariant(_)));
    }
}
