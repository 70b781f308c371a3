//! Trailing-window statistics over a table column.

use crate::core::aggregate::Aggregation;

/// Statistics computed for every rolling window, in output order, with
/// the label used in the column name.
///
/// `std` is the population deviation over the window.
pub const ROLLING_STATISTICS: [(&str, Aggregation); 5] = [
    ("min", Aggregation::Min),
    ("max", Aggregation::Max),
    ("mean", Aggregation::Mean),
    ("std", Aggregation::PopulationStd),
    ("median", Aggregation::Median),
];

/// Apply `aggregation` over the trailing `window` rows ending at each row.
///
/// A row is null until `window` rows are available, and whenever the
/// window contains a null.
pub fn rolling(values: &[Option<f64>], window: usize, aggregation: Aggregation) -> Vec<Option<f64>> {
    trailing_windows(values, window)
        .map(|samples| samples.and_then(|s| aggregation.apply(&s)))
        .collect()
}

/// The complete trailing windows of `values`, one per row.
pub(crate) fn trailing_windows(
    values: &[Option<f64>],
    window: usize,
) -> impl Iterator<Item = Option<Vec<f64>>> + '_ {
    (0..values.len()).map(move |row| {
        if window == 0 || row + 1 < window {
            return None;
        }
        values[row + 1 - window..=row].iter().copied().collect()
    })
}

/// Output column name, e.g. `Barometer_X_mean_10`.
pub fn rolling_column_name(column: &str, label: &str, window: usize) -> String {
    format!("{column}_{label}_{window}")
}
