//! Cleaning of the merged table.
//!
//! Four order-dependent steps, each returning a new table:
//! 1. drop session gaps (rows where every feature is null)
//! 2. drop unlabeled rows (null target)
//! 3. drop the proximity distance column
//! 4. time-interpolate the remaining nulls
//!
//! Running the pipeline on its own output changes nothing.

use crate::core::columns::{feature_columns, target_column, PROXIMITY_DISTANCE};
use crate::core::interpolate::{count_nulls, interpolate_time};
use crate::core::table::{AlignedTable, Column};
use crate::error::Result;
use serde::Serialize;
use tracing::debug;

const CONTEXT: &str = "aligned table";

/// Rows removed by each cleaning step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanStats {
    pub gap_rows_dropped: usize,
    pub unlabeled_rows_dropped: usize,
    pub cells_interpolated: usize,
}

/// Run all four steps.
pub fn clean(table: &AlignedTable) -> Result<AlignedTable> {
    clean_with_stats(table).map(|(table, _)| table)
}

/// Run all four steps and report what each removed.
pub fn clean_with_stats(table: &AlignedTable) -> Result<(AlignedTable, CleanStats)> {
    let mut stats = CleanStats::default();

    let step = drop_session_gaps(table)?;
    stats.gap_rows_dropped = table.len() - step.len();

    let before = step.len();
    let step = drop_unlabeled_rows(&step)?;
    stats.unlabeled_rows_dropped = before - step.len();

    let step = drop_proximity_distance(&step);

    let nulls_before = null_cells(&step);
    let step = interpolate_rest(&step)?;
    stats.cells_interpolated = nulls_before - null_cells(&step);

    debug!(
        gap_rows = stats.gap_rows_dropped,
        unlabeled_rows = stats.unlabeled_rows_dropped,
        interpolated = stats.cells_interpolated,
        rows = step.len(),
        "Cleaned aligned table"
    );
    Ok((step, stats))
}

/// Drop rows where all declared feature columns are null.
pub fn drop_session_gaps(table: &AlignedTable) -> Result<AlignedTable> {
    let features = feature_columns()
        .iter()
        .map(|name| table.require_column(name, CONTEXT))
        .collect::<Result<Vec<_>>>()?;

    Ok(table.filter_rows(|row| features.iter().any(|column| column[row].is_some())))
}

/// Drop rows with a null target.
pub fn drop_unlabeled_rows(table: &AlignedTable) -> Result<AlignedTable> {
    let target = table.require_column(target_column(), CONTEXT)?;
    Ok(table.filter_rows(|row| target[row].is_some()))
}

/// Drop the proximity distance column; no-op when it is already gone.
pub fn drop_proximity_distance(table: &AlignedTable) -> AlignedTable {
    table.without_column(PROXIMITY_DISTANCE)
}

/// Interpolate remaining nulls of every column by row time.
pub fn interpolate_rest(table: &AlignedTable) -> Result<AlignedTable> {
    let mut out = AlignedTable::new(table.time().to_vec());
    for column in table.columns() {
        let values = interpolate_time(table.time(), &column.values);
        out.push_column(Column::new(column.name.clone(), values))?;
    }
    Ok(out)
}

fn null_cells(table: &AlignedTable) -> usize {
    table
        .columns()
        .iter()
        .map(|c| count_nulls(&c.values))
        .sum()
}
