//! Outer join of per-sensor tables on the shared timeline.

use crate::core::table::AlignedTable;
use crate::core::timeline::Timeline;
use crate::error::{PipelineError, Result};
use tracing::debug;

/// Join sensor tables that are all indexed by `timeline`.
///
/// Every column of every table is kept, in input order. A table indexed by
/// anything other than the timeline, or a repeated column name, means the
/// timeline was built wrong and is reported as an invariant violation.
pub fn merge(timeline: &Timeline, tables: Vec<AlignedTable>) -> Result<AlignedTable> {
    let mut merged = AlignedTable::new(timeline.points().to_vec());

    for (position, table) in tables.into_iter().enumerate() {
        if table.len() != timeline.len() {
            return Err(PipelineError::Invariant(format!(
                "table {position} has {} rows but the timeline has {}",
                table.len(),
                timeline.len()
            )));
        }
        if table.time() != timeline.points() {
            return Err(PipelineError::Invariant(format!(
                "table {position} is not indexed by the session timeline"
            )));
        }
        for column in table.into_columns() {
            merged.push_column(column)?;
        }
    }

    debug!(
        rows = merged.len(),
        columns = merged.columns().len(),
        "Merged sensor tables"
    );
    Ok(merged)
}
