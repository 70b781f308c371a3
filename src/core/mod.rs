//! Core alignment machinery.
//!
//! This module contains:
//! - Schedule resolution and experiment-to-wall-clock mapping
//! - The global timeline and per-bucket aggregation
//! - The aligned table, merging and cleaning

pub mod aggregate;
pub mod clean;
pub mod clock;
pub mod columns;
pub mod interpolate;
pub mod mapper;
pub mod merge;
pub mod schedule;
pub mod table;
pub mod timeline;

// Re-export commonly used types
pub use aggregate::{aggregate, Aggregation};
pub use clean::{clean, clean_with_stats, CleanStats};
pub use mapper::{MappedOffset, TimeMapper};
pub use merge::merge;
pub use schedule::{Interval, Schedule, ScheduleRecord, TimeAnchor, SCHEDULE_FILE};
pub use table::{AlignedTable, Column};
pub use timeline::{Frequency, Timeline};
