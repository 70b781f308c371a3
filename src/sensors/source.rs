//! The contract every sensor source shares.

use crate::core::aggregate::Aggregation;
use serde::Serialize;

/// One declared field of a sensor file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Header of the raw column, units included
    pub header: &'static str,
    /// Field name used in the output column
    pub name: &'static str,
    /// Reduction applied per bucket
    pub aggregation: Aggregation,
}

impl FieldSpec {
    pub const fn new(header: &'static str, name: &'static str, aggregation: Aggregation) -> Self {
        Self {
            header,
            name,
            aggregation,
        }
    }

    pub const fn mean(header: &'static str, name: &'static str) -> Self {
        Self::new(header, name, Aggregation::Mean)
    }

    pub const fn last(header: &'static str, name: &'static str) -> Self {
        Self::new(header, name, Aggregation::Last)
    }
}

/// Where a sensor's timestamps come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockSource {
    /// Seconds since recording start; mapped through the session schedule
    ExperimentRelative { column: &'static str },
    /// Absolute date-time text
    WallClock { column: &'static str },
}

impl ClockSource {
    pub fn column(&self) -> &'static str {
        match self {
            ClockSource::ExperimentRelative { column } | ClockSource::WallClock { column } => *column,
        }
    }
}

/// How nulls in the raw samples are treated before bucketing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Leave nulls; aggregation skips them
    #[default]
    Keep,
    /// Time-interpolate nulls between known samples
    InterpolateTime,
}

/// Capabilities of a sensor source.
pub trait SensorSource {
    /// Column prefix, e.g. `Linear_Accelerometer`.
    fn name(&self) -> &str;

    /// File name inside the session directory.
    fn file_name(&self) -> &str;

    /// Declared fields with their aggregation.
    fn fields(&self) -> &[FieldSpec];

    fn clock(&self) -> ClockSource;

    fn gap_policy(&self) -> GapPolicy {
        GapPolicy::Keep
    }

    /// Output column name of a field.
    fn column_name(&self, field: &FieldSpec) -> String {
        format!("{}_{}", self.name(), field.name)
    }

    /// Output column names, in declaration order.
    fn column_names(&self) -> Vec<String> {
        self.fields().iter().map(|f| self.column_name(f)).collect()
    }
}
