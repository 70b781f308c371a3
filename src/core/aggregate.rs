//! Bucketing of irregular samples onto the session timeline.

use crate::core::timeline::Timeline;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Median, Statistics};
use std::fmt;

/// Reduction applied to the samples of one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    Min,
    Max,
    Mean,
    /// Sample standard deviation (n - 1 denominator)
    Std,
    /// Population standard deviation (n denominator)
    PopulationStd,
    Median,
    First,
    Last,
    Count,
}

impl Aggregation {
    /// Reduce the non-null samples of one bucket.
    ///
    /// Empty input and non-finite results (std of a single sample) are null.
    pub fn apply(&self, samples: &[f64]) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        let value = match self {
            Aggregation::Min => Statistics::min(samples),
            Aggregation::Max => Statistics::max(samples),
            Aggregation::Mean => Statistics::mean(samples),
            Aggregation::Std => Statistics::std_dev(samples),
            Aggregation::PopulationStd => Statistics::population_std_dev(samples),
            Aggregation::Median => Data::new(samples.to_vec()).median(),
            Aggregation::First => samples[0],
            Aggregation::Last => samples[samples.len() - 1],
            Aggregation::Count => samples.len() as f64,
        };
        value.is_finite().then_some(value)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::Mean => "mean",
            Aggregation::Std => "std",
            Aggregation::PopulationStd => "population_std",
            Aggregation::Median => "median",
            Aggregation::First => "first",
            Aggregation::Last => "last",
            Aggregation::Count => "count",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Aggregate one wall-clock-indexed field onto `timeline`.
///
/// `index` must be sorted ascending and parallel to `values`. Bucket `i`
/// collects the non-null values with `t_i <= index < t_{i+1}`. The output
/// has one entry per timeline point; the final point has no bucket and is
/// always null.
pub fn aggregate(
    index: &[NaiveDateTime],
    values: &[Option<f64>],
    timeline: &Timeline,
    aggregation: Aggregation,
) -> Vec<Option<f64>> {
    debug_assert_eq!(index.len(), values.len());
    debug_assert!(index.windows(2).all(|w| w[0] <= w[1]));

    let mut out: Vec<Option<f64>> = timeline
        .buckets()
        .map(|(start, end)| {
            let lo = index.partition_point(|t| *t < start);
            let hi = index.partition_point(|t| *t < end);
            let samples: Vec<f64> = values[lo..hi].iter().flatten().copied().collect();
            aggregation.apply(&samples)
        })
        .collect();

    if !timeline.is_empty() {
        out.push(None);
    }
    out
}
