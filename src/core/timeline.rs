//! Fixed-frequency session timeline.
//!
//! The timeline is the shared index every sensor is resampled onto. Point
//! `t_i` opens bucket `[t_i, t_{i+1})`; the final point opens no bucket.

use crate::config::ConfigError;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Spacing between consecutive timeline points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frequency {
    millis: u64,
}

impl Frequency {
    pub fn from_millis(millis: u64) -> Result<Self, ConfigError> {
        if millis == 0 {
            return Err(ConfigError::InvalidFrequency(
                "frequency must be positive".to_string(),
            ));
        }
        Ok(Self { millis })
    }

    pub fn as_millis(&self) -> u64 {
        self.millis
    }

    pub fn as_duration(&self) -> Duration {
        Duration::milliseconds(self.millis as i64)
    }

    /// Rows per second of a table sampled at this frequency.
    pub fn sample_rate_hz(&self) -> f64 {
        1000.0 / self.millis as f64
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Self { millis: 1000 }
    }
}

impl FromStr for Frequency {
    type Err = ConfigError;

    /// Parse `"<n>ms"`, `"<n>s"`, `"<n>min"` or a bare number of milliseconds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_lowercase();
        let (digits, scale) = if let Some(n) = text.strip_suffix("ms") {
            (n, 1)
        } else if let Some(n) = text.strip_suffix("min") {
            (n, 60_000)
        } else if let Some(n) = text.strip_suffix('s') {
            (n, 1_000)
        } else {
            (text.as_str(), 1)
        };

        let value: u64 = digits
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidFrequency(s.to_string()))?;
        let millis = value
            .checked_mul(scale)
            .ok_or_else(|| ConfigError::InvalidFrequency(s.to_string()))?;
        Self::from_millis(millis).map_err(|_| ConfigError::InvalidFrequency(s.to_string()))
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.millis)
    }
}

impl Serialize for Frequency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Frequency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// An ordered sequence of equally spaced timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    points: Vec<NaiveDateTime>,
    frequency: Frequency,
}

impl Timeline {
    /// Points from `start` up to and including `end` when it lies on the grid.
    pub fn date_range(start: NaiveDateTime, end: NaiveDateTime, frequency: Frequency) -> Self {
        let step = frequency.as_duration();
        let mut points = Vec::new();
        let mut t = start;
        while t <= end {
            points.push(t);
            t += step;
        }
        Self { points, frequency }
    }

    /// Append one point past the end so the last real bucket gets closed.
    pub fn with_trailing_point(mut self) -> Self {
        if let Some(&last) = self.points.last() {
            self.points.push(last + self.frequency.as_duration());
        }
        self
    }

    pub fn points(&self) -> &[NaiveDateTime] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Half-open `[t_i, t_{i+1})` bounds of every bucket.
    pub fn buckets(&self) -> impl Iterator<Item = (NaiveDateTime, NaiveDateTime)> + '_ {
        self.points.windows(2).map(|pair| (pair[0], pair[1]))
    }
}
