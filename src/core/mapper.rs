//! Experiment-relative to wall-clock time mapping.

use crate::core::clock::offset_from_secs;
use crate::core::schedule::Schedule;
use chrono::NaiveDateTime;

/// A single input offset that landed inside a recording interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedOffset {
    /// Position of the offset in the input sequence
    pub index: usize,
    /// Wall-clock time the offset maps to
    pub wall_clock: NaiveDateTime,
}

/// Maps experiment offsets onto the wall clock of one session.
///
/// Holds the session's resolved schedule for its whole lifetime; every
/// sensor of the session maps through the same instance.
#[derive(Debug, Clone)]
pub struct TimeMapper {
    schedule: Schedule,
}

impl TimeMapper {
    pub fn new(schedule: Schedule) -> Self {
        Self { schedule }
    }

    /// The schedule this mapper anchors to.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Map a single offset in seconds, or `None` when it falls in a pause.
    pub fn map_offset(&self, offset_secs: f64) -> Option<NaiveDateTime> {
        let offset = offset_from_secs(offset_secs)?;
        self.schedule
            .intervals()
            .iter()
            .find(|interval| interval.contains_offset(offset))
            .map(|interval| interval.wall_clock_at(offset))
    }

    /// Map a sequence of offsets in seconds.
    ///
    /// Results are grouped interval by interval in chronological order and
    /// keep the input order inside each interval. Offsets outside every
    /// interval produce no entry.
    pub fn map(&self, offsets_secs: &[f64]) -> Vec<MappedOffset> {
        let offsets: Vec<_> = offsets_secs.iter().map(|&s| offset_from_secs(s)).collect();

        let mut mapped = Vec::with_capacity(offsets.len());
        for interval in self.schedule.intervals() {
            mapped.extend(offsets.iter().enumerate().filter_map(|(index, &offset)| {
                offset
                    .filter(|&o| interval.contains_offset(o))
                    .map(|o| MappedOffset {
                        index,
                        wall_clock: interval.wall_clock_at(o),
                    })
            }));
        }
        mapped
    }
}
