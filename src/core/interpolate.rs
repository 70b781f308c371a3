//! Time-weighted linear interpolation of null cells.

use crate::core::clock::seconds_between;
use chrono::NaiveDateTime;

/// Fill nulls of `values` using `time` as the x-axis.
///
/// Nulls between two known values are interpolated linearly in time.
/// Trailing nulls repeat the last known value. Leading nulls stay null.
/// Applying it twice is the same as applying it once.
pub fn interpolate_time(time: &[NaiveDateTime], values: &[Option<f64>]) -> Vec<Option<f64>> {
    debug_assert_eq!(time.len(), values.len());

    let mut out = values.to_vec();
    let mut previous: Option<usize> = None;

    for (i, value) in values.iter().enumerate() {
        let Some(current) = *value else {
            continue;
        };

        if let Some(p) = previous {
            if i > p + 1 {
                let (left, right) = (values[p].unwrap_or(current), current);
                let span = seconds_between(time[p], time[i]);
                for (j, slot) in out.iter_mut().enumerate().take(i).skip(p + 1) {
                    let weight = if span > 0.0 {
                        seconds_between(time[p], time[j]) / span
                    } else {
                        0.0
                    };
                    *slot = Some(left + (right - left) * weight);
                }
            }
        }
        previous = Some(i);
    }

    if let Some(p) = previous {
        let last = values[p];
        for slot in out.iter_mut().skip(p + 1) {
            *slot = last;
        }
    }

    out
}

/// Number of null cells.
pub fn count_nulls(values: &[Option<f64>]) -> usize {
    values.iter().filter(|v| v.is_none()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ts;

    fn times(secs: &[u32]) -> Vec<NaiveDateTime> {
        secs.iter()
            .map(|&s| ts("2024-01-01 00:00:00") + chrono::Duration::seconds(s as i64))
            .collect()
    }

    #[test]
    fn test_uses_time_not_position() {
        let time = times(&[0, 1, 4]);
        let out = interpolate_time(&time, &[Some(0.0), None, Some(8.0)]);
        assert_eq!(out, vec![Some(0.0), Some(2.0), Some(8.0)]);
    }

    #[test]
    fn test_edges() {
        let time = times(&[0, 1, 2, 3, 4]);
        let out = interpolate_time(&time, &[None, Some(1.0), None, Some(3.0), None]);
        assert_eq!(out, vec![None, Some(1.0), Some(2.0), Some(3.0), Some(3.0)]);
    }

    #[test]
    fn test_all_null_unchanged() {
        let time = times(&[0, 1]);
        assert_eq!(interpolate_time(&time, &[None, None]), vec![None, None]);
    }

    #[test]
    fn test_idempotent() {
        let time = times(&[0, 2, 3, 7, 9]);
        let once = interpolate_time(&time, &[None, Some(2.0), None, None, Some(-1.0)]);
        let twice = interpolate_time(&time, &once);
        assert_eq!(once, twice);
        assert_eq!(count_nulls(&once), 1);
    }
}
