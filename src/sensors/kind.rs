//! The fixed catalog of recorded sensors.
//!
//! Phyphox exports carry an experiment-relative `Time (s)` column; the
//! Apple Watch heart-rate export carries absolute `Date/Time` text.

use crate::sensors::source::{ClockSource, FieldSpec, GapPolicy, SensorSource};
use serde::{Deserialize, Serialize};
use std::fmt;

const PHYPHOX_CLOCK: ClockSource = ClockSource::ExperimentRelative { column: "Time (s)" };
const WATCH_CLOCK: ClockSource = ClockSource::WallClock { column: "Date/Time" };

const ACCELERATION_FIELDS: [FieldSpec; 3] = [
    FieldSpec::mean("X (m/s^2)", "X"),
    FieldSpec::mean("Y (m/s^2)", "Y"),
    FieldSpec::mean("Z (m/s^2)", "Z"),
];

const GYROSCOPE_FIELDS: [FieldSpec; 3] = [
    FieldSpec::mean("X (rad/s)", "X"),
    FieldSpec::mean("Y (rad/s)", "Y"),
    FieldSpec::mean("Z (rad/s)", "Z"),
];

const MAGNETOMETER_FIELDS: [FieldSpec; 3] = [
    FieldSpec::mean("X (µT)", "X"),
    FieldSpec::mean("Y (µT)", "Y"),
    FieldSpec::mean("Z (µT)", "Z"),
];

const BAROMETER_FIELDS: [FieldSpec; 1] = [FieldSpec::mean("X (hPa)", "X")];

const PROXIMITY_FIELDS: [FieldSpec; 1] = [FieldSpec::mean("Distance (cm)", "Distance")];

// Position is not meaningfully averaged; keep the latest fix per bucket.
const LOCATION_FIELDS: [FieldSpec; 4] = [
    FieldSpec::last("Latitude (°)", "Latitude"),
    FieldSpec::last("Longitude (°)", "Longitude"),
    FieldSpec::last("Height (m)", "Height"),
    FieldSpec::last("Velocity (m/s)", "Velocity"),
];

const HEART_RATE_FIELDS: [FieldSpec; 1] = [FieldSpec::mean("Avg (count/min)", "Avg")];

/// Every sensor recorded in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    Accelerometer,
    Barometer,
    Gyroscope,
    HeartRate,
    LinearAccelerometer,
    Location,
    Magnetometer,
    Proximity,
}

impl SensorKind {
    /// All sensors, in output column order.
    pub const ALL: [SensorKind; 8] = [
        SensorKind::Accelerometer,
        SensorKind::Barometer,
        SensorKind::Gyroscope,
        SensorKind::HeartRate,
        SensorKind::LinearAccelerometer,
        SensorKind::Location,
        SensorKind::Magnetometer,
        SensorKind::Proximity,
    ];
}

impl SensorSource for SensorKind {
    fn name(&self) -> &str {
        match self {
            SensorKind::Accelerometer => "Accelerometer",
            SensorKind::Barometer => "Barometer",
            SensorKind::Gyroscope => "Gyroscope",
            SensorKind::HeartRate => "Heart_rate",
            SensorKind::LinearAccelerometer => "Linear_Accelerometer",
            SensorKind::Location => "Location",
            SensorKind::Magnetometer => "Magnetometer",
            SensorKind::Proximity => "Proximity",
        }
    }

    fn file_name(&self) -> &str {
        match self {
            SensorKind::Accelerometer => "Accelerometer.csv",
            SensorKind::Barometer => "Barometer.csv",
            SensorKind::Gyroscope => "Gyroscope.csv",
            SensorKind::HeartRate => "Heart_rate.csv",
            SensorKind::LinearAccelerometer => "Linear Accelerometer.csv",
            SensorKind::Location => "Location.csv",
            SensorKind::Magnetometer => "Magnetometer.csv",
            SensorKind::Proximity => "Proximity.csv",
        }
    }

    fn fields(&self) -> &[FieldSpec] {
        match self {
            SensorKind::Accelerometer | SensorKind::LinearAccelerometer => &ACCELERATION_FIELDS,
            SensorKind::Gyroscope => &GYROSCOPE_FIELDS,
            SensorKind::Magnetometer => &MAGNETOMETER_FIELDS,
            SensorKind::Barometer => &BAROMETER_FIELDS,
            SensorKind::Proximity => &PROXIMITY_FIELDS,
            SensorKind::Location => &LOCATION_FIELDS,
            SensorKind::HeartRate => &HEART_RATE_FIELDS,
        }
    }

    fn clock(&self) -> ClockSource {
        match self {
            SensorKind::HeartRate => WATCH_CLOCK,
            _ => PHYPHOX_CLOCK,
        }
    }

    fn gap_policy(&self) -> GapPolicy {
        match self {
            // Watch dropouts are frequent and short.
            SensorKind::HeartRate => GapPolicy::InterpolateTime,
            _ => GapPolicy::Keep,
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
