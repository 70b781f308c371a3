//! Column names of the aligned table.

/// Row key of every table.
pub const TIME: &str = "Time";

pub const ACCELEROMETER_X: &str = "Accelerometer_X";
pub const ACCELEROMETER_Y: &str = "Accelerometer_Y";
pub const ACCELEROMETER_Z: &str = "Accelerometer_Z";
pub const BAROMETER_X: &str = "Barometer_X";
pub const GYROSCOPE_X: &str = "Gyroscope_X";
pub const GYROSCOPE_Y: &str = "Gyroscope_Y";
pub const GYROSCOPE_Z: &str = "Gyroscope_Z";
pub const LINEAR_ACCELEROMETER_X: &str = "Linear_Accelerometer_X";
pub const LINEAR_ACCELEROMETER_Y: &str = "Linear_Accelerometer_Y";
pub const LINEAR_ACCELEROMETER_Z: &str = "Linear_Accelerometer_Z";
pub const LOCATION_LATITUDE: &str = "Location_Latitude";
pub const LOCATION_LONGITUDE: &str = "Location_Longitude";
pub const LOCATION_HEIGHT: &str = "Location_Height";
pub const LOCATION_VELOCITY: &str = "Location_Velocity";
pub const MAGNETOMETER_X: &str = "Magnetometer_X";
pub const MAGNETOMETER_Y: &str = "Magnetometer_Y";
pub const MAGNETOMETER_Z: &str = "Magnetometer_Z";

/// Unreliable reading, removed during cleaning.
pub const PROXIMITY_DISTANCE: &str = "Proximity_Distance";

/// Regression target.
pub const HEART_RATE: &str = "Heart_rate_Avg";

/// Declared feature columns, in output order.
pub const FEATURE_COLUMNS: [&str; 17] = [
    ACCELEROMETER_X,
    ACCELEROMETER_Y,
    ACCELEROMETER_Z,
    BAROMETER_X,
    GYROSCOPE_X,
    GYROSCOPE_Y,
    GYROSCOPE_Z,
    LINEAR_ACCELEROMETER_X,
    LINEAR_ACCELEROMETER_Y,
    LINEAR_ACCELEROMETER_Z,
    LOCATION_LATITUDE,
    LOCATION_LONGITUDE,
    LOCATION_HEIGHT,
    LOCATION_VELOCITY,
    MAGNETOMETER_X,
    MAGNETOMETER_Y,
    MAGNETOMETER_Z,
];

pub fn target_column() -> &'static str {
    HEART_RATE
}

pub fn feature_columns() -> &'static [&'static str] {
    &FEATURE_COLUMNS
}
