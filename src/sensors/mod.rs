//! Sensor sources and the loader that puts them on a timeline.
//!
//! Every sensor shares one contract ([`SensorSource`]): a file name, the
//! declared fields with their per-bucket aggregation, and the clock its
//! timestamps are written in. The fixed catalog lives in [`SensorKind`].

pub mod kind;
pub mod loader;
pub mod source;

pub use kind::SensorKind;
pub use loader::{load_sensor, SensorLoad, SensorStats};
pub use source::{ClockSource, FieldSpec, GapPolicy, SensorSource};
