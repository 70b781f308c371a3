//! Sensor Align - time alignment and multi-sensor aggregation for
//! heart-rate experiment recordings.
//!
//! A session directory holds a recorder event log (`meta/time.csv`) and one
//! CSV per sensor. Phone sensors are stamped with experiment time that
//! freezes while the recorder is paused; the watch heart-rate export is
//! stamped with wall-clock time. This crate puts them all on one
//! fixed-frequency wall-clock timeline and produces a single wide table
//! keyed by `Time` with `Heart_rate_Avg` as the target.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Sensor Align                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌────────────┐   ┌─────────────────┐       │
//! │  │  Schedule  │──▶│ TimeMapper │──▶│ Sensor loaders  │       │
//! │  │ (time.csv) │   │            │   │ (aggregate per  │       │
//! │  └────────────┘   └────────────┘   │  bucket)        │       │
//! │                                    └─────────────────┘       │
//! │                                            │                 │
//! │                                            ▼                 │
//! │  ┌────────────┐   ┌────────────┐   ┌─────────────────┐       │
//! │  │  Features  │◀──│  Cleaner   │◀──│     Merge       │       │
//! │  └────────────┘   └────────────┘   └─────────────────┘       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use sensor_align::{pipeline, Config};
//! use std::path::Path;
//!
//! let config = Config::default();
//! let output = pipeline::preprocess_session(Path::new("data/session_1"), &config)?;
//! output.table.write_csv(Path::new("out/preprocessing.csv"))?;
//! # Ok::<(), sensor_align::PipelineError>(())
//! ```

pub mod batch;
pub mod config;
pub mod core;
pub mod error;
pub mod features;
pub mod pipeline;
pub mod report;
pub mod sensors;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use core::{AlignedTable, Frequency, Schedule, TimeMapper, Timeline};
pub use error::{PipelineError, Result};
pub use features::build_features;
pub use pipeline::{preprocess_session, SessionOutput};
pub use report::{RunLog, SessionReport, SharedRunLog};
pub use sensors::{SensorKind, SensorSource};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
