//! Integration tests for session preprocessing

use chrono::NaiveDateTime;
use sensor_align::core::columns::{feature_columns, BAROMETER_X, HEART_RATE, PROXIMITY_DISTANCE};
use sensor_align::core::Aggregation;
use sensor_align::pipeline::{align_session, preprocess_session};
use sensor_align::sensors::{ClockSource, FieldSpec, SensorSource};
use sensor_align::{Config, Schedule, SessionReport, TimeMapper};
use std::fs;
use std::path::Path;

fn ts(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").expect("Failed to parse timestamp")
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create directory");
    }
    fs::write(path, content).expect("Failed to write file");
}

/// Two 5 s recording intervals with a 15 s pause between them.
fn write_schedule(dir: &Path) {
    write(
        &dir.join("meta/time.csv"),
        "event,experiment time,system time text\n\
         START,0.0,2024-01-01 00:00:00.000 UTC+01:00\n\
         PAUSE,5.0,2024-01-01 00:00:05.000 UTC+01:00\n\
         START,5.0,2024-01-01 00:00:20.000 UTC+01:00\n\
         PAUSE,10.0,2024-01-01 00:00:25.000 UTC+01:00\n",
    );
}

/// A phyphox-style export sampled at 2 Hz over 10 s of experiment time.
fn write_phyphox(dir: &Path, file: &str, headers: &[&str], base: f64) {
    let mut content = String::from("\"Time (s)\"");
    for header in headers {
        content.push_str(&format!(",\"{header}\""));
    }
    content.push('\n');
    for i in 0..20 {
        let offset = i as f64 * 0.5;
        content.push_str(&format!("{offset:.1}"));
        for (k, _) in headers.iter().enumerate() {
            content.push_str(&format!(",{}", base + offset + k as f64));
        }
        content.push('\n');
    }
    write(&dir.join(file), &content);
}

/// A complete synthetic session directory.
fn write_session(dir: &Path) {
    write_schedule(dir);

    let acceleration = ["X (m/s^2)", "Y (m/s^2)", "Z (m/s^2)", "Absolute acceleration (m/s^2)"];
    write_phyphox(dir, "Accelerometer.csv", &acceleration, 0.0);
    write_phyphox(dir, "Linear Accelerometer.csv", &acceleration, 10.0);
    write_phyphox(
        dir,
        "Gyroscope.csv",
        &["X (rad/s)", "Y (rad/s)", "Z (rad/s)", "Absolute (rad/s)"],
        20.0,
    );
    write_phyphox(
        dir,
        "Magnetometer.csv",
        &["X (µT)", "Y (µT)", "Z (µT)", "Absolute field (µT)"],
        30.0,
    );
    write_phyphox(dir, "Barometer.csv", &["X (hPa)"], 1000.0);
    write_phyphox(dir, "Proximity.csv", &["Distance (cm)"], 5.0);
    write_phyphox(
        dir,
        "Location.csv",
        &[
            "Latitude (°)",
            "Longitude (°)",
            "Height (m)",
            "Velocity (m/s)",
            "Direction (°)",
        ],
        50.0,
    );

    // Watch export: one reading per second, with one dropout.
    let mut heart = String::from("Date/Time,Min (count/min),Max (count/min),Avg (count/min)\n");
    for s in 0..=25 {
        if s == 2 {
            heart.push_str(&format!("2024-01-01 00:00:{s:02},,,\n"));
        } else {
            let bpm = 70 + s;
            heart.push_str(&format!("2024-01-01 00:00:{s:02},{bpm},{bpm},{bpm}\n"));
        }
    }
    write(&dir.join("Heart_rate.csv"), &heart);
}

#[test]
fn test_round_trip_mapping() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    write(
        &dir.path().join("meta/time.csv"),
        "event,experiment time,system time text\n\
         START,0,2024-01-01T00:00:00\n\
         PAUSE,10,2024-01-01T00:00:10\n\
         START,20,2024-01-01T00:01:00\n\
         PAUSE,30,2024-01-01T00:01:10\n",
    );

    let schedule = Schedule::load(dir.path()).expect("Failed to resolve schedule");
    assert_eq!(schedule.start(), ts("2024-01-01 00:00:00"));
    assert_eq!(schedule.end(), ts("2024-01-01 00:01:10"));

    let mapper = TimeMapper::new(schedule);
    assert_eq!(mapper.map_offset(25.0), Some(ts("2024-01-01 00:01:05")));
    assert_eq!(mapper.map_offset(15.0), None);
}

#[test]
fn test_preprocess_session_end_to_end() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    write_session(dir.path());

    let output = preprocess_session(dir.path(), &Config::default()).expect("Preprocessing failed");
    let table = &output.table;

    // Buckets 00:00:00-00:00:04 and 00:00:20-00:00:24 survive; the pause
    // and the trailing point are dropped as session gaps.
    assert_eq!(table.len(), 10);
    assert_eq!(table.time()[0], ts("2024-01-01 00:00:00"));
    assert_eq!(table.time()[5], ts("2024-01-01 00:00:20"));
    assert!(table.time().windows(2).all(|pair| pair[0] < pair[1]));

    let names: Vec<&str> = table.column_names().collect();
    assert_eq!(names.last().copied(), Some(HEART_RATE));
    assert!(table.column(PROXIMITY_DISTANCE).is_none());
    for name in feature_columns() {
        let column = table.column(name).expect("Missing feature column");
        assert!(column.iter().all(|v| v.is_some()), "{name} has nulls");
    }

    // Two samples per bucket: offsets 0.0 and 0.5, then 5.0 and 5.5.
    let barometer = table.column(BAROMETER_X).expect("Missing barometer");
    assert!((barometer[0].unwrap() - 1000.25).abs() < 1e-9);
    assert!((barometer[5].unwrap() - 1005.25).abs() < 1e-9);

    // Location keeps the last fix of the bucket.
    let latitude = table.column("Location_Latitude").expect("Missing latitude");
    assert!((latitude[0].unwrap() - 50.5).abs() < 1e-9);

    // The heart-rate dropout at 00:00:02 is interpolated from its neighbours.
    let heart = table.column(HEART_RATE).expect("Missing target");
    assert_eq!(heart[2], Some(72.0));
    assert_eq!(heart[5], Some(90.0));

    let report = &output.report;
    assert_eq!(report.intervals, 2);
    assert_eq!(report.timeline_len, 26);
    assert_eq!(report.sensors.len(), 8);
    assert_eq!(report.cleaning.gap_rows_dropped, 16);
    assert_eq!(report.cleaning.unlabeled_rows_dropped, 0);
    assert_eq!(report.rows, 10);

    // Preprocessing the cleaned output again changes nothing.
    let again = sensor_align::core::clean(table).expect("Cleaning failed");
    assert_eq!(&again, table);
}

#[test]
fn test_missing_sensor_file_aborts_session() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    write_session(dir.path());
    fs::remove_file(dir.path().join("Magnetometer.csv")).expect("Failed to remove file");

    let err = preprocess_session(dir.path(), &Config::default()).unwrap_err();
    assert!(err.to_string().contains("Magnetometer"));
}

#[test]
fn test_backwards_schedule_aborts_session() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    write_session(dir.path());
    write(
        &dir.path().join("meta/time.csv"),
        "event,experiment time,system time text\n\
         START,0,2024-01-01 00:00:10\n\
         PAUSE,10,2024-01-01 00:00:00\n",
    );

    let err = preprocess_session(dir.path(), &Config::default()).unwrap_err();
    assert!(err.to_string().contains("malformed schedule"));
}

#[test]
fn test_written_table_reads_back() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    write_session(dir.path());
    let output = preprocess_session(dir.path(), &Config::default()).expect("Preprocessing failed");

    let path = dir.path().join("out/preprocessing.csv");
    output.table.write_csv(&path).expect("Failed to write table");
    let header = fs::read_to_string(&path).expect("Failed to read table");
    assert!(header.starts_with("Time,Accelerometer_X,"));

    let read = sensor_align::AlignedTable::read_csv(&path).expect("Failed to read table");
    assert_eq!(read.len(), output.table.len());
    assert_eq!(read.time(), output.table.time());
}

const ALPHA_FIELDS: [FieldSpec; 2] = [FieldSpec::mean("X", "X"), FieldSpec::mean("Y", "Y")];
const BETA_FIELDS: [FieldSpec; 2] = [
    FieldSpec::mean("X", "X"),
    FieldSpec::new("Z", "Z", Aggregation::Max),
];
const GAMMA_FIELDS: [FieldSpec; 1] = [FieldSpec::new("Y", "Y", Aggregation::Median)];

/// A sensor declared outside the built-in catalog.
struct TestSensor {
    name: &'static str,
    fields: &'static [FieldSpec],
}

impl SensorSource for TestSensor {
    fn name(&self) -> &str {
        self.name
    }

    fn file_name(&self) -> &str {
        match self.name {
            "Alpha" => "alpha.csv",
            "Beta" => "beta.csv",
            _ => "gamma.csv",
        }
    }

    fn fields(&self) -> &[FieldSpec] {
        self.fields
    }

    fn clock(&self) -> ClockSource {
        ClockSource::ExperimentRelative { column: "Time (s)" }
    }
}

#[test]
fn test_three_sensors_on_five_buckets() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    write(
        &dir.path().join("meta/time.csv"),
        "event,experiment time,system time text\n\
         START,0,2024-01-01 00:00:00\n\
         PAUSE,5,2024-01-01 00:00:05\n",
    );
    // Alpha and Gamma cover every bucket; Beta has nothing in bucket 3.
    write(
        &dir.path().join("alpha.csv"),
        "Time (s),X,Y\n0.2,1,2\n1.2,1,2\n2.2,1,2\n3.2,1,2\n4.2,1,2\n",
    );
    write(
        &dir.path().join("beta.csv"),
        "Time (s),X,Z\n0.5,3,4\n1.5,3,4\n2.5,3,4\n4.5,3,4\n",
    );
    write(
        &dir.path().join("gamma.csv"),
        "Time (s),Y\n0.1,5\n1.1,5\n2.1,5\n3.1,5\n4.1,5\n",
    );

    let sensors = [
        TestSensor {
            name: "Alpha",
            fields: &ALPHA_FIELDS,
        },
        TestSensor {
            name: "Beta",
            fields: &BETA_FIELDS,
        },
        TestSensor {
            name: "Gamma",
            fields: &GAMMA_FIELDS,
        },
    ];
    let sources: Vec<&dyn SensorSource> = sensors.iter().map(|s| s as &dyn SensorSource).collect();

    let config = Config::default();
    let mut report = SessionReport::new(dir.path(), config.frequency);
    let merged = align_session(dir.path(), &sources, &config, &mut report).expect("Alignment failed");

    // 6 timeline points: 5 buckets plus the closing point.
    assert_eq!(merged.len(), 6);
    let names: Vec<&str> = merged.column_names().collect();
    assert_eq!(names, vec!["Alpha_X", "Alpha_Y", "Beta_X", "Beta_Z", "Gamma_Y"]);

    for column in merged.columns() {
        for bucket in 0..5 {
            let expect_null = bucket == 3 && column.name.starts_with("Beta_");
            assert_eq!(
                column.values[bucket].is_none(),
                expect_null,
                "{} at bucket {bucket}",
                column.name
            );
        }
        assert_eq!(column.values[5], None, "{} closing point", column.name);
    }
    assert_eq!(merged.column("Beta_Z").expect("Missing Beta_Z")[4], Some(4.0));
    assert_eq!(report.sensors[1].buckets_filled, 4);
}
