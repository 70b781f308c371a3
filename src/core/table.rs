//! Time-indexed columnar table.
//!
//! Used both for the per-sensor aggregation output and for the session-wide
//! aligned table. Cells are `Option<f64>`; `None` is the null marker.

use crate::core::clock::{format_wall_clock, parse_wall_clock};
use crate::core::columns::TIME;
use crate::error::{PipelineError, Result};
use chrono::NaiveDateTime;
use std::io::Write;
use std::path::Path;

/// A named column of nullable values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Rows keyed by a timestamp, one column per field.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedTable {
    time: Vec<NaiveDateTime>,
    columns: Vec<Column>,
}

impl AlignedTable {
    /// An empty table over the given row index.
    pub fn new(time: Vec<NaiveDateTime>) -> Self {
        Self {
            time,
            columns: Vec::new(),
        }
    }

    /// Add a column; its length must match the row index and its name must be new.
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if column.values.len() != self.time.len() {
            return Err(PipelineError::Invariant(format!(
                "column '{}' has {} rows but the table has {}",
                column.name,
                column.values.len(),
                self.time.len()
            )));
        }
        if column.name == TIME || self.column(&column.name).is_some() {
            return Err(PipelineError::Invariant(format!(
                "duplicate column '{}'",
                column.name
            )));
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn time(&self) -> &[NaiveDateTime] {
        &self.time
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Like [`column`](Self::column) but a missing column is a schema error.
    pub fn require_column(&self, name: &str, context: &str) -> Result<&[Option<f64>]> {
        self.column(name)
            .ok_or_else(|| PipelineError::schema(name, context))
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Keep the rows for which `keep(row)` holds.
    pub fn filter_rows(&self, keep: impl Fn(usize) -> bool) -> Self {
        let rows: Vec<usize> = (0..self.len()).filter(|&row| keep(row)).collect();
        Self {
            time: rows.iter().map(|&r| self.time[r]).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), rows.iter().map(|&r| c.values[r]).collect()))
                .collect(),
        }
    }

    /// A copy without the named column; unchanged when it is absent.
    pub fn without_column(&self, name: &str) -> Self {
        Self {
            time: self.time.clone(),
            columns: self
                .columns
                .iter()
                .filter(|c| c.name != name)
                .cloned()
                .collect(),
        }
    }

    /// Split off a column, returning the rest of the table and the column.
    pub fn take_column(mut self, name: &str) -> (Self, Option<Column>) {
        let taken = self
            .columns
            .iter()
            .position(|c| c.name == name)
            .map(|idx| self.columns.remove(idx));
        (self, taken)
    }

    /// Write as CSV with a leading `Time` column; nulls become empty cells.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }
        let file = std::fs::File::create(path).map_err(|e| PipelineError::io(path, e))?;
        self.write_to(file).map_err(|e| PipelineError::csv(path, e))
    }

    /// Write as CSV to any writer.
    pub fn write_to<W: Write>(&self, writer: W) -> std::result::Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(writer);

        let mut header = vec![TIME.to_string()];
        header.extend(self.columns.iter().map(|c| c.name.clone()));
        writer.write_record(&header)?;

        for (row, t) in self.time.iter().enumerate() {
            let mut record = Vec::with_capacity(self.columns.len() + 1);
            record.push(format_wall_clock(t));
            record.extend(
                self.columns
                    .iter()
                    .map(|c| c.values[row].map(|v| v.to_string()).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Read a table previously written by [`write_csv`](Self::write_csv).
    pub fn read_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| PipelineError::csv(path, e))?;

        let headers = reader
            .headers()
            .map_err(|e| PipelineError::csv(path, e))?
            .clone();
        let time_idx = headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == TIME)
            .ok_or_else(|| PipelineError::schema(TIME, path.display().to_string()))?;

        let names: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|&(idx, _)| idx != time_idx)
            .map(|(idx, name)| (idx, name.to_string()))
            .collect();

        let mut time = Vec::new();
        let mut values: Vec<Vec<Option<f64>>> = vec![Vec::new(); names.len()];
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| PipelineError::csv(path, e))?;
            let invalid = |column: &str, value: &str| PipelineError::InvalidValue {
                path: path.to_path_buf(),
                column: column.to_string(),
                record: i as u64 + 1,
                value: value.to_string(),
            };

            let raw_time = record.get(time_idx).unwrap_or_default();
            time.push(parse_wall_clock(raw_time).ok_or_else(|| invalid(TIME, raw_time))?);

            for (slot, (idx, name)) in values.iter_mut().zip(&names) {
                let raw = record.get(*idx).unwrap_or_default();
                slot.push(parse_cell(raw).map_err(|_| invalid(name.as_str(), raw))?);
            }
        }

        let mut table = Self::new(time);
        for ((_, name), values) in names.into_iter().zip(values) {
            table.push_column(Column::new(name, values))?;
        }
        Ok(table)
    }
}

/// Parse one numeric cell: empty text and `NaN` are null.
pub fn parse_cell(raw: &str) -> std::result::Result<Option<f64>, std::num::ParseFloatError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value: f64 = raw.parse()?;
    Ok(value.is_finite().then_some(value))
}
