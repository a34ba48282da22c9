//! Column-oriented result table assembly.
//!
//! Result events are heterogeneous JSON records; the consuming visualization
//! layer wants a row-aligned table of typed columns. A column's type is fixed
//! by the first value observed for that field name and enforced on every
//! later append; a value that doesn't fit its column's type is skipped for
//! that event with a warning rather than failing the whole query. Columns a
//! field was absent from are padded so every column ends up with the same
//! length.

use chrono::{DateTime, TimeZone, Utc};
use cribl_search_config::constants::{SEARCH_TIME_FIELD, TIME_COLUMN_NAME};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

use crate::models::Event;

/// The scalar type of a column, inferred from the first value seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Number,
    Boolean,
    Timestamp,
}

/// A single typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
}

impl CellValue {
    fn column_type(&self) -> ColumnType {
        match self {
            Self::Text(_) => ColumnType::Text,
            Self::Number(_) => ColumnType::Number,
            Self::Boolean(_) => ColumnType::Boolean,
            Self::Timestamp(_) => ColumnType::Timestamp,
        }
    }
}

/// Typed value storage for one column. A `None` entry is a row where the
/// field was absent from the event.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Text(Vec<Option<String>>),
    Number(Vec<Option<f64>>),
    Boolean(Vec<Option<bool>>),
    Timestamp(Vec<Option<DateTime<Utc>>>),
}

impl ColumnValues {
    fn with_capacity_for(column_type: ColumnType, backfill: usize) -> Self {
        match column_type {
            ColumnType::Text => Self::Text(vec![None; backfill]),
            ColumnType::Number => Self::Number(vec![None; backfill]),
            ColumnType::Boolean => Self::Boolean(vec![None; backfill]),
            ColumnType::Timestamp => Self::Timestamp(vec![None; backfill]),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Text(v) => v.len(),
            Self::Number(v) => v.len(),
            Self::Boolean(v) => v.len(),
            Self::Timestamp(v) => v.len(),
        }
    }

    fn pad_to(&mut self, len: usize) {
        match self {
            Self::Text(v) => v.resize(len, None),
            Self::Number(v) => v.resize(len, None),
            Self::Boolean(v) => v.resize(len, None),
            Self::Timestamp(v) => v.resize(len, None),
        }
    }
}

/// A named, typed column with a length and (for numbers) running min/max.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    values: ColumnValues,
    min: Option<f64>,
    max: Option<f64>,
}

impl Column {
    fn new(name: String, column_type: ColumnType, backfill: usize) -> Self {
        Self {
            name,
            values: ColumnValues::with_capacity_for(column_type, backfill),
            min: None,
            max: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_type(&self) -> ColumnType {
        match &self.values {
            ColumnValues::Text(_) => ColumnType::Text,
            ColumnValues::Number(_) => ColumnType::Number,
            ColumnValues::Boolean(_) => ColumnType::Boolean,
            ColumnValues::Timestamp(_) => ColumnType::Timestamp,
        }
    }

    pub fn values(&self) -> &ColumnValues {
        &self.values
    }

    /// Running minimum across appended numeric values, if any.
    pub fn min(&self) -> Option<f64> {
        self.min
    }

    /// Running maximum across appended numeric values, if any.
    pub fn max(&self) -> Option<f64> {
        self.max
    }

    /// Append a value if it matches this column's type. Returns false on a
    /// type conflict, leaving the column untouched.
    fn try_push(&mut self, value: CellValue) -> bool {
        match (&mut self.values, value) {
            (ColumnValues::Text(v), CellValue::Text(s)) => {
                v.push(Some(s));
            }
            (ColumnValues::Number(v), CellValue::Number(n)) => {
                v.push(Some(n));
                self.min = Some(self.min.map_or(n, |m| m.min(n)));
                self.max = Some(self.max.map_or(n, |m| m.max(n)));
            }
            (ColumnValues::Boolean(v), CellValue::Boolean(b)) => {
                v.push(Some(b));
            }
            (ColumnValues::Timestamp(v), CellValue::Timestamp(t)) => {
                v.push(Some(t));
            }
            _ => return false,
        }
        true
    }
}

/// The finished, row-aligned table handed back to the caller.
#[derive(Debug, Clone, Default)]
pub struct ResultTable {
    columns: Vec<Column>,
    row_count: usize,
}

impl ResultTable {
    /// An empty table, used when there is nothing to run yet.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Incremental table assembly from per-event records.
#[derive(Debug, Default)]
pub struct TableBuilder {
    columns: Vec<Column>,
    index: HashMap<String, usize>,
    row_count: usize,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events accumulated so far.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Fold one event's fields into the table.
    pub fn add_event(&mut self, event: &Event) {
        for (field_name, value) in event {
            let Some((name, cell)) = convert_field(field_name, value) else {
                if !value.is_null() {
                    warn!(
                        field = %field_name,
                        "unable to add field: unsupported value type"
                    );
                }
                continue;
            };

            let column_idx = match self.index.get(name.as_ref()) {
                Some(&idx) => idx,
                None => {
                    // First time we've seen this field; backfill prior rows.
                    let column =
                        Column::new(name.clone().into_owned(), cell.column_type(), self.row_count);
                    self.columns.push(column);
                    let idx = self.columns.len() - 1;
                    self.index.insert(name.into_owned(), idx);
                    idx
                }
            };

            let column = &mut self.columns[column_idx];
            if !column.try_push(cell) {
                warn!(
                    field = %column.name,
                    "skipping field value: type conflicts with column established earlier"
                );
            }
        }
        self.row_count += 1;
    }

    /// Length-normalize and return the table. Fields that appeared in only
    /// some events are padded out to the full row count.
    pub fn finish(mut self) -> ResultTable {
        for column in &mut self.columns {
            column.values.pad_to(self.row_count);
        }
        ResultTable {
            columns: self.columns,
            row_count: self.row_count,
        }
    }
}

/// Map one event field to a column name and cell value.
///
/// The native time field is renamed to the canonical time column when its
/// value converts to a timestamp; otherwise it passes through untouched.
/// Object values are flattened to their JSON text since the sink cannot
/// represent nested structures. `None` means the field is unsupported for
/// this event (arrays, nulls).
fn convert_field<'a>(
    field_name: &'a str,
    value: &Value,
) -> Option<(std::borrow::Cow<'a, str>, CellValue)> {
    use std::borrow::Cow;

    if field_name == SEARCH_TIME_FIELD
        && let Some(timestamp) = seconds_to_timestamp(value)
    {
        return Some((Cow::Borrowed(TIME_COLUMN_NAME), CellValue::Timestamp(timestamp)));
    }

    let cell = match value {
        Value::String(s) => CellValue::Text(s.clone()),
        Value::Number(n) => CellValue::Number(n.as_f64()?),
        Value::Bool(b) => CellValue::Boolean(*b),
        Value::Object(_) => CellValue::Text(value.to_string()),
        Value::Array(_) | Value::Null => return None,
    };
    Some((Cow::Borrowed(field_name), cell))
}

/// Interpret a value as a count of epoch seconds and convert it to a UTC
/// timestamp with microsecond precision (fractional seconds rounded).
/// Numbers and numeric strings convert; anything else does not.
fn seconds_to_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let seconds = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !seconds.is_finite() {
        return None;
    }

    let mut whole = seconds.trunc() as i64;
    let mut micros = ((seconds - whole as f64) * 1_000_000.0).round() as i64;
    if micros >= 1_000_000 {
        whole += 1;
        micros -= 1_000_000;
    } else if micros < 0 {
        whole -= 1;
        micros += 1_000_000;
    }
    Utc.timestamp_opt(whole, (micros * 1_000) as u32).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: Value) -> Event {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_whole_seconds_convert_with_zero_subsecond() {
        let ts = seconds_to_timestamp(&json!(1728744793)).unwrap();
        assert_eq!(ts.timestamp(), 1728744793);
        assert_eq!(ts.timestamp_subsec_micros(), 0);
    }

    #[test]
    fn test_fractional_seconds_convert_to_microseconds() {
        let ts = seconds_to_timestamp(&json!(1728744793.123)).unwrap();
        assert_eq!(ts.timestamp_micros(), 1728744793123000);

        let ts = seconds_to_timestamp(&json!(1728744793.123456)).unwrap();
        assert_eq!(ts.timestamp_micros(), 1728744793123456);
    }

    #[test]
    fn test_numeric_string_converts() {
        let ts = seconds_to_timestamp(&json!("1728744793.5")).unwrap();
        assert_eq!(ts.timestamp_micros(), 1728744793500000);
    }

    #[test]
    fn test_non_numeric_values_do_not_convert() {
        assert_eq!(seconds_to_timestamp(&json!("whatever")), None);
        assert_eq!(seconds_to_timestamp(&json!(true)), None);
        assert_eq!(seconds_to_timestamp(&json!(null)), None);
    }

    #[test]
    fn test_time_field_renamed_to_canonical_column() {
        let mut builder = TableBuilder::new();
        builder.add_event(&event(json!({"_time": 1728744793, "host": "web-1"})));
        let table = builder.finish();

        assert!(table.column(TIME_COLUMN_NAME).is_some());
        assert!(table.column(SEARCH_TIME_FIELD).is_none());
        assert_eq!(
            table.column(TIME_COLUMN_NAME).unwrap().column_type(),
            ColumnType::Timestamp
        );
    }

    #[test]
    fn test_unconvertible_time_field_passes_through() {
        let mut builder = TableBuilder::new();
        builder.add_event(&event(json!({"_time": "high noon"})));
        let table = builder.finish();

        assert!(table.column(TIME_COLUMN_NAME).is_none());
        let column = table.column(SEARCH_TIME_FIELD).unwrap();
        assert_eq!(column.column_type(), ColumnType::Text);
    }

    #[test]
    fn test_object_values_flattened_to_json_text() {
        let mut builder = TableBuilder::new();
        builder.add_event(&event(json!({"meta": {"pod": "a", "zone": 3}})));
        let table = builder.finish();

        let column = table.column("meta").unwrap();
        assert_eq!(column.column_type(), ColumnType::Text);
        let ColumnValues::Text(values) = column.values() else {
            panic!("expected text column");
        };
        let text = values[0].as_ref().unwrap();
        let parsed: Value = serde_json::from_str(text).unwrap();
        assert_eq!(parsed, json!({"pod": "a", "zone": 3}));
    }

    #[test]
    fn test_type_conflict_skips_value_keeping_column() {
        let mut builder = TableBuilder::new();
        builder.add_event(&event(json!({"level": "info"})));
        builder.add_event(&event(json!({"level": 3})));
        let table = builder.finish();

        let column = table.column("level").unwrap();
        assert_eq!(column.column_type(), ColumnType::Text);
        // Conflicting value skipped; the row remains, padded with None.
        assert_eq!(column.len(), 2);
        let ColumnValues::Text(values) = column.values() else {
            panic!("expected text column");
        };
        assert_eq!(values[0].as_deref(), Some("info"));
        assert_eq!(values[1], None);
    }

    #[test]
    fn test_sparse_fields_padded_to_row_count() {
        let mut builder = TableBuilder::new();
        builder.add_event(&event(json!({"a": 1})));
        builder.add_event(&event(json!({"a": 2, "b": "late"})));
        builder.add_event(&event(json!({"a": 3})));
        let table = builder.finish();

        assert_eq!(table.row_count(), 3);
        for column in table.columns() {
            assert_eq!(column.len(), 3, "column {} not padded", column.name());
        }
        // "b" was absent for rows 0 and 2: backfilled and padded.
        let ColumnValues::Text(values) = table.column("b").unwrap().values() else {
            panic!("expected text column");
        };
        assert_eq!(values, &vec![None, Some("late".to_string()), None]);
    }

    #[test]
    fn test_numeric_min_max_tracked() {
        let mut builder = TableBuilder::new();
        builder.add_event(&event(json!({"bytes": 120.0})));
        builder.add_event(&event(json!({"bytes": 40.0})));
        builder.add_event(&event(json!({"bytes": 900.0})));
        let table = builder.finish();

        let column = table.column("bytes").unwrap();
        assert_eq!(column.min(), Some(40.0));
        assert_eq!(column.max(), Some(900.0));
    }

    #[test]
    fn test_null_and_array_values_skipped() {
        let mut builder = TableBuilder::new();
        builder.add_event(&event(json!({"tags": ["a", "b"], "gone": null, "ok": 1})));
        let table = builder.finish();

        assert!(table.column("tags").is_none());
        assert!(table.column("gone").is_none());
        assert!(table.column("ok").is_some());
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_empty_builder_finishes_empty_table() {
        let table = TableBuilder::new().finish();
        assert_eq!(table.row_count(), 0);
        assert!(table.columns().is_empty());
    }
}
