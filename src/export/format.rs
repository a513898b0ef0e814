//! Cell formatting by column type

use chrono::{Local, TimeZone, Utc};
use serde_json::Value;
use std::fmt;

use crate::config::Settings;
use crate::models::dates::parse_timestamp;
use crate::models::{ColumnSpec, ColumnType, Contact};

/// A formatted spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Numeric value of the cell, when it holds one
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{}", n),
            Self::Empty => Ok(()),
        }
    }
}

/// Date/time rendering options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    pub date_format: String,
    pub datetime_format: String,
    /// Render timestamps in local time rather than UTC
    pub local_time: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d".to_string(),
            datetime_format: "%Y-%m-%d %H:%M".to_string(),
            local_time: false,
        }
    }
}

impl FormatOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            date_format: settings.date_format.clone(),
            datetime_format: settings.datetime_format.clone(),
            local_time: true,
        }
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Format a resolved value for a column
pub fn format_value(value: &Value, column: &ColumnSpec, options: &FormatOptions) -> CellValue {
    if is_empty_value(value) {
        return empty_cell(column);
    }
    match column.column_type {
        ColumnType::Date => format_date(value, options),
        ColumnType::Array => format_array(value),
        ColumnType::Boolean => CellValue::text(if is_truthy(value) { "Yes" } else { "No" }),
        ColumnType::Number => CellValue::Number(to_number(value)),
        ColumnType::Text => CellValue::text(to_text(value)),
    }
}

fn empty_cell(column: &ColumnSpec) -> CellValue {
    match (&column.default, column.column_type) {
        (Some(default), ColumnType::Number) => default
            .trim()
            .parse::<f64>()
            .map(CellValue::Number)
            .unwrap_or_else(|_| CellValue::text(default.clone())),
        (Some(default), _) => CellValue::text(default.clone()),
        (None, ColumnType::Number) => CellValue::Number(0.0),
        (None, ColumnType::Boolean) => CellValue::text("No"),
        (None, _) => CellValue::Empty,
    }
}

fn format_date(value: &Value, options: &FormatOptions) -> CellValue {
    let (parsed, has_time) = match value {
        Value::String(s) => (parse_timestamp(s), s.trim().len() > 10),
        Value::Number(n) => (
            n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
            true,
        ),
        _ => (None, false),
    };
    let Some(timestamp) = parsed else {
        return CellValue::text(to_text(value));
    };

    let pattern = if has_time {
        &options.datetime_format
    } else {
        &options.date_format
    };
    let rendered = if options.local_time && has_time {
        timestamp.with_timezone(&Local).format(pattern).to_string()
    } else {
        timestamp.format(pattern).to_string()
    };
    CellValue::text(rendered)
}

fn looks_like_contact(value: &Value) -> bool {
    value.as_object().is_some_and(|map| map.contains_key("name"))
}

fn format_array(value: &Value) -> CellValue {
    let Value::Array(items) = value else {
        return CellValue::text(to_text(value));
    };
    if items.iter().all(looks_like_contact) {
        let contacts: Vec<String> = items
            .iter()
            .filter_map(|item| serde_json::from_value::<Contact>(item.clone()).ok())
            .map(|contact| contact.to_string())
            .collect();
        return CellValue::text(contacts.join("; "));
    }
    CellValue::text(value.to_string())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "yes" | "y" | "1"
        ),
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

fn to_number(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(0.0)
}

/// Plain string coercion
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn column(column_type: ColumnType) -> ColumnSpec {
        ColumnSpec::new("field", "Field", column_type)
    }

    fn fmt(value: Value, column_type: ColumnType) -> CellValue {
        format_value(&value, &column(column_type), &FormatOptions::default())
    }

    #[test]
    fn test_boolean() {
        assert_eq!(fmt(json!(true), ColumnType::Boolean), CellValue::text("Yes"));
        assert_eq!(fmt(json!(false), ColumnType::Boolean), CellValue::text("No"));
        assert_eq!(fmt(json!("yes"), ColumnType::Boolean), CellValue::text("Yes"));
        assert_eq!(fmt(json!(""), ColumnType::Boolean), CellValue::text("No"));
    }

    #[test]
    fn test_number() {
        assert_eq!(fmt(json!(125000), ColumnType::Number), CellValue::Number(125000.0));
        assert_eq!(fmt(json!("1,250.50"), ColumnType::Number), CellValue::Number(1250.5));
        assert_eq!(fmt(json!("n/a"), ColumnType::Number), CellValue::Number(0.0));
        assert_eq!(fmt(json!(""), ColumnType::Number), CellValue::Number(0.0));
    }

    #[test]
    fn test_date() {
        assert_eq!(
            fmt(json!("2025-10-01T08:30:00.000Z"), ColumnType::Date),
            CellValue::text("2025-10-01 08:30")
        );
        assert_eq!(
            fmt(json!("2025-10-01"), ColumnType::Date),
            CellValue::text("2025-10-01")
        );
        assert_eq!(
            fmt(json!("sometime soon"), ColumnType::Date),
            CellValue::text("sometime soon")
        );
    }

    #[test]
    fn test_contacts_array() {
        let contacts = json!([
            {"name": "A", "role": "Matron", "phone": "0700"},
            {"name": "B"}
        ]);
        assert_eq!(
            fmt(contacts, ColumnType::Array),
            CellValue::text("A (Matron) - 0700; B")
        );
    }

    #[test]
    fn test_other_array_is_json() {
        assert_eq!(
            fmt(json!(["Ultrasound", "ECG"]), ColumnType::Array),
            CellValue::text(r#"["Ultrasound","ECG"]"#)
        );
    }

    #[test]
    fn test_text_coercion() {
        assert_eq!(fmt(json!("City"), ColumnType::Text), CellValue::text("City"));
        assert_eq!(fmt(json!(42), ColumnType::Text), CellValue::text("42"));
        assert_eq!(fmt(json!({"a": 1}), ColumnType::Text), CellValue::text(r#"{"a":1}"#));
    }

    #[test]
    fn test_empty_uses_default() {
        let col = ColumnSpec::new("status", "Status", ColumnType::Text).with_default("Pending");
        let opts = FormatOptions::default();
        assert_eq!(format_value(&json!(""), &col, &opts), CellValue::text("Pending"));
        assert_eq!(format_value(&Value::Null, &col, &opts), CellValue::text("Pending"));
        assert_eq!(
            format_value(&json!(""), &column(ColumnType::Text), &opts),
            CellValue::Empty
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::Number(3.0).to_string(), "3");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Empty.to_string(), "");
    }
}
