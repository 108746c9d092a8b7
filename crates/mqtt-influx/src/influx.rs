// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! InfluxDB Line Protocol rendering of records.
//!
//! Line Protocol format:
//! ```text
//! measurement,tag1=val1,tag2=val2 field1=val1,field2=val2 timestamp_ns
//! ```
//!
//! See: <https://docs.influxdata.com/influxdb/v2/reference/syntax/line-protocol/>

use crate::parser::Record;
use crate::value::FieldValue;
use serde_json::Value;
use thiserror::Error;

/// Reasons a record cannot be rendered.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LineProtocolError {
    #[error("measurement '{0}' has no fields")]
    NoFields(String),

    #[error("field '{0}' is not a finite number")]
    NonFinite(String),

    #[error("measurement name is empty")]
    EmptyMeasurement,

    #[error("measurement '{0}' has a field with an empty key")]
    EmptyFieldKey(String),
}

impl FieldValue {
    /// Format this value for InfluxDB Line Protocol.
    ///
    /// - Float: written as-is (e.g., `3.14`)
    /// - Integer: suffixed with `i` (e.g., `42i`)
    /// - String: quoted with double quotes, inner quotes escaped (e.g., `"hello"`)
    /// - Boolean: `true` or `false`
    /// - Array: its JSON text, quoted as a string
    pub fn to_line_protocol(&self) -> String {
        match self {
            FieldValue::Float(v) => format!("{}", v),
            FieldValue::Integer(v) => format!("{}i", v),
            FieldValue::String(v) => quote_string(v),
            FieldValue::Boolean(v) => {
                if *v {
                    "true".to_string()
                } else {
                    "false".to_string()
                }
            }
            FieldValue::Array(items) => quote_string(&Value::Array(items.clone()).to_string()),
        }
    }
}

/// Line Protocol writer.
///
/// Accumulates points in an internal buffer and produces Line Protocol strings
/// when flushed.
#[derive(Debug, Default)]
pub struct LineProtocolWriter {
    buffer: Vec<String>,
}

impl LineProtocolWriter {
    /// Create a new empty writer.
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Render a single record as one line.
    ///
    /// Tags are sorted by key; fields keep their record order.
    pub fn render(record: &Record, timestamp_ns: u64) -> Result<String, LineProtocolError> {
        if record.measurement.is_empty() {
            return Err(LineProtocolError::EmptyMeasurement);
        }
        if record.fields.is_empty() {
            return Err(LineProtocolError::NoFields(record.measurement.clone()));
        }

        let mut line = escape_measurement(&record.measurement);

        let mut sorted_tags: Vec<_> = record.tags.iter().collect();
        sorted_tags.sort_by(|(a, _), (b, _)| a.cmp(b));
        for (key, value) in sorted_tags {
            // InfluxDB rejects empty tag values
            if value.is_empty() {
                continue;
            }
            line.push(',');
            line.push_str(&escape_tag(key));
            line.push('=');
            line.push_str(&escape_tag(value));
        }

        line.push(' ');

        for (i, (key, value)) in record.fields.iter().enumerate() {
            if key.is_empty() {
                return Err(LineProtocolError::EmptyFieldKey(record.measurement.clone()));
            }
            if let FieldValue::Float(v) = value {
                if !v.is_finite() {
                    return Err(LineProtocolError::NonFinite(key.to_string()));
                }
            }
            if i > 0 {
                line.push(',');
            }
            line.push_str(&escape_tag(key));
            line.push('=');
            line.push_str(&value.to_line_protocol());
        }

        line.push(' ');
        line.push_str(&timestamp_ns.to_string());

        Ok(line)
    }

    /// Render and buffer a record.
    pub fn write_record(&mut self, record: &Record, timestamp_ns: u64) -> Result<(), LineProtocolError> {
        let line = Self::render(record, timestamp_ns)?;
        self.buffer.push(line);
        Ok(())
    }

    /// Flush the buffer, returning all accumulated lines.
    pub fn flush(&mut self) -> Vec<String> {
        std::mem::take(&mut self.buffer)
    }

    /// Get the current number of buffered lines.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

fn quote_string(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Spaces and commas must be escaped with backslash.
fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

/// Tag keys, tag values and field keys share the same rules:
/// commas, equals signs, and spaces must be escaped.
fn escape_tag(s: &str) -> String {
    s.replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}
