// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Payload interpretation.
//!
//! - **static**: the raw payload is stored under one field
//! - **auto**: numbers go to the numeric field, anything else to the text field
//! - **mapFields**: the payload is JSON, flattened into dot-path fields

use crate::config::ParserConfig;
use crate::error::ParserError;
use crate::flatten::{nesting_depth, RecordFlattener, MAX_DEPTH};
use crate::numeric::NumericClassifier;
use crate::value::{FieldSet, FieldSets, FieldValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Raw message payload: text as received, or an already-structured document.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Json(Value),
}

impl Payload {
    /// Text form of the payload. JSON strings yield their content, other
    /// documents their compact serialization.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Payload::Text(s) => Cow::Borrowed(s),
            Payload::Json(Value::String(s)) => Cow::Borrowed(s),
            Payload::Json(value) => Cow::Owned(value.to_string()),
        }
    }

    /// Structured form of the payload, parsing text if needed.
    pub fn to_json(&self) -> Result<Cow<'_, Value>, ParserError> {
        match self {
            Payload::Text(s) => Ok(Cow::Owned(serde_json::from_str(s)?)),
            Payload::Json(value) => Ok(Cow::Borrowed(value)),
        }
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

/// Payload interpretation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PayloadMode {
    #[serde(rename = "static")]
    Static,
    #[default]
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "mapFields")]
    MapFields,
}

impl PayloadMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadMode::Static => "static",
            PayloadMode::Auto => "auto",
            PayloadMode::MapFields => "mapFields",
        }
    }
}

impl FromStr for PayloadMode {
    type Err = ParserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "static" => Ok(PayloadMode::Static),
            "auto" => Ok(PayloadMode::Auto),
            "mapFields" => Ok(PayloadMode::MapFields),
            other => Err(ParserError::UnknownPayloadMode(other.to_string())),
        }
    }
}

impl fmt::Display for PayloadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
enum Interpretation {
    Static {
        field: String,
    },
    Auto {
        classifier: NumericClassifier,
        numeric_field: String,
        text_field: String,
    },
    MapFields {
        flattener: RecordFlattener,
    },
}

/// Turns payloads into field sets according to a fixed mode.
///
/// Holds no mutable state; a single instance may serve many threads.
#[derive(Debug, Clone)]
pub struct PayloadInterpreter {
    interpretation: Interpretation,
}

impl PayloadInterpreter {
    /// Build an interpreter from configuration.
    ///
    /// Fails when the numeric policy cannot be built.
    pub fn new(config: &ParserConfig) -> Result<Self, ParserError> {
        let interpretation = match config.mode {
            PayloadMode::Static => Interpretation::Static {
                field: config.static_field.clone(),
            },
            PayloadMode::Auto => Interpretation::Auto {
                classifier: NumericClassifier::new(config.numeric_parser_mode)?,
                numeric_field: config.numeric_field.clone(),
                text_field: config.text_field.clone(),
            },
            PayloadMode::MapFields => Interpretation::MapFields {
                flattener: RecordFlattener::new(),
            },
        };
        Ok(Self { interpretation })
    }

    pub fn mode(&self) -> PayloadMode {
        match self.interpretation {
            Interpretation::Static { .. } => PayloadMode::Static,
            Interpretation::Auto { .. } => PayloadMode::Auto,
            Interpretation::MapFields { .. } => PayloadMode::MapFields,
        }
    }

    /// Interpret one payload. `id` is only used for log correlation.
    ///
    /// Only `mapFields` can fail: on malformed JSON, or on a structured
    /// payload nested deeper than [`MAX_DEPTH`].
    pub fn interpret(&self, id: impl fmt::Display, payload: &Payload) -> Result<FieldSets, ParserError> {
        match &self.interpretation {
            Interpretation::Static { field } => {
                let mut set = FieldSet::new();
                set.insert(field.as_str(), payload.as_text().into_owned());
                Ok(FieldSets::Single(set))
            }
            Interpretation::Auto {
                classifier,
                numeric_field,
                text_field,
            } => {
                let mut set = FieldSet::new();
                let number = match payload {
                    Payload::Json(Value::Number(n)) => n.as_f64(),
                    _ => classifier.classify(payload.as_text().trim()),
                };
                match number {
                    Some(num) => {
                        tracing::trace!("Message #{} payload is number", id);
                        set.insert(numeric_field.as_str(), FieldValue::Float(num));
                    }
                    None => {
                        tracing::trace!("Message #{} payload is text", id);
                        // untrimmed on purpose
                        set.insert(text_field.as_str(), payload.as_text().into_owned());
                    }
                }
                Ok(FieldSets::Single(set))
            }
            Interpretation::MapFields { flattener } => {
                tracing::trace!("Message #{} payload should be JSON", id);
                let document = payload.to_json()?;
                if let Payload::Json(value) = payload {
                    if nesting_depth(value) > MAX_DEPTH {
                        return Err(ParserError::TooDeep(MAX_DEPTH));
                    }
                }
                let fields = flattener.flatten_value(&document, "");
                if let FieldSets::Rows(rows) = &fields {
                    tracing::trace!("Message #{} payload fans out to {} rows", id, rows.len());
                }
                Ok(fields)
            }
        }
    }
}
