// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message parser: topic + payload to records.
//!
//! ```text
//! (topic, payload) --> ParsedTopic        (measurement, tags)
//!                  --> PayloadInterpreter (one or many field sets)
//!                  --> assemble           (one record, or one per row)
//! ```

use crate::config::ParserConfig;
use crate::error::ParserError;
use crate::payload::{Payload, PayloadInterpreter, PayloadMode};
use crate::topic::ParsedTopic;
use crate::value::{FieldSet, FieldSets};
use std::fmt;

/// A time-series record ready for storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub measurement: String,
    pub tags: Vec<(String, String)>,
    pub fields: FieldSet,
}

impl Record {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Records produced by one message.
#[derive(Debug, Clone, PartialEq)]
pub enum Records {
    Single(Record),
    /// One record per fan-out row, sharing measurement and tags.
    FanOut(Vec<Record>),
}

impl Records {
    pub fn len(&self) -> usize {
        match self {
            Records::Single(_) => 1,
            Records::FanOut(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        match self {
            Records::Single(record) => std::slice::from_ref(record).iter(),
            Records::FanOut(records) => records.iter(),
        }
    }

    pub fn into_vec(self) -> Vec<Record> {
        match self {
            Records::Single(record) => vec![record],
            Records::FanOut(records) => records,
        }
    }
}

/// Combine a topic with interpreted payload fields.
///
/// Returns `None` when the topic is empty after normalization.
pub fn assemble(topic: &str, fields: FieldSets) -> Option<Records> {
    let parsed = ParsedTopic::parse(topic)?;
    Some(assemble_parsed(parsed, fields))
}

fn assemble_parsed(parsed: ParsedTopic, fields: FieldSets) -> Records {
    let ParsedTopic { measurement, tags } = parsed;
    match fields {
        FieldSets::Single(fields) => Records::Single(Record {
            measurement,
            tags,
            fields,
        }),
        FieldSets::Rows(rows) => Records::FanOut(
            rows.into_iter()
                .map(|fields| Record {
                    measurement: measurement.clone(),
                    tags: tags.clone(),
                    fields,
                })
                .collect(),
        ),
    }
}

/// Turns `(id, topic, payload)` messages into records.
///
/// Configuration is resolved once in [`MessageParser::new`]; parsing keeps no
/// state between calls and imposes no ordering across messages.
#[derive(Debug, Clone)]
pub struct MessageParser {
    interpreter: PayloadInterpreter,
}

impl MessageParser {
    pub fn new(config: &ParserConfig) -> Result<Self, ParserError> {
        Ok(Self {
            interpreter: PayloadInterpreter::new(config)?,
        })
    }

    pub fn mode(&self) -> PayloadMode {
        self.interpreter.mode()
    }

    /// Parse one message.
    ///
    /// `Ok(None)` means the topic is empty and the message should be skipped;
    /// its payload is not examined, unlike a payload-first pipeline where
    /// malformed JSON on an empty topic would still be reported. `Err` only arises from a malformed JSON
    /// payload and never affects later messages.
    pub fn parse(
        &self,
        id: impl fmt::Display,
        topic: &str,
        payload: &Payload,
    ) -> Result<Option<Records>, ParserError> {
        let Some(parsed) = ParsedTopic::parse(topic) else {
            tracing::debug!("Message #{} has empty topic, skipped", id);
            return Ok(None);
        };
        let fields = self.interpreter.interpret(&id, payload)?;
        Ok(Some(assemble_parsed(parsed, fields)))
    }

    /// Interpret a payload on its own.
    pub fn parse_payload(
        &self,
        id: impl fmt::Display,
        payload: &Payload,
    ) -> Result<FieldSets, ParserError> {
        self.interpreter.interpret(id, payload)
    }
}
