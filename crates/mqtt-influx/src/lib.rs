// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! MQTT to InfluxDB record bridge.
//!
//! Normalizes `(topic, payload)` telemetry messages into time-series records
//! (measurement, tags, fields).
//!
//! # Features
//!
//! - **Topic decomposition**: `a/b/c` becomes measurement `a` with tags
//!   `topic`, `tp0`, `tp1`, `tp2`
//! - **Payload modes**: `static`, `auto` (numeric detection) and `mapFields`
//!   (JSON flattening)
//! - **Fan-out**: arrays of objects in JSON payloads yield one record per row
//! - **Line Protocol output**: batching and write statistics
//!
//! # Overview
//!
//! ```text
//! (topic, payload) --> MessageParser --> Records --> LineProtocolSink --> Vec<String>
//! ```
//!
//! # Quick Start
//!
//! ```
//! use mqtt_influx::{MessageParser, ParserConfig, PayloadMode};
//!
//! let parser = MessageParser::new(&ParserConfig::default().mode(PayloadMode::MapFields))?;
//! let payload = r#"{"cpu": {"load": 0.5}, "disks": [{"id": "a"}, {"id": "b"}]}"#;
//! let records = parser.parse(1, "host/server1", &payload.into())?.expect("non-empty topic");
//! assert_eq!(records.len(), 2);
//! # Ok::<(), mqtt_influx::ParserError>(())
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod flatten;
pub mod influx;
pub mod numeric;
pub mod parser;
pub mod payload;
pub mod sink;
pub mod stats;
pub mod topic;
pub mod value;

pub use config::{BridgeConfig, ConfigError, OutputConfig, ParserConfig};
pub use error::ParserError;
pub use flatten::{nesting_depth, RecordFlattener, MAX_DEPTH};
pub use influx::{LineProtocolError, LineProtocolWriter};
pub use numeric::{NumericClassifier, NumericMode};
pub use parser::{assemble, MessageParser, Record, Records};
pub use payload::{Payload, PayloadInterpreter, PayloadMode};
pub use sink::{LineProtocolSink, RecordSink, StoreError};
pub use stats::{WriteStats, WriteStatsSnapshot};
pub use topic::ParsedTopic;
pub use value::{FieldSet, FieldSets, FieldValue};
