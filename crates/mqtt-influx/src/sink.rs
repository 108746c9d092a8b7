// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Storage side: records to Line Protocol batches.
//!
//! ```text
//! Records --> LineProtocolWriter --> BatchBuffer --> Vec<String> batches
//!                                          \--> WriteStats
//! ```
//!
//! The sink does NOT perform HTTP requests to InfluxDB. It produces
//! Line Protocol batches that can be sent via any HTTP client.

use crate::buffer::BatchBuffer;
use crate::config::OutputConfig;
use crate::influx::LineProtocolWriter;
use crate::parser::Records;
use crate::stats::WriteStats;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A storage failure, reported as `(topic, message)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to store '{topic}': {message}")]
pub struct StoreError {
    pub topic: String,
    pub message: String,
}

impl StoreError {
    pub fn new(topic: impl Into<String>, message: impl AsRef<str>) -> Self {
        Self {
            topic: topic.into(),
            message: message.as_ref().trim().to_string(),
        }
    }
}

/// Destination for parsed records.
pub trait RecordSink {
    /// Store every record of one message. `id` is only used for logging.
    fn store(
        &mut self,
        id: &dyn fmt::Display,
        topic: &str,
        records: &Records,
        timestamp_ns: u64,
    ) -> Result<(), StoreError>;
}

/// Sink producing batches of Line Protocol lines.
pub struct LineProtocolSink {
    writer: LineProtocolWriter,
    buffer: BatchBuffer,
    ready: Vec<Vec<String>>,
    stats: Arc<WriteStats>,
}

impl LineProtocolSink {
    pub fn new(config: &OutputConfig) -> Self {
        tracing::info!(
            "Line protocol sink: batch size {}, flush interval {} ms",
            config.batch_size,
            config.flush_interval_ms
        );
        Self {
            writer: LineProtocolWriter::new(),
            buffer: BatchBuffer::from_config(config),
            ready: Vec::new(),
            stats: Arc::new(WriteStats::new()),
        }
    }

    /// Shared handle to the write counters.
    pub fn stats(&self) -> Arc<WriteStats> {
        Arc::clone(&self.stats)
    }

    /// Take the batches that filled up since the last call, plus the
    /// pending batch if its flush interval has elapsed.
    pub fn take_ready(&mut self) -> Vec<Vec<String>> {
        if let Some(batch) = self.buffer.flush_if_due() {
            self.ready.push(batch);
        }
        let ready = std::mem::take(&mut self.ready);
        for batch in &ready {
            self.stats.finish(batch.len() as u64);
        }
        ready
    }

    /// Flush everything, ready batches first.
    pub fn flush_all(&mut self) -> Vec<String> {
        let mut lines: Vec<String> = self.ready.drain(..).flatten().collect();
        lines.extend(self.buffer.flush());
        self.stats.finish(lines.len() as u64);
        lines
    }

    /// Number of lines not yet handed out.
    pub fn pending(&self) -> usize {
        self.buffer.len() + self.ready.iter().map(Vec::len).sum::<usize>()
    }
}

impl RecordSink for LineProtocolSink {
    fn store(
        &mut self,
        id: &dyn fmt::Display,
        topic: &str,
        records: &Records,
        timestamp_ns: u64,
    ) -> Result<(), StoreError> {
        let mut first_error = None;

        for record in records.iter() {
            if let Err(e) = self.writer.write_record(record, timestamp_ns) {
                let err = StoreError::new(topic, e.to_string());
                tracing::error!("Fail to store message #{} ({}): {}", id, topic, err.message);
                self.stats.record_failure();
                first_error.get_or_insert(err);
            }
        }

        let lines = self.writer.flush();
        self.stats.begin(lines.len() as u64);
        for line in lines {
            if let Some(batch) = self.buffer.add(line) {
                self.ready.push(batch);
            }
        }

        tracing::trace!("Message #{} stored to '{}'", id, topic);

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
