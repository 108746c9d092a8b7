// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Batching buffer for Line Protocol lines.
//!
//! Accumulates lines and hands out a batch either when the batch is full or
//! when the configured time interval has elapsed.

use crate::config::OutputConfig;
use std::time::{Duration, Instant};

/// A batching buffer that collects Line Protocol strings.
#[derive(Debug)]
pub struct BatchBuffer {
    lines: Vec<String>,
    max_size: usize,
    flush_interval: Duration,
    last_flush: Instant,
}

impl BatchBuffer {
    /// Create a new batch buffer.
    ///
    /// A `max_size` of 0 is treated as 1.
    pub fn new(max_size: usize, flush_interval: Duration) -> Self {
        let max_size = max_size.max(1);
        Self {
            lines: Vec::with_capacity(max_size),
            max_size,
            flush_interval,
            last_flush: Instant::now(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(
            config.batch_size,
            Duration::from_millis(config.flush_interval_ms),
        )
    }

    /// Add a line to the buffer.
    ///
    /// Returns `Some(batch)` if the buffer is now full, or `None` if there
    /// is still room.
    pub fn add(&mut self, line: String) -> Option<Vec<String>> {
        self.lines.push(line);
        if self.lines.len() >= self.max_size {
            Some(self.flush())
        } else {
            None
        }
    }

    /// Check if a time-based flush is due.
    pub fn should_flush(&self) -> bool {
        !self.lines.is_empty() && self.last_flush.elapsed() >= self.flush_interval
    }

    /// Flush only when the interval has elapsed.
    pub fn flush_if_due(&mut self) -> Option<Vec<String>> {
        self.should_flush().then(|| self.flush())
    }

    /// Flush the buffer, returning all accumulated lines and resetting the timer.
    pub fn flush(&mut self) -> Vec<String> {
        self.last_flush = Instant::now();
        std::mem::replace(&mut self.lines, Vec::with_capacity(self.max_size))
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
