// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Write accounting for the storage side.
//!
//! Counts points handed to storage, points still in flight (buffered, not
//! yet flushed) and the in-flight high-water mark between two collections.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Shared write counters.
#[derive(Debug)]
pub struct WriteStats {
    total: AtomicU64,
    failed: AtomicU64,
    in_flight: AtomicU64,
    max_in_flight: AtomicU64,
    interval_begin: AtomicU64,
    created: Instant,
}

impl Default for WriteStats {
    fn default() -> Self {
        Self::new()
    }
}

impl WriteStats {
    pub fn new() -> Self {
        Self {
            total: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            in_flight: AtomicU64::new(0),
            max_in_flight: AtomicU64::new(0),
            interval_begin: AtomicU64::new(0),
            created: Instant::now(),
        }
    }

    /// Record `points` entering storage.
    pub fn begin(&self, points: u64) {
        self.total.fetch_add(points, Ordering::Relaxed);
        let current = self.in_flight.fetch_add(points, Ordering::Relaxed) + points;
        self.max_in_flight.fetch_max(current, Ordering::Relaxed);
    }

    /// Record `points` leaving storage (flushed or dropped).
    pub fn finish(&self, points: u64) {
        let _ = self
            .in_flight
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                Some(n.saturating_sub(points))
            });
    }

    /// Record a point that could not be stored.
    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Take a snapshot and start a new collection interval.
    ///
    /// The interval baseline moves to the current total and the high-water
    /// mark restarts from the current in-flight count.
    pub fn collect(&self) -> WriteStatsSnapshot {
        let total = self.total.load(Ordering::Relaxed);
        let begin = self.interval_begin.swap(total, Ordering::Relaxed);
        let max_concurrent = self
            .max_in_flight
            .swap(self.in_flight.load(Ordering::Relaxed), Ordering::Relaxed);

        WriteStatsSnapshot {
            total,
            interval: total.saturating_sub(begin),
            max_concurrent,
            failed: self.failed.load(Ordering::Relaxed),
            uptime_secs: self.created.elapsed().as_secs(),
        }
    }
}

/// Snapshot of write statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteStatsSnapshot {
    pub total: u64,
    pub interval: u64,
    pub max_concurrent: u64,
    pub failed: u64,
    pub uptime_secs: u64,
}

impl WriteStatsSnapshot {
    /// Calculate points per second over the whole uptime.
    pub fn points_per_second(&self) -> f64 {
        if self.uptime_secs > 0 {
            self.total as f64 / self.uptime_secs as f64
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_interval_and_total() {
        let stats = WriteStats::new();
        stats.begin(3);
        stats.finish(3);

        let first = stats.collect();
        assert_eq!(first.total, 3);
        assert_eq!(first.interval, 3);

        stats.begin(2);
        let second = stats.collect();
        assert_eq!(second.total, 5);
        assert_eq!(second.interval, 2);
    }

    #[test]
    fn test_stats_max_concurrent_resets_to_current() {
        let stats = WriteStats::new();
        stats.begin(4);
        stats.finish(3);
        assert_eq!(stats.in_flight(), 1);

        let snap = stats.collect();
        assert_eq!(snap.max_concurrent, 4);

        let snap = stats.collect();
        assert_eq!(snap.max_concurrent, 1);
        assert_eq!(snap.interval, 0);
    }

    #[test]
    fn test_stats_finish_saturates() {
        let stats = WriteStats::new();
        stats.finish(10);
        assert_eq!(stats.in_flight(), 0);
    }

    #[test]
    fn test_stats_failures() {
        let stats = WriteStats::new();
        stats.record_failure();
        stats.record_failure();
        assert_eq!(stats.collect().failed, 2);
    }
}
