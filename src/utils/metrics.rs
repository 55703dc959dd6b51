//! Codec Metrics
//!
//! Counters for encode/decode throughput and registry resolution behaviour.
//!
//! Uses atomic counters so every codec instance can record into the shared
//! global collector without locking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Metrics collector for codec operations
#[derive(Debug)]
pub struct CodecMetrics {
    /// Records successfully encoded
    pub records_encoded: AtomicU64,
    /// Records successfully decoded
    pub records_decoded: AtomicU64,
    /// Bytes produced by encoders
    pub bytes_written: AtomicU64,
    /// Bytes consumed by decoders
    pub bytes_read: AtomicU64,
    /// Registry lookups answered without an ancestor walk
    pub registry_hits: AtomicU64,
    /// Lookups resolved by walking to an ancestor
    pub ancestor_resolutions: AtomicU64,
    /// Lookups with no handler anywhere in the chain
    pub lookup_failures: AtomicU64,
    pub encode_errors: AtomicU64,
    pub decode_errors: AtomicU64,
    start_time: Instant,
}

impl CodecMetrics {
    pub fn new() -> Self {
        Self {
            records_encoded: AtomicU64::new(0),
            records_decoded: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            bytes_read: AtomicU64::new(0),
            registry_hits: AtomicU64::new(0),
            ancestor_resolutions: AtomicU64::new(0),
            lookup_failures: AtomicU64::new(0),
            encode_errors: AtomicU64::new(0),
            decode_errors: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a completed encode
    pub fn record_encoded(&self, byte_count: u64) {
        self.records_encoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a completed decode
    pub fn record_decoded(&self, byte_count: u64) {
        self.records_decoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(byte_count, Ordering::Relaxed);
    }

    pub fn registry_hit(&self) {
        self.registry_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ancestor_resolution(&self) {
        self.ancestor_resolutions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn lookup_failure(&self) {
        self.lookup_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn encode_error(&self) {
        self.encode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> CodecMetricsSnapshot {
        CodecMetricsSnapshot {
            records_encoded: self.records_encoded.load(Ordering::Relaxed),
            records_decoded: self.records_decoded.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            registry_hits: self.registry_hits.load(Ordering::Relaxed),
            ancestor_resolutions: self.ancestor_resolutions.load(Ordering::Relaxed),
            lookup_failures: self.lookup_failures.load(Ordering::Relaxed),
            encode_errors: self.encode_errors.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            records_encoded = snapshot.records_encoded,
            records_decoded = snapshot.records_decoded,
            bytes_written = snapshot.bytes_written,
            bytes_read = snapshot.bytes_read,
            registry_hits = snapshot.registry_hits,
            ancestor_resolutions = snapshot.ancestor_resolutions,
            lookup_failures = snapshot.lookup_failures,
            encode_errors = snapshot.encode_errors,
            decode_errors = snapshot.decode_errors,
            uptime_seconds = snapshot.uptime_seconds,
            "Codec metrics snapshot"
        );
    }
}

impl Default for CodecMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodecMetricsSnapshot {
    pub records_encoded: u64,
    pub records_decoded: u64,
    pub bytes_written: u64,
    pub bytes_read: u64,
    pub registry_hits: u64,
    pub ancestor_resolutions: u64,
    pub lookup_failures: u64,
    pub encode_errors: u64,
    pub decode_errors: u64,
    pub uptime_seconds: u64,
}

static METRICS: once_cell::sync::Lazy<CodecMetrics> =
    once_cell::sync::Lazy::new(CodecMetrics::new);

/// Get the global metrics instance
pub fn global_metrics() -> &'static CodecMetrics {
    &METRICS
}

/// Logs the elapsed time of an operation when dropped
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        debug!(
            operation = self.operation,
            duration_us = duration.as_micros() as u64,
            "Operation completed"
        );
    }
}
