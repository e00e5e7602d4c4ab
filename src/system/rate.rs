//! Rate computation between two counter readings.
//!
//! Counters on a healthy device only ever grow. A decrease means the device
//! rebooted or a counter wrapped; that direction reads as zero for one cycle
//! and tracking resumes from the new baseline on the next one.

use crate::system::network::{Counters, RateSample, Snapshot};

/// Bytes per kilobyte (binary)
pub const BYTES_PER_KB: f64 = 1024.0;

/// Interval substituted when the elapsed time is zero or negative
pub const FALLBACK_ELAPSED_SECS: f64 = 1.0;

/// Compute upload/download rates in kB/s for `curr` read at `now` against `prev`.
pub fn compute(prev: &Snapshot, curr: &Counters, now: f64) -> RateSample {
    let mut elapsed = now - prev.timestamp;
    // First run, zeroed baseline or the clock stepped backwards
    if elapsed <= 0.0 || elapsed.is_nan() {
        elapsed = FALLBACK_ELAPSED_SECS;
    }

    RateSample {
        upload_kbps: kbps(curr.sent - prev.sent, elapsed),
        download_kbps: kbps(curr.recv - prev.recv, elapsed),
        timestamp: now,
    }
}

fn kbps(delta_bytes: f64, elapsed: f64) -> f64 {
    let rate = delta_bytes / elapsed / BYTES_PER_KB;
    if rate.is_finite() && rate > 0.0 {
        round2(rate)
    } else {
        0.0
    }
}

/// Two decimals, exact halves to even (0.125 -> 0.12, 0.375 -> 0.38)
fn round2(v: f64) -> f64 {
    (v * 100.0).round_ties_even() / 100.0
}
