//! Time-related utilities with clock abstraction for testability.

use chrono::{DateTime, FixedOffset, Utc};

/// JST is UTC+9
const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get current Unix timestamp (seconds)
    fn now_unix_secs(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_secs(&self) -> i64 {
        get_unix_timestamp()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: i64,
}

impl FixedClock {
    /// Create a new fixed clock with the given timestamp
    pub fn new(fixed_time_secs: i64) -> Self {
        Self {
            fixed_time: fixed_time_secs,
        }
    }
}

impl Clock for FixedClock {
    fn now_unix_secs(&self) -> i64 {
        self.fixed_time
    }
}

/// Get current Unix timestamp (seconds)
pub fn get_unix_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// Convert Unix timestamp (seconds) to JST RFC 3339 format
///
/// Out-of-range timestamps are rendered as the raw number.
pub fn timestamp_to_jst_rfc3339(timestamp_secs: i64) -> String {
    let Some(utc) = DateTime::<Utc>::from_timestamp(timestamp_secs, 0) else {
        return timestamp_secs.to_string();
    };

    match FixedOffset::east_opt(JST_OFFSET_SECS) {
        Some(jst) => utc.with_timezone(&jst).to_rfc3339(),
        None => utc.to_rfc3339(),
    }
}
