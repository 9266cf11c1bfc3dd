//! Time utilities.
//!
//! Timestamps are Unix seconds or milliseconds, produced here so the rest
//! of the code never reaches for `chrono` directly.

/// Returns the current Unix timestamp in seconds.
pub fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Returns the current Unix timestamp in milliseconds.
pub fn now_timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
