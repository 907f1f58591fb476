//! Units formatting and conversion utilities
//!
//! Only used for log lines; the result line keeps its exact
//! `<seconds>.<nanoseconds>` form.

use std::time::Duration;

use byte_unit::{Byte, UnitType};

/// Format bytes with binary units
///
/// # Examples
/// ```
/// use syncbench::util::units::format_bytes;
///
/// assert!(format_bytes(40960).ends_with("KiB"));
/// ```
pub fn format_bytes(bytes: u64) -> String {
    let adjusted = Byte::from_u64(bytes).get_appropriate_unit(UnitType::Binary);
    format!("{:.1}", adjusted)
}

/// Format a duration as `1s 500ms` style text
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use syncbench::util::units::format_elapsed;
///
/// assert_eq!(format_elapsed(Duration::from_millis(1500)), "1s 500ms");
/// ```
pub fn format_elapsed(duration: Duration) -> String {
    humantime::format_duration(duration).to_string()
}

/// Calculate throughput in MiB/s from bytes and duration
pub fn calculate_throughput_mbps(bytes: u64, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 0.0;
    }

    let megabytes = bytes as f64 / 1_048_576.0;
    megabytes / duration.as_secs_f64()
}

/// Calculate synchronous appends per second
pub fn calculate_iops(operations: u64, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 0.0;
    }

    operations as f64 / duration.as_secs_f64()
}
