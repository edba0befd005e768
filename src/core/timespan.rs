//! Compact time-string notation used across the bot
//!
//! Durations are written as `<n>д <n>ч <n>м <n>с` (days/hours/minutes/
//! seconds), e.g. `"2ч30м"` or `"0д 0ч 1м"`. Parsing is forgiving: unknown
//! characters are skipped and a unit marker without digits contributes
//! nothing.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use crate::core::error::{DomainError, DomainResult};

pub const SECS_PER_MINUTE: u64 = 60;
pub const SECS_PER_HOUR: u64 = 3600;
pub const SECS_PER_DAY: u64 = 86400;

/// Parse a duration string like `"2ч30м"` into seconds.
///
/// Scans left to right accumulating digits; each unit marker multiplies the
/// pending number by its scale and adds it to the total. Returns 0 for an
/// empty or fully unrecognized string.
pub fn parse_time_string(time_str: &str) -> u64 {
    let time_str: String = time_str.to_lowercase().split_whitespace().collect();
    let mut total_seconds: u64 = 0;
    let mut current_num = String::new();

    for c in time_str.chars() {
        if c.is_ascii_digit() {
            current_num.push(c);
        } else {
            if !current_num.is_empty() {
                let num: u64 = current_num.parse().unwrap_or(0);
                match c {
                    'с' => total_seconds += num,
                    'м' => total_seconds += num * SECS_PER_MINUTE,
                    'ч' => total_seconds += num * SECS_PER_HOUR,
                    'д' => total_seconds += num * SECS_PER_DAY,
                    _ => {}
                }
            }
            current_num.clear();
        }
    }

    total_seconds
}

/// Decompose seconds into whole days, hours and minutes. The sub-minute
/// remainder is dropped.
pub fn parts_of(seconds: u64) -> (u64, u64, u64) {
    (
        seconds / SECS_PER_DAY,
        (seconds % SECS_PER_DAY) / SECS_PER_HOUR,
        (seconds % SECS_PER_HOUR) / SECS_PER_MINUTE,
    )
}

/// Format seconds as a human-readable `"{d}д {h}ч {m}м"` string.
///
/// Zero-valued components are omitted; the sub-minute remainder is dropped.
/// All-zero durations render as `"0сек"`.
pub fn format_time(seconds: u64) -> String {
    let (days, hours, minutes) = parts_of(seconds);

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}д"));
    }
    if hours > 0 {
        parts.push(format!("{hours}ч"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}м"));
    }

    if parts.is_empty() {
        "0сек".to_string()
    } else {
        parts.join(" ")
    }
}

/// Total seconds from a day/hour/minute triple. No range validation.
pub fn seconds_from_parts(days: u64, hours: u64, minutes: u64) -> u64 {
    days * SECS_PER_DAY + hours * SECS_PER_HOUR + minutes * SECS_PER_MINUTE
}

/// Canonical stored rendering of a day/hour/minute triple, zero components
/// included (`"0д 0ч 1м"`). This is the shape fixed subcategories persist.
pub fn canonical_parts(days: u64, hours: u64, minutes: u64) -> String {
    format!("{days}д {hours}ч {minutes}м")
}

/// Validate a structured day/hour/minute entry.
///
/// Inputs arrive signed from forms; negative values, hours above 23 and
/// minutes above 59 are rejected. Returns the triple as unsigned on success.
pub fn validate_parts(days: i64, hours: i64, minutes: i64) -> DomainResult<(u64, u64, u64)> {
    if days < 0 || hours < 0 || minutes < 0 {
        return Err(DomainError::Validation(
            "Время не может быть отрицательным!".to_string(),
        ));
    }
    if hours > 23 {
        return Err(DomainError::Validation(
            "Часы не могут быть больше 23!".to_string(),
        ));
    }
    if minutes > 59 {
        return Err(DomainError::Validation(
            "Минуты не могут быть больше 59!".to_string(),
        ));
    }
    Ok((days as u64, hours as u64, minutes as u64))
}
