//! Display formatting for history entries: coin amounts with thousands
//! separators, abbreviated stack sizes, and capture timestamps.

use crate::model::{HistoryEntry, TimestampMs};
use chrono::{TimeZone, Utc};

/// Formats a coin amount with thousands separators, e.g. `1234567` ->
/// `"1,234,567"`.
pub fn format_coins(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Formats a quantity the way item stacks are abbreviated in-game:
/// verbatim below 100K, then truncated to K/M/B.
pub fn format_stack(value: i64) -> String {
    let magnitude = value.abs();
    if magnitude < 100_000 {
        value.to_string()
    } else if magnitude < 10_000_000 {
        format!("{}K", value / 1_000)
    } else if magnitude < 10_000_000_000 {
        format!("{}M", value / 1_000_000)
    } else {
        format!("{}B", value / 1_000_000_000)
    }
}

/// `"%Y-%m-%d %H:%M:%S"` in UTC, matching the history panel's time label.
pub fn format_timestamp(ts: TimestampMs) -> String {
    match Utc.timestamp_millis_opt(ts).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "invalid time".to_string(),
    }
}

impl HistoryEntry {
    /// The entry's display lines: item, total, unit price, capture time.
    pub fn summary(&self) -> Vec<String> {
        vec![
            format!("{} x {}", self.quantity, self.item.name),
            format!("{} coins", format_coins(self.total)),
            format!("= {} each", format_coins(self.price)),
            format_timestamp(self.timestamp_ms),
        ]
    }
}
