use chrono::{DateTime, Utc};

/// Below this many remaining seconds the countdown is flagged urgent.
pub const URGENT_THRESHOLD_SECS: u32 = 300;

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// `mm:ss` rendering of a second count. Minutes are not capped at 59.
pub fn format_clock(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}
