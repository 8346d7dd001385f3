//
//  bitbucket-insights
//  util/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! # Utility Module
//!
//! Small helpers shared by the extractor, the history walker and the
//! console output.
//!
//! ## Categories
//!
//! - **Time Utilities**: [`millis_to_datetime`], [`format_date`], [`format_duration`]
//! - **String Utilities**: [`truncate`]
//!
//! ## Example
//!
//! ```rust
//! use bitbucket_insights::util::{millis_to_datetime, format_date};
//!
//! let created = millis_to_datetime(1_700_000_000_000).unwrap();
//! assert_eq!(format_date(&created), "2023-11-14");
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Converts a Bitbucket Server timestamp (Unix milliseconds) to UTC.
///
/// Returns `None` for values outside chrono's representable range.
pub fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// Converts a git timestamp (Unix seconds) to UTC.
pub fn seconds_to_datetime(seconds: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
}

/// Formats a timestamp as `YYYY-MM-DD`.
pub fn format_date(datetime: &DateTime<Utc>) -> String {
    datetime.format("%Y-%m-%d").to_string()
}

/// Formats a duration in human-readable form.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use bitbucket_insights::util::format_duration;
///
/// assert_eq!(format_duration(Duration::from_secs(45)), "45s");
/// assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
/// assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

/// Truncates a string to at most `max_len` characters, adding "..." when cut.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}
