use std::sync::LazyLock;

use regex::Regex;
use time::{Duration, PrimitiveDateTime, format_description::FormatItem, macros::format_description};

const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2})[ T](\d{2}:\d{2}:\d{2})")
        .expect("timestamp regex must compile")
});

/// Parse the first `YYYY-MM-DD HH:MM:SS` timestamp found in `text`.
///
/// Sub-second suffixes such as `,123` are ignored. Returns `None` when no
/// timestamp-shaped text exists, and `Some(Err(..))` when one exists but is
/// not a valid calendar time.
pub(crate) fn find_timestamp(text: &str) -> Option<Result<PrimitiveDateTime, time::error::Parse>> {
    let captures = TIMESTAMP.captures(text)?;
    let normalized = format!("{} {}", &captures[1], &captures[2]);
    Some(PrimitiveDateTime::parse(&normalized, TIMESTAMP_FORMAT))
}

/// Render a duration as `HH:MM:SS`, with a leading `-` when negative.
pub fn format_duration(duration: Duration) -> String {
    let sign = if duration.is_negative() { "-" } else { "" };
    let total = duration.whole_seconds().unsigned_abs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{sign}{hours:02}:{minutes:02}:{seconds:02}")
}
