use jiff::civil::DateTime;
use jiff::{Timestamp, tz::TimeZone};

/// Format an article/status timestamp for display, e.g.
/// "August 30, 2026 14:05".
///
/// Article dates arrive as RFC 3339 instants (`2026-08-30T14:05:00Z`) while
/// the status endpoint emits a naive ISO datetime with no offset; both are
/// accepted. Anything unparseable is shown verbatim rather than dropped.
pub fn format_fetch_time(raw: &str) -> String {
    const DISPLAY: &str = "%B %d, %Y %H:%M";

    if let Ok(ts) = raw.parse::<Timestamp>() {
        return ts.to_zoned(TimeZone::UTC).strftime(DISPLAY).to_string();
    }
    if let Ok(dt) = raw.parse::<DateTime>() {
        return dt.strftime(DISPLAY).to_string();
    }
    raw.to_string()
}
