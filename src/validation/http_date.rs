//! HTTP Date Utilities
//!
//! Formats `Last-Modified` values as RFC 7231 IMF-fixdate and parses inbound
//! `If-Modified-Since` values in any of the historically accepted forms.

use chrono::{DateTime, NaiveDateTime, Utc};

/// IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
/// Obsolete RFC 850 form, e.g. `Sunday, 06-Nov-94 08:49:37 GMT`
const RFC_850: &str = "%A, %d-%b-%y %H:%M:%S GMT";
/// ANSI C asctime() form, e.g. `Sun Nov  6 08:49:37 1994`
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

/// Formats a timestamp as an HTTP date.
pub fn format_http_date(time: &DateTime<Utc>) -> String {
    time.format(IMF_FIXDATE).to_string()
}

/// Parses an HTTP date.
///
/// Tries IMF-fixdate, RFC 850 and asctime first, then RFC 2822 and RFC 3339
/// for lenient clients. Returns `None` for anything unrecognized; callers
/// treat that as an absent header.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    for format in [IMF_FIXDATE, RFC_850, ASCTIME] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
