//! Conditional Request Headers
//!
//! Inbound `If-None-Match` / `If-Modified-Since` values and the two rules
//! that decide whether the client's copy is still valid.

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};

use super::http_date::parse_http_date;

// == Conditional Headers ==
/// Validators supplied by the client, empty values normalized to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionalHeaders {
    /// Raw `If-None-Match` value
    pub if_none_match: Option<String>,
    /// Raw `If-Modified-Since` value
    pub if_modified_since: Option<String>,
}

impl ConditionalHeaders {
    // == Constructors ==
    /// Creates headers from raw values; empty strings count as absent.
    pub fn new(if_none_match: Option<String>, if_modified_since: Option<String>) -> Self {
        Self {
            if_none_match: if_none_match.filter(|v| !v.is_empty()),
            if_modified_since: if_modified_since.filter(|v| !v.is_empty()),
        }
    }

    /// No validators (unconditional request).
    pub fn none() -> Self {
        Self::default()
    }

    /// Only an `If-None-Match` value.
    pub fn if_none_match(etag: impl Into<String>) -> Self {
        Self::new(Some(etag.into()), None)
    }

    /// Only an `If-Modified-Since` value.
    pub fn if_modified_since(date: impl Into<String>) -> Self {
        Self::new(None, Some(date.into()))
    }

    /// Extracts validators from a request's headers.
    ///
    /// Values that are not visible ASCII are ignored.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let read = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self::new(
            read(header::IF_NONE_MATCH),
            read(header::IF_MODIFIED_SINCE),
        )
    }

    // == ETag Rule ==
    /// True when `If-None-Match` is present and equals `etag` exactly.
    pub fn etag_matches(&self, etag: &str) -> bool {
        self.if_none_match.as_deref() == Some(etag)
    }

    // == Date Rule ==
    /// True when `If-Modified-Since` parses to a time at or after
    /// `last_modified`.
    ///
    /// `last_modified` keeps its sub-second part, so a date one fraction of
    /// a second earlier does not match. An unparseable date never matches.
    pub fn unmodified_since(&self, last_modified: &DateTime<Utc>) -> bool {
        self.if_modified_since
            .as_deref()
            .and_then(parse_http_date)
            .is_some_and(|since| since >= *last_modified)
    }

    /// Whether the client supplied any validator.
    pub fn is_conditional(&self) -> bool {
        self.if_none_match.is_some() || self.if_modified_since.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::format_http_date;
    use axum::http::HeaderValue;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_empty_values_are_absent() {
        let headers = ConditionalHeaders::new(Some(String::new()), Some(String::new()));
        assert_eq!(headers, ConditionalHeaders::none());
        assert!(!headers.is_conditional());
        assert!(!headers.etag_matches(""));
    }

    #[test]
    fn test_from_header_map() {
        let mut map = HeaderMap::new();
        map.insert(header::IF_NONE_MATCH, HeaderValue::from_static("\"abc\""));
        map.insert(
            header::IF_MODIFIED_SINCE,
            HeaderValue::from_static("Sun, 06 Nov 1994 08:49:37 GMT"),
        );

        let headers = ConditionalHeaders::from_headers(&map);
        assert_eq!(headers.if_none_match.as_deref(), Some("\"abc\""));
        assert_eq!(
            headers.if_modified_since.as_deref(),
            Some("Sun, 06 Nov 1994 08:49:37 GMT")
        );
        assert!(headers.is_conditional());
    }

    #[test]
    fn test_etag_exact_match_only() {
        let headers = ConditionalHeaders::if_none_match("\"abc\"");
        assert!(headers.etag_matches("\"abc\""));
        assert!(!headers.etag_matches("abc"));
        assert!(!headers.etag_matches("\"ABC\""));
    }

    #[test]
    fn test_unmodified_since_exact_second() {
        let last_modified = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let headers = ConditionalHeaders::if_modified_since(format_http_date(&last_modified));

        assert!(headers.unmodified_since(&last_modified));
    }

    #[test]
    fn test_unmodified_since_keeps_subseconds() {
        // Formatting drops the 500ms, leaving a date before last_modified
        let last_modified =
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + Duration::milliseconds(500);
        let echoed = ConditionalHeaders::if_modified_since(format_http_date(&last_modified));
        assert!(!echoed.unmodified_since(&last_modified));

        let next_second = last_modified + Duration::milliseconds(500);
        assert!(ConditionalHeaders::if_modified_since(format_http_date(&next_second))
            .unmodified_since(&last_modified));
    }

    #[test]
    fn test_unmodified_since_later_and_earlier() {
        let last_modified = Utc::now();

        let later = last_modified + Duration::seconds(60);
        assert!(ConditionalHeaders::if_modified_since(format_http_date(&later))
            .unmodified_since(&last_modified));

        let earlier = last_modified - Duration::seconds(60);
        assert!(!ConditionalHeaders::if_modified_since(format_http_date(&earlier))
            .unmodified_since(&last_modified));
    }

    #[test]
    fn test_unparseable_date_never_matches() {
        let headers = ConditionalHeaders::if_modified_since("not-a-date");
        assert!(!headers.unmodified_since(&Utc::now()));
    }
}
