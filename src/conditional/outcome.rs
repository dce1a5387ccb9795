//! Outcome of a conditional lookup.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::cache::CacheEntry;

// == Outcome ==
/// What the transport layer should answer.
#[derive(Debug)]
pub enum Outcome<T> {
    /// Client validators matched a live entry: 304, no body, no validators
    NotModified,
    /// Live entry, validators did not match: 200 with the stored entry
    Hit(Arc<CacheEntry<T>>),
    /// No live entry: payload computed and stored, 200 with the new entry
    Miss(Arc<CacheEntry<T>>),
}

/// `ETag` and `Last-Modified` values to write on a 200 response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorHeaders {
    pub etag: String,
    pub last_modified: String,
}

impl<T> Outcome<T> {
    /// HTTP status for this outcome.
    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::NotModified => StatusCode::NOT_MODIFIED,
            Outcome::Hit(_) | Outcome::Miss(_) => StatusCode::OK,
        }
    }

    /// The entry to send as the body, if any.
    pub fn entry(&self) -> Option<&Arc<CacheEntry<T>>> {
        match self {
            Outcome::NotModified => None,
            Outcome::Hit(entry) | Outcome::Miss(entry) => Some(entry),
        }
    }

    /// Validators to set on the response; `None` for a 304.
    pub fn validator_headers(&self) -> Option<ValidatorHeaders> {
        self.entry().map(|entry| ValidatorHeaders {
            etag: entry.etag().to_string(),
            last_modified: entry.last_modified_http(),
        })
    }

    pub fn is_not_modified(&self) -> bool {
        matches!(self, Outcome::NotModified)
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, Outcome::Hit(_))
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, Outcome::Miss(_))
    }
}

impl<T> Clone for Outcome<T> {
    fn clone(&self) -> Self {
        match self {
            Outcome::NotModified => Outcome::NotModified,
            Outcome::Hit(entry) => Outcome::Hit(Arc::clone(entry)),
            Outcome::Miss(entry) => Outcome::Miss(Arc::clone(entry)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::EtagStrategy;

    #[test]
    fn test_not_modified_has_no_body_or_validators() {
        let outcome: Outcome<String> = Outcome::NotModified;

        assert_eq!(outcome.status(), StatusCode::NOT_MODIFIED);
        assert!(outcome.entry().is_none());
        assert!(outcome.validator_headers().is_none());
        assert!(outcome.is_not_modified());
    }

    #[test]
    fn test_hit_and_miss_carry_validators() {
        let entry = Arc::new(CacheEntry::new("games".to_string(), EtagStrategy::Random));

        for outcome in [Outcome::Hit(entry.clone()), Outcome::Miss(entry.clone())] {
            assert_eq!(outcome.status(), StatusCode::OK);

            let headers = outcome.validator_headers().unwrap();
            assert_eq!(headers.etag, entry.etag());
            assert_eq!(headers.last_modified, entry.last_modified_http());
        }
    }
}
