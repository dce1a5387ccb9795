//! Response conversion for conditional outcomes and cache errors.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::conditional::Outcome;
use crate::error::CacheError;

impl<T: Serialize> IntoResponse for Outcome<T> {
    fn into_response(self) -> Response {
        match self {
            Outcome::NotModified => StatusCode::NOT_MODIFIED.into_response(),
            Outcome::Hit(entry) | Outcome::Miss(entry) => (
                StatusCode::OK,
                [
                    (header::ETAG, entry.etag().to_string()),
                    (header::LAST_MODIFIED, entry.last_modified_http()),
                ],
                Json(entry.data()),
            )
                .into_response(),
        }
    }
}

impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::CapacityExceeded(_) | CacheError::FillCancelled(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            CacheError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheEntry;
    use crate::validation::EtagStrategy;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_not_modified_response() {
        let response = Outcome::<Vec<u32>>::NotModified.into_response();

        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert!(response.headers().get(header::ETAG).is_none());
        assert!(response.headers().get(header::LAST_MODIFIED).is_none());

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_hit_response() {
        let entry = Arc::new(CacheEntry::new(vec![1u32, 2, 3], EtagStrategy::Random));
        let response = Outcome::Hit(entry.clone()).into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ETAG).unwrap(),
            entry.etag()
        );
        assert_eq!(
            response.headers().get(header::LAST_MODIFIED).unwrap(),
            entry.last_modified_http().as_str()
        );
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"[1,2,3]");
    }

    #[test]
    fn test_cache_error_response() {
        let response = CacheError::FillCancelled("VideoGames".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = CacheError::InvalidConfig("size_limit".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
