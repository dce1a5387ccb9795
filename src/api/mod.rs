//! API Module
//!
//! axum adapter for the conditional cache.
//!
//! # Types
//! - `ConditionalHeaders` extractor - reads `If-None-Match` / `If-Modified-Since`
//! - `Outcome<T>` response - 304 with no body, or 200 with JSON body and
//!   `ETag` / `Last-Modified` headers

mod extract;
mod response;
