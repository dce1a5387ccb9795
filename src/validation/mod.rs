//! Validator Module
//!
//! Mints and compares HTTP cache validators (`ETag`, `Last-Modified`).

mod etag;
mod headers;
pub mod http_date;

pub use etag::EtagStrategy;
pub use headers::ConditionalHeaders;
pub use http_date::{format_http_date, parse_http_date};
