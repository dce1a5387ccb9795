//! Conditional Cache Module
//!
//! Conditional-GET orchestration on top of the expiring store: answers 304
//! when the client's validators match, otherwise serves or fills the entry.

mod cache;
mod flight;
mod outcome;

pub use cache::ConditionalCache;
pub use outcome::{Outcome, ValidatorHeaders};
