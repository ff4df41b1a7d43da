//! Common types and utilities shared by the WCS client crates.

pub mod bbox;
pub mod error;
pub mod time;

pub use bbox::BoundingBox;
pub use error::{WcsError, WcsResult};
pub use time::{TimeLimits, TimeRange};
