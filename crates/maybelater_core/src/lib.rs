//! MAYBELATER Core Types
//!
//! This crate contains pure types with no I/O: runtime values,
//! wall-clock timestamps and the shared error type.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod time;
pub mod value;

// Re-exports
pub use error::{CoreError, CoreResult};
pub use time::{Duration, Timestamp};
pub use value::{Bindings, Value};
