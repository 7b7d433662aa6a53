//! Common types and utilities shared across seqslice crates.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::ByteRange;

/// Re-export commonly used external types
pub use bytes::Bytes;
