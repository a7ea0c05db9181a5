//! Shared feedback pipeline domain primitives.
//!
//! This crate owns the message contract between the producer and consumer
//! handlers and the identifier clock. It intentionally excludes AWS SDK and
//! Lambda runtime concerns.

pub mod clock;
pub mod contract;
