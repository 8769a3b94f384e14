//! Domain Layer
//!
//! In-memory rate limiting state. Nothing here performs I/O or fails.

pub mod limiter;
pub(crate) mod lock_order;
pub mod tracker;
