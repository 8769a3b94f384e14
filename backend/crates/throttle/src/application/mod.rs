//! Application Layer
//!
//! Lifecycle of the limiter: construction, periodic eviction, shutdown.

pub mod reaper;
pub mod service;
