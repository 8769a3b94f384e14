//! Presentation Layer
//!
//! HTTP-facing admission adapter.

pub mod middleware;
