//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Client identification from untrusted request metadata
//! - Rate limiting configuration, decisions and header names

pub mod client;
pub mod rate_limit;
