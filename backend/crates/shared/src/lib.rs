//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the vocabulary every other crate speaks:
//! - Common error types and result aliases
//! - The JSON response envelope returned by every endpoint
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all crates.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod response;
