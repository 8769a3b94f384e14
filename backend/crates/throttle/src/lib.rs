//! Admission control for the statistics API
//!
//! Layered the same way as the other feature crates:
//! - `domain/` - per-client sliding windows and the client map
//! - `application/` - the background reaper and the service lifecycle
//! - `presentation/` - the axum middleware that admits or rejects requests
//!
//! ## Concurrency Model
//! - One map lock guarding insert/remove of per-client trackers
//! - One lock per tracker guarding its request log
//! - Neither lock is ever acquired while the other is held; debug builds
//!   panic on a violation
//! - No I/O inside any critical section

pub mod application;
pub mod domain;
pub mod error;
pub mod presentation;

pub use application::reaper::Reaper;
pub use application::service::{Throttle, ThrottleState};
pub use domain::limiter::{RateLimiter, ReapStats};
pub use error::{RATE_LIMIT_EXCEEDED, ThrottleError};
pub use presentation::middleware::enforce_rate_limit;

pub use platform::client::ClientKey;
pub use platform::rate_limit::{RateLimitConfig, RateLimitDecision};
