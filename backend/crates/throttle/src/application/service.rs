//! Throttle service lifecycle
//!
//! [`Throttle`] is constructed once at startup, hands out cheap
//! [`ThrottleState`] handles for the middleware, and is shut down
//! explicitly so the reaper never outlives the server.

use platform::rate_limit::RateLimitConfig;
use std::sync::Arc;

use crate::application::reaper::Reaper;
use crate::domain::limiter::RateLimiter;

/// Owner of the limiter and its reaper
pub struct Throttle {
    state: ThrottleState,
    reaper: Option<Reaper>,
}

/// Middleware state: the shared limiter, or nothing when disabled
#[derive(Clone)]
pub struct ThrottleState {
    limiter: Option<Arc<RateLimiter>>,
}

impl ThrottleState {
    /// State that admits everything and writes no headers
    pub fn disabled() -> Self {
        Self { limiter: None }
    }

    pub fn limiter(&self) -> Option<&RateLimiter> {
        self.limiter.as_deref()
    }
}

impl Throttle {
    /// Build the limiter and, when enabled, spawn its reaper.
    ///
    /// Must be called from within a tokio runtime if `config.enabled`.
    pub fn start(config: RateLimitConfig) -> Self {
        if !config.enabled {
            tracing::info!("Rate limiting disabled");
            return Self {
                state: ThrottleState::disabled(),
                reaper: None,
            };
        }

        let limiter = Arc::new(RateLimiter::from_config(&config));
        let reaper = Reaper::spawn(limiter.clone(), config.cleanup_interval);

        tracing::info!(
            requests = config.requests_per_minute,
            window = ?config.window,
            burst_size = config.burst_size,
            "Rate limiting enabled"
        );

        Self {
            state: ThrottleState {
                limiter: Some(limiter),
            },
            reaper: Some(reaper),
        }
    }

    pub fn state(&self) -> ThrottleState {
        self.state.clone()
    }

    /// Stop the reaper. Client state is simply dropped with the limiter.
    pub async fn shutdown(mut self) {
        if let Some(reaper) = self.reaper.take() {
            reaper.stop().await;
        }
        tracing::info!("Rate limiter shut down");
    }
}
