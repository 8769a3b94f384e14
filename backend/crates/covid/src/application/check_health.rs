//! Check Health Use Case

use crate::domain::entities::PoolStats;
use crate::domain::repository::DatabaseHealth;
use kernel::error::app_error::AppError;
use std::sync::Arc;

/// Database state as reported to clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseState {
    Healthy(PoolStats),
    /// Client-safe description of the failure
    Unhealthy(String),
}

pub struct CheckHealthUseCase<H>
where
    H: DatabaseHealth,
{
    health_repo: Arc<H>,
}

impl<H> CheckHealthUseCase<H>
where
    H: DatabaseHealth,
{
    pub fn new(health_repo: Arc<H>) -> Self {
        Self { health_repo }
    }

    pub async fn execute(&self) -> DatabaseState {
        match self.health_repo.ping().await {
            Ok(stats) => DatabaseState::Healthy(stats),
            Err(e) => {
                tracing::warn!(error = %e, "Database health check failed");
                DatabaseState::Unhealthy(AppError::from(e).message().to_string())
            }
        }
    }
}
