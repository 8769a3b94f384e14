//! Statistics Router

use crate::domain::repository::CovidRepository;
use crate::infra::postgres::PgCovidRepository;
use crate::presentation::handlers::{self, CovidAppState};
use axum::{Router, routing::get};
use std::sync::Arc;

/// Create the statistics router with PostgreSQL repository
pub fn covid_router(repo: PgCovidRepository) -> Router {
    covid_router_generic(repo)
}

/// Create a statistics router for any repository implementation
pub fn covid_router_generic<R>(repo: R) -> Router
where
    R: CovidRepository,
{
    let state = CovidAppState {
        repo: Arc::new(repo),
    };

    Router::new()
        .route("/health", get(handlers::health::<R>))
        .route("/national", get(handlers::national_cases::<R>))
        .route("/national/latest", get(handlers::latest_national_case::<R>))
        .route("/provinces", get(handlers::provinces::<R>))
        .route("/provinces/cases", get(handlers::all_province_cases::<R>))
        .route(
            "/provinces/{province_id}/cases",
            get(handlers::province_cases::<R>),
        )
        .with_state(state)
}
