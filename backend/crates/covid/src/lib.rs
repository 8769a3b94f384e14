//! COVID-19 Statistics Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, derived case arithmetic, repository traits
//! - `application/` - Use cases
//! - `infra/` - PostgreSQL implementation
//! - `presentation/` - HTTP handlers, response reshaping, router
//!
//! All routes are read-only. National and province records are reshaped
//! into daily/cumulative/statistics groups on the way out.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

pub use error::{CovidError, CovidResult};
pub use infra::postgres::PgCovidRepository;
pub use presentation::router::{covid_router, covid_router_generic};
