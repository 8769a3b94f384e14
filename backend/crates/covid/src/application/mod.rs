//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and infrastructure.
//! Contains use case implementations.

pub mod check_health;
pub mod national_cases;
pub mod province_cases;
pub mod provinces;
