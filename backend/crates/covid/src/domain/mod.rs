//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (national and per-province daily records)
//! - Domain value objects (date ranges, pagination, filters)
//! - Domain services (derived case arithmetic)
//! - Repository traits (interfaces)

pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;
