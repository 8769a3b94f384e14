//! Domain Entities

use chrono::NaiveDate;
use serde::Serialize;

/// A province as listed by the statistics source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Province {
    pub id: String,
    pub name: String,
}

/// One day of nationwide figures
#[derive(Debug, Clone, PartialEq)]
pub struct NationalCase {
    pub id: i64,
    pub day: i64,
    pub date: NaiveDate,
    pub positive: i64,
    pub recovered: i64,
    pub deceased: i64,
    pub cumulative_positive: i64,
    pub cumulative_recovered: i64,
    pub cumulative_deceased: i64,
    /// Reproduction rate estimate and its confidence bounds, when published
    pub rt: Option<f64>,
    pub rt_upper: Option<f64>,
    pub rt_lower: Option<f64>,
}

/// One day of figures for a single province.
///
/// `date` comes from the national record the row is keyed to (`day`).
#[derive(Debug, Clone, PartialEq)]
pub struct ProvinceCase {
    pub id: i64,
    pub day: i64,
    pub date: NaiveDate,
    pub province_id: String,
    pub positive: i64,
    pub recovered: i64,
    pub deceased: i64,
    pub person_under_observation: i64,
    pub finished_person_under_observation: i64,
    pub person_under_supervision: i64,
    pub finished_person_under_supervision: i64,
    pub cumulative_positive: i64,
    pub cumulative_recovered: i64,
    pub cumulative_deceased: i64,
    pub cumulative_person_under_observation: i64,
    pub cumulative_finished_person_under_observation: i64,
    pub cumulative_person_under_supervision: i64,
    pub cumulative_finished_person_under_supervision: i64,
    pub rt: Option<f64>,
    pub rt_upper: Option<f64>,
    pub rt_lower: Option<f64>,
    /// Present when the province row exists for `province_id`
    pub province: Option<Province>,
}

/// Connection pool figures reported by the health check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub open: u32,
    pub idle: u32,
    pub in_use: u32,
    pub max_open: u32,
}
