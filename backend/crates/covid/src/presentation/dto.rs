//! API DTOs (Data Transfer Objects)
//!
//! Stored rows are reshaped into `daily`/`cumulative`/`statistics` groups
//! with the derived figures filled in.

use crate::domain::entities::{NationalCase, PoolStats, Province, ProvinceCase};
use crate::domain::services::{CasePercentages, active_cases, case_percentages};
use crate::domain::value_objects::PaginationMeta;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Query for `GET /national`
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Query for `GET /provinces`
#[derive(Debug, Default, Deserialize)]
pub struct ProvincesQuery {
    pub exclude_latest_case: Option<String>,
}

/// Query for the province case listings
#[derive(Debug, Default, Deserialize)]
pub struct CaseListQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub all: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Records are dated by calendar day; clients receive midnight UTC.
fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyCases {
    pub positive: i64,
    pub recovered: i64,
    pub deceased: i64,
    pub active: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CumulativeCases {
    pub positive: i64,
    pub recovered: i64,
    pub deceased: i64,
    pub active: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReproductionRate {
    pub value: Option<f64>,
    pub upper_bound: Option<f64>,
    pub lower_bound: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseStatistics {
    pub percentages: CasePercentages,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reproduction_rate: Option<ReproductionRate>,
}

/// Response item for the national endpoints
#[derive(Debug, Clone, Serialize)]
pub struct NationalCaseResponse {
    pub day: i64,
    pub date: DateTime<Utc>,
    pub daily: DailyCases,
    pub cumulative: CumulativeCases,
    pub statistics: CaseStatistics,
}

impl From<NationalCase> for NationalCaseResponse {
    fn from(case: NationalCase) -> Self {
        Self {
            day: case.day,
            date: midnight_utc(case.date),
            daily: DailyCases {
                positive: case.positive,
                recovered: case.recovered,
                deceased: case.deceased,
                active: active_cases(case.positive, case.recovered, case.deceased),
            },
            cumulative: CumulativeCases {
                positive: case.cumulative_positive,
                recovered: case.cumulative_recovered,
                deceased: case.cumulative_deceased,
                active: active_cases(
                    case.cumulative_positive,
                    case.cumulative_recovered,
                    case.cumulative_deceased,
                ),
            },
            statistics: CaseStatistics {
                percentages: case_percentages(
                    case.cumulative_positive,
                    case.cumulative_recovered,
                    case.cumulative_deceased,
                ),
                // National output always carries the block, nulls included
                reproduction_rate: Some(ReproductionRate {
                    value: case.rt,
                    upper_bound: case.rt_upper,
                    lower_bound: case.rt_lower,
                }),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvinceDailyCases {
    pub positive: i64,
    pub recovered: i64,
    pub deceased: i64,
    pub active: i64,
    pub person_under_observation: i64,
    pub finished_person_under_observation: i64,
    pub person_under_supervision: i64,
    pub finished_person_under_supervision: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvinceCumulativeCases {
    pub positive: i64,
    pub recovered: i64,
    pub deceased: i64,
    pub active: i64,
    pub person_under_observation: i64,
    pub active_person_under_observation: i64,
    pub finished_person_under_observation: i64,
    pub person_under_supervision: i64,
    pub active_person_under_supervision: i64,
    pub finished_person_under_supervision: i64,
}

/// Response item for the province case endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ProvinceCaseResponse {
    pub day: i64,
    pub date: DateTime<Utc>,
    pub daily: ProvinceDailyCases,
    pub cumulative: ProvinceCumulativeCases,
    pub statistics: CaseStatistics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<Province>,
}

impl From<ProvinceCase> for ProvinceCaseResponse {
    fn from(case: ProvinceCase) -> Self {
        // Only a complete estimate is reported for provinces
        let reproduction_rate = match (case.rt, case.rt_upper, case.rt_lower) {
            (Some(value), Some(upper), Some(lower)) => Some(ReproductionRate {
                value: Some(value),
                upper_bound: Some(upper),
                lower_bound: Some(lower),
            }),
            _ => None,
        };

        Self {
            day: case.day,
            date: midnight_utc(case.date),
            daily: ProvinceDailyCases {
                positive: case.positive,
                recovered: case.recovered,
                deceased: case.deceased,
                active: active_cases(case.positive, case.recovered, case.deceased),
                person_under_observation: case.person_under_observation,
                finished_person_under_observation: case.finished_person_under_observation,
                person_under_supervision: case.person_under_supervision,
                finished_person_under_supervision: case.finished_person_under_supervision,
            },
            cumulative: ProvinceCumulativeCases {
                positive: case.cumulative_positive,
                recovered: case.cumulative_recovered,
                deceased: case.cumulative_deceased,
                active: active_cases(
                    case.cumulative_positive,
                    case.cumulative_recovered,
                    case.cumulative_deceased,
                ),
                person_under_observation: case.cumulative_person_under_observation,
                active_person_under_observation: case.cumulative_person_under_observation
                    - case.cumulative_finished_person_under_observation,
                finished_person_under_observation: case
                    .cumulative_finished_person_under_observation,
                person_under_supervision: case.cumulative_person_under_supervision,
                active_person_under_supervision: case.cumulative_person_under_supervision
                    - case.cumulative_finished_person_under_supervision,
                finished_person_under_supervision: case
                    .cumulative_finished_person_under_supervision,
            },
            statistics: CaseStatistics {
                percentages: case_percentages(
                    case.cumulative_positive,
                    case.cumulative_recovered,
                    case.cumulative_deceased,
                ),
                reproduction_rate,
            },
            province: case.province,
        }
    }
}

/// Province fields at the top level, plus its newest record when known
#[derive(Debug, Clone, Serialize)]
pub struct ProvinceWithLatestCase {
    #[serde(flatten)]
    pub province: Province,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_case: Option<ProvinceCaseResponse>,
}

/// Body of `GET /provinces`
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ProvinceListing {
    Basic(Vec<Province>),
    WithLatestCase(Vec<ProvinceWithLatestCase>),
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Body of the province case listings: a bare array when `all=true`,
/// otherwise a page with its metadata
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CaseListing<T> {
    All(Vec<T>),
    Page(Paginated<T>),
}

#[derive(Debug, Serialize)]
pub struct DatabaseStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections: Option<PoolStats>,
}

/// Body of `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    pub database: DatabaseStatus,
}
