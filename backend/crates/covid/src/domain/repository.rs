//! Repository Traits
//!
//! Interfaces for data access. Implementation is in infrastructure layer.

use crate::domain::entities::{NationalCase, PoolStats, Province, ProvinceCase};
use crate::domain::value_objects::{CaseFilter, DateRange, PageRequest};
use crate::error::CovidResult;

/// National case repository trait
#[trait_variant::make(NationalCaseRepository: Send)]
pub trait LocalNationalCaseRepository {
    /// Every national record, oldest first, optionally within `range`
    async fn national_cases(&self, range: Option<DateRange>) -> CovidResult<Vec<NationalCase>>;

    /// The most recent national record
    async fn latest_national_case(&self) -> CovidResult<Option<NationalCase>>;
}

/// Province repository trait
#[trait_variant::make(ProvinceRepository: Send)]
pub trait LocalProvinceRepository {
    /// Every province, ordered by name
    async fn provinces(&self) -> CovidResult<Vec<Province>>;
}

/// Province case repository trait
///
/// Ordering: with neither a province nor a range, oldest first and then by
/// province name; with a range only, newest first and then by province name;
/// for a single province, newest first.
#[trait_variant::make(ProvinceCaseRepository: Send)]
pub trait LocalProvinceCaseRepository {
    /// Every record matching `filter`
    async fn province_cases(&self, filter: &CaseFilter) -> CovidResult<Vec<ProvinceCase>>;

    /// One page of records matching `filter`, with the total match count
    async fn province_cases_page(
        &self,
        filter: &CaseFilter,
        page: PageRequest,
    ) -> CovidResult<(Vec<ProvinceCase>, i64)>;

    /// The most recent record for one province
    async fn latest_province_case(&self, province_id: &str) -> CovidResult<Option<ProvinceCase>>;
}

/// Database reachability trait
#[trait_variant::make(DatabaseHealth: Send)]
pub trait LocalDatabaseHealth {
    /// Round-trip a trivial query and report pool usage
    async fn ping(&self) -> CovidResult<PoolStats>;
}

/// Everything the statistics routes need from storage
pub trait CovidRepository:
    NationalCaseRepository
    + ProvinceRepository
    + ProvinceCaseRepository
    + DatabaseHealth
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> CovidRepository for T where
    T: NationalCaseRepository
        + ProvinceRepository
        + ProvinceCaseRepository
        + DatabaseHealth
        + Clone
        + Send
        + Sync
        + 'static
{
}
