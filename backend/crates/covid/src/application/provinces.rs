//! Provinces Use Case

use crate::domain::entities::{Province, ProvinceCase};
use crate::domain::repository::{ProvinceCaseRepository, ProvinceRepository};
use crate::error::CovidResult;
use std::sync::Arc;

pub struct ProvincesUseCase<P, C>
where
    P: ProvinceRepository,
    C: ProvinceCaseRepository,
{
    province_repo: Arc<P>,
    province_case_repo: Arc<C>,
}

impl<P, C> ProvincesUseCase<P, C>
where
    P: ProvinceRepository,
    C: ProvinceCaseRepository,
{
    pub fn new(province_repo: Arc<P>, province_case_repo: Arc<C>) -> Self {
        Self {
            province_repo,
            province_case_repo,
        }
    }

    pub async fn list(&self) -> CovidResult<Vec<Province>> {
        self.province_repo.provinces().await
    }

    /// Every province paired with its newest record.
    ///
    /// A failed lookup for one province leaves that province without a
    /// record instead of failing the whole listing.
    pub async fn list_with_latest_case(&self) -> CovidResult<Vec<(Province, Option<ProvinceCase>)>> {
        let provinces = self.province_repo.provinces().await?;

        let mut result = Vec::with_capacity(provinces.len());
        for province in provinces {
            let latest = match self.province_case_repo.latest_province_case(&province.id).await {
                Ok(latest) => latest,
                Err(e) => {
                    tracing::warn!(
                        province_id = %province.id,
                        error = %e,
                        "Latest province case lookup failed"
                    );
                    None
                }
            };
            result.push((province, latest));
        }

        Ok(result)
    }
}
