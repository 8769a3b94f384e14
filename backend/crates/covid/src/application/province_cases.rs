//! Province Cases Use Case

use crate::domain::entities::ProvinceCase;
use crate::domain::repository::ProvinceCaseRepository;
use crate::domain::value_objects::{CaseFilter, PageRequest, PaginationMeta};
use crate::error::CovidResult;
use std::sync::Arc;

/// One page of records and where it sits in the full result
#[derive(Debug)]
pub struct CasePage {
    pub cases: Vec<ProvinceCase>,
    pub meta: PaginationMeta,
}

pub struct ProvinceCasesUseCase<C>
where
    C: ProvinceCaseRepository,
{
    province_case_repo: Arc<C>,
}

impl<C> ProvinceCasesUseCase<C>
where
    C: ProvinceCaseRepository,
{
    pub fn new(province_case_repo: Arc<C>) -> Self {
        Self { province_case_repo }
    }

    pub async fn all(&self, filter: &CaseFilter) -> CovidResult<Vec<ProvinceCase>> {
        self.province_case_repo.province_cases(filter).await
    }

    pub async fn page(&self, filter: &CaseFilter, page: PageRequest) -> CovidResult<CasePage> {
        let (cases, total) = self
            .province_case_repo
            .province_cases_page(filter, page)
            .await?;

        Ok(CasePage {
            cases,
            meta: PaginationMeta::new(page, total),
        })
    }
}
