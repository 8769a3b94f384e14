//! National Cases Use Case

use crate::domain::entities::NationalCase;
use crate::domain::repository::NationalCaseRepository;
use crate::domain::value_objects::DateRange;
use crate::error::{CovidError, CovidResult};
use std::sync::Arc;

pub struct NationalCasesUseCase<N>
where
    N: NationalCaseRepository,
{
    national_repo: Arc<N>,
}

impl<N> NationalCasesUseCase<N>
where
    N: NationalCaseRepository,
{
    pub fn new(national_repo: Arc<N>) -> Self {
        Self { national_repo }
    }

    pub async fn list(&self, range: Option<DateRange>) -> CovidResult<Vec<NationalCase>> {
        self.national_repo.national_cases(range).await
    }

    /// The newest record; an empty table is an error, not an empty body.
    pub async fn latest(&self) -> CovidResult<NationalCase> {
        self.national_repo
            .latest_national_case()
            .await?
            .ok_or(CovidError::NationalCaseNotFound)
    }
}
