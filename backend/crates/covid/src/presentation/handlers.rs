//! HTTP Handlers

use crate::application::check_health::{CheckHealthUseCase, DatabaseState};
use crate::application::national_cases::NationalCasesUseCase;
use crate::application::province_cases::{CasePage, ProvinceCasesUseCase};
use crate::application::provinces::ProvincesUseCase;
use crate::domain::repository::CovidRepository;
use crate::domain::value_objects::{CaseFilter, DateRange, PageRequest};
use crate::presentation::dto::{
    CaseListQuery, CaseListing, DatabaseStatus, DateRangeQuery, HealthStatus,
    NationalCaseResponse, Paginated, ProvinceCaseResponse, ProvinceListing,
    ProvinceWithLatestCase, ProvincesQuery,
};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use kernel::error::app_error::{AppResult, ResultExt};
use kernel::error::kind::ErrorKind;
use kernel::response::ApiResponse;
use std::sync::Arc;

pub const SERVICE_NAME: &str = "COVID-19 API";

/// Shared state for the statistics handlers
#[derive(Clone)]
pub struct CovidAppState<R>
where
    R: CovidRepository,
{
    pub repo: Arc<R>,
}

/// GET /api/v1/health
///
/// Answers 503 with the same envelope when the database is unreachable.
pub async fn health<R>(State(state): State<CovidAppState<R>>) -> (StatusCode, ApiResponse<HealthStatus>)
where
    R: CovidRepository,
{
    let use_case = CheckHealthUseCase::new(state.repo.clone());

    let (status, code, database) = match use_case.execute().await {
        DatabaseState::Healthy(stats) => (
            "healthy",
            StatusCode::OK,
            DatabaseStatus {
                status: "healthy",
                error: None,
                connections: Some(stats),
            },
        ),
        DatabaseState::Unhealthy(error) => (
            "degraded",
            StatusCode::SERVICE_UNAVAILABLE,
            DatabaseStatus {
                status: "unhealthy",
                error: Some(error),
                connections: None,
            },
        ),
    };

    (
        code,
        ApiResponse::success(HealthStatus {
            status,
            service: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
            timestamp: chrono::Utc::now().to_rfc3339(),
            database,
        }),
    )
}

/// GET /api/v1/national
pub async fn national_cases<R>(
    State(state): State<CovidAppState<R>>,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<ApiResponse<Vec<NationalCaseResponse>>>
where
    R: CovidRepository,
{
    let range = DateRange::from_query(query.start_date.as_deref(), query.end_date.as_deref())?;

    let cases = NationalCasesUseCase::new(state.repo.clone())
        .list(range)
        .await?;

    Ok(ApiResponse::success(
        cases.into_iter().map(NationalCaseResponse::from).collect(),
    ))
}

/// GET /api/v1/national/latest
pub async fn latest_national_case<R>(
    State(state): State<CovidAppState<R>>,
) -> AppResult<ApiResponse<NationalCaseResponse>>
where
    R: CovidRepository,
{
    let case = NationalCasesUseCase::new(state.repo.clone()).latest().await?;

    Ok(ApiResponse::success(case.into()))
}

/// GET /api/v1/provinces
pub async fn provinces<R>(
    State(state): State<CovidAppState<R>>,
    Query(query): Query<ProvincesQuery>,
) -> AppResult<ApiResponse<ProvinceListing>>
where
    R: CovidRepository,
{
    let use_case = ProvincesUseCase::new(state.repo.clone(), state.repo.clone());

    if query.exclude_latest_case.as_deref() == Some("true") {
        let provinces = use_case.list().await?;
        return Ok(ApiResponse::success(ProvinceListing::Basic(provinces)));
    }

    let provinces = use_case
        .list_with_latest_case()
        .await?
        .into_iter()
        .map(|(province, latest)| ProvinceWithLatestCase {
            province,
            latest_case: latest.map(ProvinceCaseResponse::from),
        })
        .collect();

    Ok(ApiResponse::success(ProvinceListing::WithLatestCase(
        provinces,
    )))
}

/// GET /api/v1/provinces/cases
pub async fn all_province_cases<R>(
    State(state): State<CovidAppState<R>>,
    Query(query): Query<CaseListQuery>,
) -> AppResult<ApiResponse<CaseListing<ProvinceCaseResponse>>>
where
    R: CovidRepository,
{
    list_province_cases(state, None, query).await
}

/// GET /api/v1/provinces/{province_id}/cases
pub async fn province_cases<R>(
    State(state): State<CovidAppState<R>>,
    Path(province_id): Path<String>,
    Query(query): Query<CaseListQuery>,
) -> AppResult<ApiResponse<CaseListing<ProvinceCaseResponse>>>
where
    R: CovidRepository,
{
    list_province_cases(state, Some(province_id), query).await
}

async fn list_province_cases<R>(
    state: CovidAppState<R>,
    province_id: Option<String>,
    query: CaseListQuery,
) -> AppResult<ApiResponse<CaseListing<ProvinceCaseResponse>>>
where
    R: CovidRepository,
{
    let page = PageRequest::new(
        number_param(query.limit.as_deref(), "Invalid limit parameter")?,
        number_param(query.offset.as_deref(), "Invalid offset parameter")?,
    );
    let filter = CaseFilter {
        province_id,
        range: DateRange::from_query(query.start_date.as_deref(), query.end_date.as_deref())?,
    };

    let use_case = ProvinceCasesUseCase::new(state.repo.clone());

    if query.all.as_deref() == Some("true") {
        let cases = use_case.all(&filter).await?;
        return Ok(ApiResponse::success(CaseListing::All(
            cases.into_iter().map(ProvinceCaseResponse::from).collect(),
        )));
    }

    let CasePage { cases, meta } = use_case.page(&filter, page).await?;

    Ok(ApiResponse::success(CaseListing::Page(Paginated {
        data: cases.into_iter().map(ProvinceCaseResponse::from).collect(),
        pagination: meta,
    })))
}

/// An absent or empty value is `None`; anything else must be an integer.
fn number_param(raw: Option<&str>, message: &'static str) -> AppResult<Option<i64>> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| value.parse::<i64>().map_app_err(ErrorKind::BadRequest, message))
        .transpose()
}
