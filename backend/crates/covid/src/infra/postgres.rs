//! PostgreSQL Repository Implementations

use crate::domain::entities::{NationalCase, PoolStats, Province, ProvinceCase};
use crate::domain::repository::{
    DatabaseHealth, NationalCaseRepository, ProvinceCaseRepository, ProvinceRepository,
};
use crate::domain::value_objects::{CaseFilter, DateRange, PageRequest};
use crate::error::CovidResult;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder};

const NATIONAL_CASE_COLUMNS: &str = r#"
    SELECT id, day, date,
           positive, recovered, deceased,
           cumulative_positive, cumulative_recovered, cumulative_deceased,
           rt, rt_upper, rt_lower
    FROM national_cases
"#;

const PROVINCE_CASE_COLUMNS: &str = r#"
    SELECT pc.id, pc.day, nc.date, pc.province_id,
           pc.positive, pc.recovered, pc.deceased,
           pc.person_under_observation, pc.finished_person_under_observation,
           pc.person_under_supervision, pc.finished_person_under_supervision,
           pc.cumulative_positive, pc.cumulative_recovered, pc.cumulative_deceased,
           pc.cumulative_person_under_observation, pc.cumulative_finished_person_under_observation,
           pc.cumulative_person_under_supervision, pc.cumulative_finished_person_under_supervision,
           pc.rt, pc.rt_upper, pc.rt_lower,
           p.name AS province_name
"#;

const PROVINCE_CASE_SOURCE: &str = r#"
    FROM province_cases pc
    JOIN national_cases nc ON pc.day = nc.id
    LEFT JOIN provinces p ON pc.province_id = p.id
"#;

/// PostgreSQL-backed repository
#[derive(Clone)]
pub struct PgCovidRepository {
    pool: PgPool,
}

impl PgCovidRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl NationalCaseRepository for PgCovidRepository {
    async fn national_cases(&self, range: Option<DateRange>) -> CovidResult<Vec<NationalCase>> {
        let mut query = QueryBuilder::<Postgres>::new(NATIONAL_CASE_COLUMNS);
        if let Some(range) = range {
            query
                .push(" WHERE date BETWEEN ")
                .push_bind(range.start)
                .push(" AND ")
                .push_bind(range.end);
        }
        query.push(" ORDER BY date ASC");

        let rows = query
            .build_query_as::<NationalCaseRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(NationalCaseRow::into_national_case).collect())
    }

    async fn latest_national_case(&self) -> CovidResult<Option<NationalCase>> {
        let mut query = QueryBuilder::<Postgres>::new(NATIONAL_CASE_COLUMNS);
        query.push(" ORDER BY date DESC LIMIT 1");

        let row = query
            .build_query_as::<NationalCaseRow>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(NationalCaseRow::into_national_case))
    }
}

impl ProvinceRepository for PgCovidRepository {
    async fn provinces(&self) -> CovidResult<Vec<Province>> {
        let rows = sqlx::query_as::<_, ProvinceRow>("SELECT id, name FROM provinces ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Province {
                id: row.id,
                name: row.name,
            })
            .collect())
    }
}

impl ProvinceCaseRepository for PgCovidRepository {
    async fn province_cases(&self, filter: &CaseFilter) -> CovidResult<Vec<ProvinceCase>> {
        let mut query = QueryBuilder::<Postgres>::new(PROVINCE_CASE_COLUMNS);
        query.push(PROVINCE_CASE_SOURCE);
        push_filter(&mut query, filter);
        query.push(order_clause(filter));

        let rows = query
            .build_query_as::<ProvinceCaseRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ProvinceCaseRow::into_province_case).collect())
    }

    async fn province_cases_page(
        &self,
        filter: &CaseFilter,
        page: PageRequest,
    ) -> CovidResult<(Vec<ProvinceCase>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        count.push(PROVINCE_CASE_SOURCE);
        push_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query = QueryBuilder::<Postgres>::new(PROVINCE_CASE_COLUMNS);
        query.push(PROVINCE_CASE_SOURCE);
        push_filter(&mut query, filter);
        query
            .push(order_clause(filter))
            .push(" LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = query
            .build_query_as::<ProvinceCaseRow>()
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(
            returned = rows.len(),
            total,
            limit = page.limit(),
            offset = page.offset(),
            "Province case page fetched"
        );

        Ok((
            rows.into_iter().map(ProvinceCaseRow::into_province_case).collect(),
            total,
        ))
    }

    async fn latest_province_case(&self, province_id: &str) -> CovidResult<Option<ProvinceCase>> {
        let mut query = QueryBuilder::<Postgres>::new(PROVINCE_CASE_COLUMNS);
        query
            .push(PROVINCE_CASE_SOURCE)
            .push(" WHERE pc.province_id = ")
            .push_bind(province_id.to_string())
            .push(" ORDER BY nc.date DESC LIMIT 1");

        let row = query
            .build_query_as::<ProvinceCaseRow>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ProvinceCaseRow::into_province_case))
    }
}

impl DatabaseHealth for PgCovidRepository {
    async fn ping(&self) -> CovidResult<PoolStats> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;

        let open = self.pool.size();
        let idle = u32::try_from(self.pool.num_idle()).unwrap_or(u32::MAX);
        Ok(PoolStats {
            open,
            idle,
            in_use: open.saturating_sub(idle),
            max_open: self.pool.options().get_max_connections(),
        })
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &CaseFilter) {
    let mut keyword = " WHERE ";
    if let Some(province_id) = &filter.province_id {
        query
            .push(keyword)
            .push("pc.province_id = ")
            .push_bind(province_id.clone());
        keyword = " AND ";
    }
    if let Some(range) = filter.range {
        query
            .push(keyword)
            .push("nc.date BETWEEN ")
            .push_bind(range.start)
            .push(" AND ")
            .push_bind(range.end);
    }
}

fn order_clause(filter: &CaseFilter) -> &'static str {
    match (&filter.province_id, &filter.range) {
        (Some(_), _) => " ORDER BY nc.date DESC",
        (None, Some(_)) => " ORDER BY nc.date DESC, p.name ASC",
        (None, None) => " ORDER BY nc.date ASC, p.name ASC",
    }
}

// ============================================================================
// Row types for SQLx
// ============================================================================

#[derive(sqlx::FromRow)]
struct ProvinceRow {
    id: String,
    name: String,
}

#[derive(sqlx::FromRow)]
struct NationalCaseRow {
    id: i64,
    day: i64,
    date: NaiveDate,
    positive: i64,
    recovered: i64,
    deceased: i64,
    cumulative_positive: i64,
    cumulative_recovered: i64,
    cumulative_deceased: i64,
    rt: Option<f64>,
    rt_upper: Option<f64>,
    rt_lower: Option<f64>,
}

impl NationalCaseRow {
    fn into_national_case(self) -> NationalCase {
        NationalCase {
            id: self.id,
            day: self.day,
            date: self.date,
            positive: self.positive,
            recovered: self.recovered,
            deceased: self.deceased,
            cumulative_positive: self.cumulative_positive,
            cumulative_recovered: self.cumulative_recovered,
            cumulative_deceased: self.cumulative_deceased,
            rt: self.rt,
            rt_upper: self.rt_upper,
            rt_lower: self.rt_lower,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProvinceCaseRow {
    id: i64,
    day: i64,
    date: NaiveDate,
    province_id: String,
    positive: i64,
    recovered: i64,
    deceased: i64,
    person_under_observation: i64,
    finished_person_under_observation: i64,
    person_under_supervision: i64,
    finished_person_under_supervision: i64,
    cumulative_positive: i64,
    cumulative_recovered: i64,
    cumulative_deceased: i64,
    cumulative_person_under_observation: i64,
    cumulative_finished_person_under_observation: i64,
    cumulative_person_under_supervision: i64,
    cumulative_finished_person_under_supervision: i64,
    rt: Option<f64>,
    rt_upper: Option<f64>,
    rt_lower: Option<f64>,
    province_name: Option<String>,
}

impl ProvinceCaseRow {
    fn into_province_case(self) -> ProvinceCase {
        let province = self.province_name.map(|name| Province {
            id: self.province_id.clone(),
            name,
        });

        ProvinceCase {
            id: self.id,
            day: self.day,
            date: self.date,
            province_id: self.province_id,
            positive: self.positive,
            recovered: self.recovered,
            deceased: self.deceased,
            person_under_observation: self.person_under_observation,
            finished_person_under_observation: self.finished_person_under_observation,
            person_under_supervision: self.person_under_supervision,
            finished_person_under_supervision: self.finished_person_under_supervision,
            cumulative_positive: self.cumulative_positive,
            cumulative_recovered: self.cumulative_recovered,
            cumulative_deceased: self.cumulative_deceased,
            cumulative_person_under_observation: self.cumulative_person_under_observation,
            cumulative_finished_person_under_observation: self
                .cumulative_finished_person_under_observation,
            cumulative_person_under_supervision: self.cumulative_person_under_supervision,
            cumulative_finished_person_under_supervision: self
                .cumulative_finished_person_under_supervision,
            rt: self.rt,
            rt_upper: self.rt_upper,
            rt_lower: self.rt_lower,
            province,
        }
    }
}
