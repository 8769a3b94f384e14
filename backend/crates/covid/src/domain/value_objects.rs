//! Domain Value Objects
//!
//! Immutable query inputs: date ranges, case filters and pages.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{CovidError, CovidResult};

/// Inclusive calendar range applied to record dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub const FORMAT: &'static str = "%Y-%m-%d";

    /// Build a range from the `start_date`/`end_date` query values.
    ///
    /// The range applies only when both values are present and non-empty;
    /// otherwise the query is unbounded and `Ok(None)` is returned.
    pub fn from_query(start: Option<&str>, end: Option<&str>) -> CovidResult<Option<Self>> {
        let (Some(start), Some(end)) = (
            start.filter(|s| !s.is_empty()),
            end.filter(|s| !s.is_empty()),
        ) else {
            return Ok(None);
        };

        Ok(Some(Self {
            start: parse_date("start_date", start)?,
            end: parse_date("end_date", end)?,
        }))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

fn parse_date(field: &'static str, raw: &str) -> CovidResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, DateRange::FORMAT)
        .map_err(|source| CovidError::InvalidDate { field, source })
}

/// Which province records to return
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseFilter {
    /// Restrict to one province; `None` means every province
    pub province_id: Option<String>,
    pub range: Option<DateRange>,
}

impl CaseFilter {
    pub fn matches(&self, province_id: &str, date: NaiveDate) -> bool {
        self.province_id.as_deref().is_none_or(|id| id == province_id)
            && self.range.is_none_or(|range| range.contains(date))
    }
}

/// Requested page, already clamped to the accepted bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    limit: i64,
    offset: i64,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 1000;

    /// A missing or non-positive limit becomes the default, a limit above
    /// the maximum becomes the maximum, a negative offset becomes zero.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = match limit {
            Some(limit) if limit > Self::MAX_LIMIT => Self::MAX_LIMIT,
            Some(limit) if limit > 0 => limit,
            _ => Self::DEFAULT_LIMIT,
        };
        Self {
            limit,
            offset: offset.unwrap_or(0).max(0),
        }
    }

    #[inline]
    pub fn limit(&self) -> i64 {
        self.limit
    }

    #[inline]
    pub fn offset(&self) -> i64 {
        self.offset
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Position of a page within the full result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub limit: i64,
    pub offset: i64,
    pub total: i64,
    pub total_pages: i64,
    /// 1-based; an offset inside a page counts toward that page
    pub page: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(request: PageRequest, total: i64) -> Self {
        let PageRequest { limit, offset } = request;
        Self {
            limit,
            offset,
            total,
            total_pages: (total + limit - 1) / limit,
            page: offset / limit + 1,
            has_next: offset + limit < total,
            has_prev: offset > 0,
        }
    }
}
