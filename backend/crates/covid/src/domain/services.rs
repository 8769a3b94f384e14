//! Domain Services
//!
//! Figures derived from the stored counts. Everything here is pure.

use serde::Serialize;

/// Share of cumulative positives per outcome, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CasePercentages {
    pub active: f64,
    pub recovered: f64,
    pub deceased: f64,
}

/// Cases neither recovered nor deceased. May be negative when the source
/// data corrects earlier days.
#[inline]
pub fn active_cases(positive: i64, recovered: i64, deceased: i64) -> i64 {
    positive - recovered - deceased
}

/// Percentages of `positive` that are active, recovered and deceased.
/// All zero when there are no positives.
pub fn case_percentages(positive: i64, recovered: i64, deceased: i64) -> CasePercentages {
    if positive == 0 {
        return CasePercentages {
            active: 0.0,
            recovered: 0.0,
            deceased: 0.0,
        };
    }

    let total = positive as f64;
    let active = active_cases(positive, recovered, deceased);
    CasePercentages {
        active: active as f64 / total * 100.0,
        recovered: recovered as f64 / total * 100.0,
        deceased: deceased as f64 / total * 100.0,
    }
}
