use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ProFormaError;
use crate::ProFormaResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// One month of projected property financials.
///
/// Produced by the engine's first pass in month order; the refinance
/// overlay replaces the tail suffix with recomputed entries rather than
/// mutating in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySnapshot {
    /// Zero-based month index from model start
    pub month_index: usize,
    /// First day of the projected month
    pub date: NaiveDate,

    // --- Occupancy / rate ---
    pub occupancy_rate: Rate,
    pub adr: Money,
    pub available_room_nights: Decimal,
    pub sold_room_nights: Decimal,

    // --- Revenue by stream ---
    pub revenue_rooms: Money,
    pub revenue_events: Money,
    pub revenue_fb: Money,
    pub revenue_other: Money,
    pub revenue_total: Money,

    // --- Variable expenses (scale with current-month revenue) ---
    pub expense_rooms: Money,
    pub expense_fb: Money,
    pub expense_events: Money,
    pub expense_other_var: Money,
    pub expense_marketing: Money,
    pub expense_utilities_variable: Money,
    pub expense_ffe: Money,

    // --- Fixed expenses (anchored to base revenue, escalated) ---
    pub expense_admin: Money,
    pub expense_property_ops: Money,
    pub expense_it: Money,
    pub expense_utilities_fixed: Money,
    pub expense_insurance: Money,
    pub expense_property_taxes: Money,
    pub expense_other_fixed: Money,

    // --- Profitability ---
    pub gop: Money,
    pub fee_base: Money,
    pub fee_incentive: Money,
    pub noi: Money,

    // --- Debt service ---
    pub interest_expense: Money,
    pub principal_payment: Money,
    pub debt_payment: Money,
    pub debt_outstanding: Money,

    // --- Depreciation / book value ---
    pub depreciation_expense: Money,
    pub accumulated_depreciation: Money,
    pub property_book_value: Money,

    // --- Tax and net income ---
    pub taxable_income: Money,
    pub income_tax: Money,
    pub net_income: Money,

    // --- Cash flow ---
    pub operating_cash_flow: Money,
    pub financing_cash_flow: Money,
    pub cash_flow: Money,
    pub refinancing_proceeds: Money,
    pub ending_cash: Money,
    pub cash_shortfall: bool,

    pub total_expenses: Money,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Calendar helpers
// ---------------------------------------------------------------------------

/// Add `n` calendar months to a date.
pub fn add_months(date: NaiveDate, n: u32) -> ProFormaResult<NaiveDate> {
    date.checked_add_months(Months::new(n))
        .ok_or_else(|| ProFormaError::DateError(format!("{date} + {n} months overflows")))
}

/// Whole calendar months from `a` to `b` (negative when `b` precedes `a`).
/// Day-of-month is ignored; the model steps in month-sized increments.
pub fn months_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b.year() as i64 - a.year() as i64) * 12 + (b.month() as i64 - a.month() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_months_crosses_year() {
        let d = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
        assert_eq!(
            add_months(d, 3).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
        );
    }

    #[test]
    fn test_months_between_signs() {
        let a = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        assert_eq!(months_between(a, b), 18);
        assert_eq!(months_between(b, a), -18);
        assert_eq!(months_between(a, a), 0);
    }
}
