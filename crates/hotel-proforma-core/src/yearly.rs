//! Yearly rollups of monthly snapshots for reporting.
//!
//! A pure reduction: every flow field is summed across the 12-month
//! slice; ending cash is a balance, so the year carries the final
//! month's value instead of a sum.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, MonthlySnapshot};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearlySummary {
    /// Zero-based year index from model start
    pub year_index: usize,
    pub months_included: usize,

    pub revenue_rooms: Money,
    pub revenue_events: Money,
    pub revenue_fb: Money,
    pub revenue_other: Money,
    pub revenue_total: Money,

    pub expense_variable: Money,
    pub expense_fixed: Money,
    /// Variable + fixed utilities combined for reporting
    pub expense_utilities: Money,
    pub expense_ffe: Money,
    pub total_expenses: Money,

    pub gop: Money,
    pub fee_base: Money,
    pub fee_incentive: Money,
    pub noi: Money,

    pub interest_expense: Money,
    pub principal_payment: Money,
    pub debt_payment: Money,

    pub depreciation_expense: Money,
    pub income_tax: Money,
    pub net_income: Money,

    pub operating_cash_flow: Money,
    pub financing_cash_flow: Money,
    pub cash_flow: Money,
    pub refinancing_proceeds: Money,
    /// Balance, not a flow: last month of the year
    pub ending_cash: Money,
}

/// Reduce monthly snapshots into calendar-aligned years (chunks of 12
/// from model start; a trailing partial year is included as-is).
pub fn aggregate_years(months: &[MonthlySnapshot]) -> Vec<YearlySummary> {
    months
        .chunks(12)
        .enumerate()
        .map(|(year_index, slice)| {
            let sum = |f: fn(&MonthlySnapshot) -> Money| -> Money { slice.iter().map(f).sum() };

            YearlySummary {
                year_index,
                months_included: slice.len(),

                revenue_rooms: sum(|m| m.revenue_rooms),
                revenue_events: sum(|m| m.revenue_events),
                revenue_fb: sum(|m| m.revenue_fb),
                revenue_other: sum(|m| m.revenue_other),
                revenue_total: sum(|m| m.revenue_total),

                expense_variable: sum(|m| {
                    m.expense_rooms
                        + m.expense_fb
                        + m.expense_events
                        + m.expense_other_var
                        + m.expense_marketing
                        + m.expense_utilities_variable
                }),
                expense_fixed: sum(|m| {
                    m.expense_admin
                        + m.expense_property_ops
                        + m.expense_it
                        + m.expense_utilities_fixed
                        + m.expense_insurance
                        + m.expense_property_taxes
                        + m.expense_other_fixed
                }),
                expense_utilities: sum(|m| {
                    m.expense_utilities_variable + m.expense_utilities_fixed
                }),
                expense_ffe: sum(|m| m.expense_ffe),
                total_expenses: sum(|m| m.total_expenses),

                gop: sum(|m| m.gop),
                fee_base: sum(|m| m.fee_base),
                fee_incentive: sum(|m| m.fee_incentive),
                noi: sum(|m| m.noi),

                interest_expense: sum(|m| m.interest_expense),
                principal_payment: sum(|m| m.principal_payment),
                debt_payment: sum(|m| m.debt_payment),

                depreciation_expense: sum(|m| m.depreciation_expense),
                income_tax: sum(|m| m.income_tax),
                net_income: sum(|m| m.net_income),

                operating_cash_flow: sum(|m| m.operating_cash_flow),
                financing_cash_flow: sum(|m| m.financing_cash_flow),
                cash_flow: sum(|m| m.cash_flow),
                refinancing_proceeds: sum(|m| m.refinancing_proceeds),
                ending_cash: slice
                    .last()
                    .map(|m| m.ending_cash)
                    .unwrap_or(Decimal::ZERO),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{resolve, FinancingType, GlobalAssumptions, PropertyAssumptions};
    use crate::engine::projection::project_months;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn projected() -> Vec<MonthlySnapshot> {
        let property = PropertyAssumptions {
            property_name: "Rollup Test".into(),
            operations_start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            acquisition_date: None,
            room_count: 10,
            start_occupancy: dec!(0.70),
            max_occupancy: dec!(0.70),
            occupancy_growth_step: Decimal::ZERO,
            occupancy_ramp_months: None,
            start_adr: dec!(100),
            adr_growth: Decimal::ZERO,
            purchase_price: dec!(1000000),
            improvements: dec!(200000),
            land_value_fraction: None,
            operating_reserve: None,
            financing: FinancingType::Financed {
                ltv: None,
                annual_rate: None,
                term_years: None,
            },
            refinance: None,
            cost_rate_rooms: None,
            cost_rate_fb: None,
            cost_rate_admin: None,
            cost_rate_marketing: None,
            cost_rate_property_ops: None,
            cost_rate_utilities: None,
            cost_rate_insurance: None,
            cost_rate_property_taxes: None,
            cost_rate_it: None,
            cost_rate_ffe: None,
            cost_rate_other: None,
            rev_share_events: None,
            rev_share_fb: None,
            rev_share_other: None,
            catering_boost: None,
            base_fee_rate: None,
            incentive_fee_rate: None,
            tax_rate: None,
        };
        let global = GlobalAssumptions::for_start(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        let mut warnings = Vec::new();
        let resolved = resolve(&property, &global, 120, &mut warnings).unwrap();
        project_months(&resolved).unwrap()
    }

    #[test]
    fn test_ten_years_from_120_months() {
        let years = aggregate_years(&projected());
        assert_eq!(years.len(), 10);
        assert!(years.iter().all(|y| y.months_included == 12));
    }

    #[test]
    fn test_flows_sum_and_balance_picks_last() {
        let months = projected();
        let years = aggregate_years(&months);

        let expected_revenue: Decimal = months[..12].iter().map(|m| m.revenue_total).sum();
        assert_eq!(years[0].revenue_total, expected_revenue);

        let expected_noi: Decimal = months[12..24].iter().map(|m| m.noi).sum();
        assert_eq!(years[1].noi, expected_noi);

        // Ending cash is not summed
        assert_eq!(years[0].ending_cash, months[11].ending_cash);
        assert_eq!(years[9].ending_cash, months[119].ending_cash);
    }

    #[test]
    fn test_utilities_combined() {
        let months = projected();
        let years = aggregate_years(&months);
        let expected: Decimal = months[..12]
            .iter()
            .map(|m| m.expense_utilities_variable + m.expense_utilities_fixed)
            .sum();
        assert_eq!(years[0].expense_utilities, expected);
    }

    #[test]
    fn test_partial_trailing_year() {
        let months = projected();
        let years = aggregate_years(&months[..30]);
        assert_eq!(years.len(), 3);
        assert_eq!(years[2].months_included, 6);
    }
}
