//! Pass 1: linear monthly sweep.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::assumptions::ResolvedAssumptions;
use crate::engine::accumulate_cash;
use crate::formulas::compound_factor;
use crate::types::{add_months, months_between, MonthlySnapshot};
use crate::ProFormaResult;

/// Project every month of the horizon from resolved assumptions.
///
/// Two independent gates drive activation: the operations gate controls
/// revenue and operating expense; the acquisition gate controls debt,
/// depreciation, and book value. Neither implies the other.
pub fn project_months(cfg: &ResolvedAssumptions) -> ProFormaResult<Vec<MonthlySnapshot>> {
    let monthly_rate = cfg.loan_annual_rate / dec!(12);
    let total_property_value = cfg.purchase_price + cfg.improvements;
    let available_room_nights = Decimal::from(cfg.room_count) * cfg.days_per_month;

    let mut months = Vec::with_capacity(cfg.horizon_months);
    let mut debt_balance = cfg.loan_amount;

    for i in 0..cfg.horizon_months {
        let date = add_months(cfg.model_start, i as u32)?;
        let is_operational = date >= cfg.operations_start;
        let is_acquired = date >= cfg.acquisition_date;

        // Growth clocks are anchored to the property's own operating
        // calendar, not the model calendar.
        let months_since_ops = if is_operational {
            months_between(cfg.operations_start, date).max(0) as u32
        } else {
            0
        };
        let ops_year = months_since_ops / 12;

        // --- Occupancy ramp (discrete steps, capped) ---
        let occupancy_rate = if is_operational {
            let steps = if cfg.occupancy_ramp_months > 0 {
                Decimal::from(months_since_ops / cfg.occupancy_ramp_months)
            } else {
                Decimal::ZERO
            };
            cfg.max_occupancy
                .min(cfg.start_occupancy + steps * cfg.occupancy_growth_step)
        } else {
            Decimal::ZERO
        };

        let adr = cfg.start_adr * compound_factor(cfg.adr_growth, ops_year);

        // --- Revenue ---
        let sold_room_nights = if is_operational {
            available_room_nights * occupancy_rate
        } else {
            Decimal::ZERO
        };
        let revenue_rooms = sold_room_nights * adr;
        let revenue_events = revenue_rooms * cfg.rev_share_events;
        let revenue_fb = revenue_rooms * cfg.rev_share_fb * (Decimal::ONE + cfg.catering_boost);
        let revenue_other = revenue_rooms * cfg.rev_share_other;
        let revenue_total = revenue_rooms + revenue_events + revenue_fb + revenue_other;

        // --- Variable expenses (revenue-driven, self-zeroing pre-ops) ---
        let expense_rooms = revenue_rooms * cfg.cost_rate_rooms;
        let expense_fb = revenue_fb * cfg.cost_rate_fb;
        let expense_events = revenue_events * cfg.event_expense_rate;
        let expense_other_var = revenue_other * cfg.other_expense_rate;
        let expense_marketing = revenue_total * cfg.cost_rate_marketing;
        let expense_utilities_variable =
            revenue_total * cfg.cost_rate_utilities * cfg.utilities_variable_split;
        let expense_ffe = revenue_total * cfg.cost_rate_ffe;

        // --- Fixed expenses (anchored to the base-revenue constant,
        //     escalated per operational year; explicit operations gate
        //     because the anchor formula does not zero itself) ---
        let escalation = compound_factor(cfg.fixed_cost_escalation, ops_year);
        let (
            expense_admin,
            expense_property_ops,
            expense_it,
            expense_utilities_fixed,
            expense_insurance,
            expense_property_taxes,
            expense_other_fixed,
        ) = if is_operational {
            let fixed_split = Decimal::ONE - cfg.utilities_variable_split;
            (
                cfg.base_monthly_revenue * cfg.cost_rate_admin * escalation,
                cfg.base_monthly_revenue * cfg.cost_rate_property_ops * escalation,
                cfg.base_monthly_revenue * cfg.cost_rate_it * escalation,
                cfg.base_monthly_revenue * cfg.cost_rate_utilities * fixed_split * escalation,
                total_property_value / dec!(12) * cfg.cost_rate_insurance * escalation,
                total_property_value / dec!(12) * cfg.cost_rate_property_taxes * escalation,
                cfg.base_monthly_revenue * cfg.cost_rate_other * escalation,
            )
        } else {
            (
                Decimal::ZERO,
                Decimal::ZERO,
                Decimal::ZERO,
                Decimal::ZERO,
                Decimal::ZERO,
                Decimal::ZERO,
                Decimal::ZERO,
            )
        };

        // --- GOP / fees / NOI ---
        let operating_expenses = expense_rooms
            + expense_fb
            + expense_events
            + expense_other_var
            + expense_marketing
            + expense_utilities_variable
            + expense_admin
            + expense_property_ops
            + expense_it
            + expense_utilities_fixed
            + expense_insurance
            + expense_property_taxes
            + expense_other_fixed;

        let gop = revenue_total - operating_expenses;
        let fee_base = revenue_total * cfg.base_fee_rate;
        let fee_incentive = (gop * cfg.incentive_fee_rate).max(Decimal::ZERO);
        let noi = gop - fee_base - fee_incentive - expense_ffe;

        // --- Debt service (acquisition gate only) ---
        let (interest_expense, principal_payment, debt_payment, debt_outstanding) =
            if is_acquired && cfg.is_financed && !cfg.loan_amount.is_zero() {
                let months_since_acq = months_between(cfg.acquisition_date, date).max(0) as u32;
                if months_since_acq < cfg.loan_term_months && !debt_balance.is_zero() {
                    let interest = debt_balance * monthly_rate;
                    let principal = cfg.monthly_payment - interest;
                    debt_balance = (debt_balance - principal).max(Decimal::ZERO);
                    // Recorded as the sum of its components so the split
                    // identity holds to the last decimal digit
                    (interest, principal, interest + principal, debt_balance)
                } else {
                    (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, debt_balance)
                }
            } else {
                (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
            };

        // --- Depreciation / book value (acquisition gate only) ---
        let (depreciation_expense, accumulated_depreciation, property_book_value) = if is_acquired {
            let months_since_acq = months_between(cfg.acquisition_date, date).max(0);
            let accumulated = (cfg.monthly_depreciation * Decimal::from(months_since_acq + 1))
                .min(cfg.depreciable_basis);
            (
                cfg.monthly_depreciation,
                accumulated,
                cfg.land_value + cfg.depreciable_basis - accumulated,
            )
        } else {
            (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
        };

        // --- Tax / net income (GAAP: principal is not an expense) ---
        let taxable_income = noi - interest_expense - depreciation_expense;
        let income_tax = taxable_income.max(Decimal::ZERO) * cfg.tax_rate;
        let net_income = noi - interest_expense - depreciation_expense - income_tax;

        // --- Cash flow ---
        // Summing the two legs keeps cash_flow == operating + financing
        // exact; the NOI-based form differs by an ulp once the growth
        // factors carry full-precision mantissas.
        let operating_cash_flow = net_income + depreciation_expense;
        let financing_cash_flow = -principal_payment;
        let cash_flow = operating_cash_flow + financing_cash_flow;

        let total_expenses = operating_expenses + fee_base + fee_incentive + expense_ffe;

        months.push(MonthlySnapshot {
            month_index: i,
            date,
            occupancy_rate,
            adr,
            available_room_nights,
            sold_room_nights,
            revenue_rooms,
            revenue_events,
            revenue_fb,
            revenue_other,
            revenue_total,
            expense_rooms,
            expense_fb,
            expense_events,
            expense_other_var,
            expense_marketing,
            expense_utilities_variable,
            expense_ffe,
            expense_admin,
            expense_property_ops,
            expense_it,
            expense_utilities_fixed,
            expense_insurance,
            expense_property_taxes,
            expense_other_fixed,
            gop,
            fee_base,
            fee_incentive,
            noi,
            interest_expense,
            principal_payment,
            debt_payment,
            debt_outstanding,
            depreciation_expense,
            accumulated_depreciation,
            property_book_value,
            taxable_income,
            income_tax,
            net_income,
            operating_cash_flow,
            financing_cash_flow,
            cash_flow,
            refinancing_proceeds: Decimal::ZERO,
            ending_cash: Decimal::ZERO,
            cash_shortfall: false,
            total_expenses,
        });
    }

    accumulate_cash(cfg, &mut months);

    Ok(months)
}
