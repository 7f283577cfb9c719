//! Pass 2: refinance sizing and overlay.
//!
//! The new loan is sized by capitalizing stabilized NOI at the exit cap
//! rate and applying the refinance LTV (optionally capped by a minimum
//! DSCR). The overlay maps the pass-1 sequence into a new sequence whose
//! tail, from the refinance month forward, carries the new loan's debt
//! service; proceeds hit cash exactly once.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::assumptions::ResolvedAssumptions;
use crate::engine::{accumulate_cash, RefinanceEvent, RefinanceOutcome};
use crate::formulas::{compound_factor, pmt};
use crate::types::{months_between, Money, MonthlySnapshot, Rate};
use crate::ProFormaResult;

/// One period of an amortization schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulePeriod {
    pub period: u32,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub ending_balance: Money,
}

/// Build a full schedule with an optional interest-only lead-in and a
/// final-period balloon cleanup that retires any residual balance.
pub fn build_schedule(
    principal_amount: Money,
    monthly_rate: Rate,
    term_months: u32,
    interest_only_months: u32,
) -> Vec<SchedulePeriod> {
    if principal_amount.is_zero() || term_months == 0 {
        return Vec::new();
    }

    let io_months = interest_only_months.min(term_months.saturating_sub(1));
    let amortizing_payment = pmt(
        principal_amount,
        monthly_rate,
        term_months - io_months,
    );

    let mut schedule = Vec::with_capacity(term_months as usize);
    let mut balance = principal_amount;

    for period in 0..term_months {
        let interest = balance * monthly_rate;
        let (payment, principal) = if period < io_months {
            (interest, Decimal::ZERO)
        } else if period == term_months - 1 {
            // Retire whatever remains, absorbing rounding drift
            (interest + balance, balance)
        } else {
            // Reconstructed from the split so payment == interest +
            // principal exactly even at full mantissa width
            let principal = amortizing_payment - interest;
            (interest + principal, principal)
        };

        balance = (balance - principal).max(Decimal::ZERO);
        schedule.push(SchedulePeriod {
            period,
            payment,
            interest,
            principal,
            ending_balance: balance,
        });
    }

    schedule
}

/// Stabilized annual NOI for the refinance operating year. A partial
/// year is annualized so a mid-ramp refinance is not undersized; zero
/// operational months yields zero.
pub fn stabilized_annual_noi(months: &[MonthlySnapshot], refinance_index: usize) -> Money {
    let year = refinance_index / 12;
    let start = year * 12;
    let end = (start + 12).min(months.len());
    let slice = &months[start..end];

    let raw: Decimal = slice.iter().map(|m| m.noi).sum();
    let operational = slice
        .iter()
        .filter(|m| m.revenue_total > Decimal::ZERO || !m.noi.is_zero())
        .count();

    if operational == 0 {
        Decimal::ZERO
    } else if operational < 12 {
        raw / Decimal::from(operational as u32) * dec!(12)
    } else {
        raw
    }
}

/// Run the overlay. Any invalid sizing input skips the overlay and
/// leaves pass-1 values standing, with the reason surfaced.
pub fn apply_overlay(
    cfg: &ResolvedAssumptions,
    pass_one: Vec<MonthlySnapshot>,
    warnings: &mut Vec<String>,
) -> ProFormaResult<(Vec<MonthlySnapshot>, RefinanceOutcome)> {
    let Some(refi) = &cfg.refinance else {
        return Ok((pass_one, RefinanceOutcome::NotRequested));
    };

    let index = months_between(cfg.model_start, refi.date);
    if index < 0 || index as usize >= cfg.horizon_months {
        return Ok(skip(
            pass_one,
            format!("refinance date {} falls outside the projection horizon", refi.date),
            warnings,
        ));
    }
    let refinance_index = index as usize;

    let stabilized_noi = stabilized_annual_noi(&pass_one, refinance_index);
    if stabilized_noi <= Decimal::ZERO {
        return Ok(skip(
            pass_one,
            format!("stabilized NOI {stabilized_noi:.2} is not positive at the refinance date"),
            warnings,
        ));
    }

    let property_valuation = stabilized_noi / cfg.exit_cap_rate;
    let mut gross_loan = property_valuation * refi.ltv;

    // Optional DSCR sizing cap: L <= NOI / (12 * k * DSCRmin) where k is
    // the payment constant per dollar of loan.
    if let Some(min_dscr) = refi.min_dscr {
        if min_dscr > Decimal::ZERO && !refi.annual_rate.is_zero() {
            let monthly_rate = refi.annual_rate / dec!(12);
            let amortizing = refi.term_months - refi.interest_only_months.min(refi.term_months - 1);
            let compound = compound_factor(monthly_rate, amortizing);
            let payment_constant = monthly_rate * compound / (compound - Decimal::ONE);
            let dscr_cap = stabilized_noi / (dec!(12) * payment_constant * min_dscr);
            if dscr_cap < gross_loan {
                warnings.push(format!(
                    "Refinance loan reduced from {gross_loan:.0} to {dscr_cap:.0} by the {min_dscr} DSCR floor"
                ));
                gross_loan = dscr_cap;
            }
        }
    }

    if gross_loan <= Decimal::ZERO {
        return Ok(skip(
            pass_one,
            "refinance sizing produced a non-positive loan amount".into(),
            warnings,
        ));
    }

    let closing_costs = gross_loan * refi.closing_cost_rate;
    let net_proceeds = gross_loan - closing_costs;
    let payoff_balance = if refinance_index == 0 {
        cfg.loan_amount
    } else {
        pass_one[refinance_index - 1].debt_outstanding
    };
    let proceeds = (net_proceeds - payoff_balance).max(Decimal::ZERO);

    let schedule = build_schedule(
        gross_loan,
        refi.annual_rate / dec!(12),
        refi.term_months,
        refi.interest_only_months,
    );
    let monthly_payment = schedule
        .iter()
        .find(|p| p.principal > Decimal::ZERO)
        .map(|p| p.payment)
        .unwrap_or(Decimal::ZERO);

    // --- Overlay: rebuild the tail on the new schedule ---
    let mut months = pass_one;
    for snapshot in months.iter_mut().skip(refinance_index) {
        let k = snapshot.month_index - refinance_index;
        let (interest, principal, payment, balance) = match schedule.get(k) {
            Some(p) => (p.interest, p.principal, p.payment, p.ending_balance),
            None => (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
        };

        snapshot.interest_expense = interest;
        snapshot.principal_payment = principal;
        snapshot.debt_payment = payment;
        snapshot.debt_outstanding = balance;

        snapshot.taxable_income =
            snapshot.noi - interest - snapshot.depreciation_expense;
        snapshot.income_tax = snapshot.taxable_income.max(Decimal::ZERO) * cfg.tax_rate;
        snapshot.net_income =
            snapshot.noi - interest - snapshot.depreciation_expense - snapshot.income_tax;

        snapshot.operating_cash_flow = snapshot.net_income + snapshot.depreciation_expense;
        snapshot.financing_cash_flow = -principal;
        if snapshot.month_index == refinance_index {
            snapshot.refinancing_proceeds = proceeds;
            snapshot.financing_cash_flow += proceeds;
        }
        // Summed after proceeds land so the reconciliation stays exact
        snapshot.cash_flow = snapshot.operating_cash_flow + snapshot.financing_cash_flow;
    }

    // Later months changed, so the running balance is re-derived from
    // month 0 rather than patched.
    accumulate_cash(cfg, &mut months);

    let event = RefinanceEvent {
        stabilized_noi,
        property_valuation,
        gross_loan,
        closing_costs,
        payoff_balance,
        proceeds,
        monthly_payment,
    };

    Ok((
        months,
        RefinanceOutcome::Applied {
            month_index: refinance_index,
            event,
        },
    ))
}

fn skip(
    pass_one: Vec<MonthlySnapshot>,
    reason: String,
    warnings: &mut Vec<String>,
) -> (Vec<MonthlySnapshot>, RefinanceOutcome) {
    warnings.push(format!("Refinance overlay skipped: {reason}"));
    (pass_one, RefinanceOutcome::Skipped { reason })
}
