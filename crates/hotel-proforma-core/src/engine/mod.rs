//! Two-pass monthly projection engine.
//!
//! Pass 1 is a linear month-by-month sweep with no look-ahead. Pass 2,
//! when a refinance plan is present, sizes a new loan off stabilized NOI
//! and produces a *new* snapshot sequence with the tail from the
//! refinance month recomputed — pass-1 output is never mutated in place.

pub mod projection;
pub mod refinance;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::assumptions::{resolve, GlobalAssumptions, PropertyAssumptions, ResolvedAssumptions};
use crate::constants::DEFAULT_HORIZON_MONTHS;
use crate::types::{with_metadata, ComputationOutput, Money, MonthlySnapshot};
use crate::ProFormaResult;

/// The sized refinance loan, recorded when the overlay applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceEvent {
    pub stabilized_noi: Money,
    pub property_valuation: Money,
    pub gross_loan: Money,
    pub closing_costs: Money,
    pub payoff_balance: Money,
    /// Cash released to equity, injected once in the refinance month
    pub proceeds: Money,
    pub monthly_payment: Money,
}

/// Whether the refinance overlay ran, and why not if it didn't.
/// A skipped overlay is a visible condition, never a silent fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefinanceOutcome {
    NotRequested,
    Applied {
        month_index: usize,
        event: RefinanceEvent,
    },
    Skipped {
        reason: String,
    },
}

impl RefinanceOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RefinanceOutcome::Applied { .. })
    }
}

/// Full projection output: the snapshot sequence plus the refinance
/// disposition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub months: Vec<MonthlySnapshot>,
    pub refinance: RefinanceOutcome,
}

/// Resolve assumptions and run both passes. The resolved configuration
/// is returned alongside the result so verification layers re-derive
/// from the same inputs the engine used.
pub fn project(
    property: &PropertyAssumptions,
    global: &GlobalAssumptions,
    horizon_months: Option<usize>,
    warnings: &mut Vec<String>,
) -> ProFormaResult<(ResolvedAssumptions, ProjectionResult)> {
    let horizon = horizon_months.unwrap_or(DEFAULT_HORIZON_MONTHS);
    let resolved = resolve(property, global, horizon, warnings)?;

    let pass_one = projection::project_months(&resolved)?;

    let (months, outcome) = if resolved.refinance.is_some() {
        refinance::apply_overlay(&resolved, pass_one, warnings)?
    } else {
        (pass_one, RefinanceOutcome::NotRequested)
    };

    if months.iter().any(|m| m.cash_shortfall) {
        let first = months
            .iter()
            .find(|m| m.cash_shortfall)
            .map(|m| m.month_index)
            .unwrap_or(0);
        warnings.push(format!(
            "Cash balance goes negative (first shortfall at month {first})"
        ));
    }

    Ok((resolved, ProjectionResult { months, refinance: outcome }))
}

/// Public entry point: run the projection and wrap it in the standard
/// computation envelope.
pub fn run_projection(
    property: &PropertyAssumptions,
    global: &GlobalAssumptions,
    horizon_months: Option<usize>,
) -> ProFormaResult<ComputationOutput<ProjectionResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let (resolved, result) = project(property, global, horizon_months, &mut warnings)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Hotel Pro Forma Monthly Projection (USALI, two-pass with refinance overlay)",
        &resolved,
        warnings,
        elapsed,
        result,
    ))
}

/// Ending cash re-accumulation shared by pass 1 and the overlay: a
/// running sum of monthly cash flow from month 0, seeded with the
/// operating reserve at the acquisition month.
pub(crate) fn accumulate_cash(cfg: &ResolvedAssumptions, months: &mut [MonthlySnapshot]) {
    let acquisition_month = cfg.acquisition_month();
    let mut cumulative = Decimal::ZERO;
    for snapshot in months.iter_mut() {
        if snapshot.month_index == acquisition_month {
            cumulative += cfg.operating_reserve;
        }
        cumulative += snapshot.cash_flow;
        snapshot.ending_cash = cumulative;
        snapshot.cash_shortfall = cumulative < Decimal::ZERO;
    }
}
