//! Assumption inputs and their one-shot resolution.
//!
//! Raw inputs carry optional fields so callers only state what differs
//! from market defaults. `resolve()` applies every default exactly once
//! and precomputes the values that are constant over a run (loan amount,
//! level payment, depreciable basis, the fixed-cost revenue anchor), so
//! the engine and auditors never perform fallback resolution mid-formula.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ProFormaError;
use crate::formulas::pmt;
use crate::types::{months_between, Money, Rate};
use crate::ProFormaResult;

// ---------------------------------------------------------------------------
// Raw inputs
// ---------------------------------------------------------------------------

/// Process-wide assumptions, one instance per simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalAssumptions {
    /// First month of the projection
    pub model_start: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_cost_escalation: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_fee_rate: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incentive_fee_rate: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_cap_rate: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_commission: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<Rate>,
    /// Default annual rate for acquisition and refinance debt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt_annual_rate: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amortization_years: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquisition_ltv: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refinance_ltv: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refinance_closing_rate: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupancy_ramp_months: Option<u32>,
}

impl GlobalAssumptions {
    /// Market-default assumptions anchored at a model start date.
    pub fn for_start(model_start: NaiveDate) -> Self {
        GlobalAssumptions {
            model_start,
            fixed_cost_escalation: None,
            base_fee_rate: None,
            incentive_fee_rate: None,
            exit_cap_rate: None,
            sales_commission: None,
            tax_rate: None,
            debt_annual_rate: None,
            amortization_years: None,
            acquisition_ltv: None,
            refinance_ltv: None,
            refinance_closing_rate: None,
            occupancy_ramp_months: None,
        }
    }
}

/// How the acquisition is funded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FinancingType {
    /// Acquisition debt sized at LTV against purchase price + improvements
    Financed {
        #[serde(skip_serializing_if = "Option::is_none")]
        ltv: Option<Rate>,
        #[serde(skip_serializing_if = "Option::is_none")]
        annual_rate: Option<Rate>,
        #[serde(skip_serializing_if = "Option::is_none")]
        term_years: Option<u32>,
    },
    /// No acquisition debt
    FullEquity,
}

/// Optional refinance of the property at a fixed date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinancePlan {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ltv: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_rate: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_years: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_cost_rate: Option<Rate>,
    /// Interest-only lead-in on the new loan
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_only_months: Option<u32>,
    /// Optional minimum-DSCR sizing constraint on the new loan
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_dscr: Option<Decimal>,
}

/// One property's assumptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyAssumptions {
    pub property_name: String,
    pub operations_start: NaiveDate,
    /// Defaults to operations start when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquisition_date: Option<NaiveDate>,
    pub room_count: u32,

    // --- Occupancy ramp ---
    pub start_occupancy: Rate,
    pub max_occupancy: Rate,
    /// Occupancy added per completed ramp interval
    pub occupancy_growth_step: Rate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupancy_ramp_months: Option<u32>,

    // --- Rate ---
    pub start_adr: Money,
    /// Annual ADR growth, compounded per operational year
    pub adr_growth: Rate,

    // --- Acquisition economics ---
    pub purchase_price: Money,
    pub improvements: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub land_value_fraction: Option<Rate>,
    /// Seeded into the cash balance at the acquisition month
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_reserve: Option<Money>,
    pub financing: FinancingType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refinance: Option<RefinancePlan>,

    // --- Cost-rate overrides (fractions, see constants) ---
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_rate_rooms: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_rate_fb: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_rate_admin: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_rate_marketing: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_rate_property_ops: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_rate_utilities: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_rate_insurance: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_rate_property_taxes: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_rate_it: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_rate_ffe: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_rate_other: Option<Rate>,

    // --- Ancillary revenue overrides ---
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rev_share_events: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rev_share_fb: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rev_share_other: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catering_boost: Option<Rate>,

    // --- Fee / tax overrides ---
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_fee_rate: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incentive_fee_rate: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<Rate>,
}

/// Top-level input for one simulation: global + property assumptions
/// plus an optional horizon override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationInput {
    pub global: GlobalAssumptions,
    pub property: PropertyAssumptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizon_months: Option<usize>,
}

// ---------------------------------------------------------------------------
// Resolved assumptions
// ---------------------------------------------------------------------------

/// Refinance parameters with every default applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedRefinance {
    pub date: NaiveDate,
    pub ltv: Rate,
    pub annual_rate: Rate,
    pub term_months: u32,
    pub closing_cost_rate: Rate,
    pub interest_only_months: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_dscr: Option<Decimal>,
}

/// Fully-resolved, immutable configuration for one projection run.
/// Constructed once; every field is concrete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedAssumptions {
    pub property_name: String,
    pub model_start: NaiveDate,
    pub operations_start: NaiveDate,
    pub acquisition_date: NaiveDate,
    pub horizon_months: usize,

    pub room_count: u32,
    pub start_occupancy: Rate,
    pub max_occupancy: Rate,
    pub occupancy_growth_step: Rate,
    pub occupancy_ramp_months: u32,
    pub start_adr: Money,
    pub adr_growth: Rate,
    pub fixed_cost_escalation: Rate,
    pub days_per_month: Decimal,

    pub purchase_price: Money,
    pub improvements: Money,
    pub land_value_fraction: Rate,
    pub operating_reserve: Money,

    pub is_financed: bool,
    /// Zero for full-equity acquisitions
    pub loan_amount: Money,
    pub loan_annual_rate: Rate,
    pub loan_term_months: u32,
    /// Level payment, fixed at origination
    pub monthly_payment: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refinance: Option<ResolvedRefinance>,

    pub cost_rate_rooms: Rate,
    pub cost_rate_fb: Rate,
    pub cost_rate_admin: Rate,
    pub cost_rate_marketing: Rate,
    pub cost_rate_property_ops: Rate,
    pub cost_rate_utilities: Rate,
    pub cost_rate_insurance: Rate,
    pub cost_rate_property_taxes: Rate,
    pub cost_rate_it: Rate,
    pub cost_rate_ffe: Rate,
    pub cost_rate_other: Rate,
    pub event_expense_rate: Rate,
    pub other_expense_rate: Rate,
    pub utilities_variable_split: Rate,

    pub rev_share_events: Rate,
    pub rev_share_fb: Rate,
    pub rev_share_other: Rate,
    pub catering_boost: Rate,

    pub base_fee_rate: Rate,
    pub incentive_fee_rate: Rate,
    pub tax_rate: Rate,
    pub exit_cap_rate: Rate,
    pub sales_commission: Rate,

    // --- Derived once per run ---
    pub depreciation_years: Decimal,
    pub land_value: Money,
    pub depreciable_basis: Money,
    pub monthly_depreciation: Money,
    /// Fixed-cost anchor: month-one revenue at starting ADR/occupancy
    pub base_monthly_revenue: Money,
}

impl ResolvedAssumptions {
    /// Zero-based month index of the acquisition gate, clamped at 0.
    pub fn acquisition_month(&self) -> usize {
        months_between(self.model_start, self.acquisition_date).max(0) as usize
    }

    /// Zero-based month index of the operations gate, clamped at 0.
    pub fn operations_month(&self) -> usize {
        months_between(self.model_start, self.operations_start).max(0) as usize
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Apply defaults, validate, and precompute run-constant values.
/// Unusual but legal inputs push warnings; invalid inputs error.
pub fn resolve(
    property: &PropertyAssumptions,
    global: &GlobalAssumptions,
    horizon_months: usize,
    warnings: &mut Vec<String>,
) -> ProFormaResult<ResolvedAssumptions> {
    validate(property, global, horizon_months, warnings)?;

    let acquisition_date = property.acquisition_date.unwrap_or(property.operations_start);

    let land_value_fraction = property
        .land_value_fraction
        .unwrap_or(DEFAULT_LAND_VALUE_FRACTION);
    let total_basis = property.purchase_price + property.improvements;
    let land_value = property.purchase_price * land_value_fraction;
    let depreciable_basis =
        property.purchase_price * (Decimal::ONE - land_value_fraction) + property.improvements;
    let monthly_depreciation = depreciable_basis / DEPRECIATION_YEARS / dec!(12);

    // --- Acquisition debt ---
    let (is_financed, loan_amount, loan_annual_rate, loan_term_months) = match &property.financing {
        FinancingType::Financed {
            ltv,
            annual_rate,
            term_years,
        } => {
            let ltv = ltv
                .or(global.acquisition_ltv)
                .unwrap_or(DEFAULT_ACQUISITION_LTV);
            let rate = annual_rate
                .or(global.debt_annual_rate)
                .unwrap_or(DEFAULT_DEBT_ANNUAL_RATE);
            let years = term_years
                .or(global.amortization_years)
                .unwrap_or(DEFAULT_AMORTIZATION_YEARS);
            (true, total_basis * ltv, rate, years * 12)
        }
        FinancingType::FullEquity => (false, Decimal::ZERO, Decimal::ZERO, 0),
    };
    let monthly_payment = pmt(loan_amount, loan_annual_rate / dec!(12), loan_term_months);

    let refinance = property.refinance.as_ref().map(|plan| ResolvedRefinance {
        date: plan.date,
        ltv: plan
            .ltv
            .or(global.refinance_ltv)
            .unwrap_or(DEFAULT_REFINANCE_LTV),
        annual_rate: plan
            .annual_rate
            .or(global.debt_annual_rate)
            .unwrap_or(DEFAULT_DEBT_ANNUAL_RATE),
        term_months: plan
            .term_years
            .or(global.amortization_years)
            .unwrap_or(DEFAULT_AMORTIZATION_YEARS)
            * 12,
        closing_cost_rate: plan
            .closing_cost_rate
            .or(global.refinance_closing_rate)
            .unwrap_or(DEFAULT_REFINANCE_CLOSING_RATE),
        interest_only_months: plan.interest_only_months.unwrap_or(0),
        min_dscr: plan.min_dscr,
    });

    let rev_share_events = property.rev_share_events.unwrap_or(DEFAULT_REV_SHARE_EVENTS);
    let rev_share_fb = property.rev_share_fb.unwrap_or(DEFAULT_REV_SHARE_FB);
    let rev_share_other = property.rev_share_other.unwrap_or(DEFAULT_REV_SHARE_OTHER);
    let catering_boost = property.catering_boost.unwrap_or(DEFAULT_CATERING_BOOST);

    // Fixed-cost anchor: one month at starting ADR/occupancy including
    // ancillary streams, never re-derived during the sweep.
    let base_room_revenue = Decimal::from(property.room_count)
        * DAYS_PER_MONTH
        * property.start_occupancy
        * property.start_adr;
    let base_monthly_revenue = base_room_revenue
        * (Decimal::ONE
            + rev_share_events
            + rev_share_fb * (Decimal::ONE + catering_boost)
            + rev_share_other);

    Ok(ResolvedAssumptions {
        property_name: property.property_name.clone(),
        model_start: global.model_start,
        operations_start: property.operations_start,
        acquisition_date,
        horizon_months,

        room_count: property.room_count,
        start_occupancy: property.start_occupancy,
        max_occupancy: property.max_occupancy,
        occupancy_growth_step: property.occupancy_growth_step,
        occupancy_ramp_months: property
            .occupancy_ramp_months
            .or(global.occupancy_ramp_months)
            .unwrap_or(DEFAULT_OCCUPANCY_RAMP_MONTHS),
        start_adr: property.start_adr,
        adr_growth: property.adr_growth,
        fixed_cost_escalation: global
            .fixed_cost_escalation
            .unwrap_or(DEFAULT_FIXED_COST_ESCALATION),
        days_per_month: DAYS_PER_MONTH,

        purchase_price: property.purchase_price,
        improvements: property.improvements,
        land_value_fraction,
        operating_reserve: property.operating_reserve.unwrap_or(Decimal::ZERO),

        is_financed,
        loan_amount,
        loan_annual_rate,
        loan_term_months,
        monthly_payment,
        refinance,

        cost_rate_rooms: property.cost_rate_rooms.unwrap_or(DEFAULT_COST_RATE_ROOMS),
        cost_rate_fb: property.cost_rate_fb.unwrap_or(DEFAULT_COST_RATE_FB),
        cost_rate_admin: property.cost_rate_admin.unwrap_or(DEFAULT_COST_RATE_ADMIN),
        cost_rate_marketing: property
            .cost_rate_marketing
            .unwrap_or(DEFAULT_COST_RATE_MARKETING),
        cost_rate_property_ops: property
            .cost_rate_property_ops
            .unwrap_or(DEFAULT_COST_RATE_PROPERTY_OPS),
        cost_rate_utilities: property
            .cost_rate_utilities
            .unwrap_or(DEFAULT_COST_RATE_UTILITIES),
        cost_rate_insurance: property
            .cost_rate_insurance
            .unwrap_or(DEFAULT_COST_RATE_INSURANCE),
        cost_rate_property_taxes: property
            .cost_rate_property_taxes
            .unwrap_or(DEFAULT_COST_RATE_PROPERTY_TAXES),
        cost_rate_it: property.cost_rate_it.unwrap_or(DEFAULT_COST_RATE_IT),
        cost_rate_ffe: property.cost_rate_ffe.unwrap_or(DEFAULT_COST_RATE_FFE),
        cost_rate_other: property.cost_rate_other.unwrap_or(DEFAULT_COST_RATE_OTHER),
        event_expense_rate: DEFAULT_EVENT_EXPENSE_RATE,
        other_expense_rate: DEFAULT_OTHER_EXPENSE_RATE,
        utilities_variable_split: UTILITIES_VARIABLE_SPLIT,

        rev_share_events,
        rev_share_fb,
        rev_share_other,
        catering_boost,

        base_fee_rate: property
            .base_fee_rate
            .or(global.base_fee_rate)
            .unwrap_or(DEFAULT_BASE_FEE_RATE),
        incentive_fee_rate: property
            .incentive_fee_rate
            .or(global.incentive_fee_rate)
            .unwrap_or(DEFAULT_INCENTIVE_FEE_RATE),
        tax_rate: property
            .tax_rate
            .or(global.tax_rate)
            .unwrap_or(DEFAULT_TAX_RATE),
        exit_cap_rate: global.exit_cap_rate.unwrap_or(DEFAULT_EXIT_CAP_RATE),
        sales_commission: global.sales_commission.unwrap_or(DEFAULT_SALES_COMMISSION),

        depreciation_years: DEPRECIATION_YEARS,
        land_value,
        depreciable_basis,
        monthly_depreciation,
        base_monthly_revenue,
    })
}

fn validate(
    property: &PropertyAssumptions,
    global: &GlobalAssumptions,
    horizon_months: usize,
    warnings: &mut Vec<String>,
) -> ProFormaResult<()> {
    if horizon_months == 0 {
        return Err(ProFormaError::InvalidInput {
            field: "horizon_months".into(),
            reason: "Projection horizon must be at least 1 month".into(),
        });
    }

    if property.start_adr < Decimal::ZERO {
        return Err(ProFormaError::InvalidInput {
            field: "start_adr".into(),
            reason: "ADR cannot be negative".into(),
        });
    }

    for (field, occ) in [
        ("start_occupancy", property.start_occupancy),
        ("max_occupancy", property.max_occupancy),
    ] {
        if occ < Decimal::ZERO || occ > Decimal::ONE {
            return Err(ProFormaError::InvalidInput {
                field: field.into(),
                reason: "Occupancy must be between 0 and 1".into(),
            });
        }
    }

    if property.purchase_price < Decimal::ZERO || property.improvements < Decimal::ZERO {
        return Err(ProFormaError::InvalidInput {
            field: "purchase_price".into(),
            reason: "Acquisition amounts cannot be negative".into(),
        });
    }

    if let Some(frac) = property.land_value_fraction {
        if frac < Decimal::ZERO || frac >= Decimal::ONE {
            return Err(ProFormaError::InvalidInput {
                field: "land_value_fraction".into(),
                reason: "Land fraction must be in [0, 1)".into(),
            });
        }
    }

    if let FinancingType::Financed {
        ltv, term_years, ..
    } = &property.financing
    {
        if let Some(years) = term_years {
            if *years == 0 {
                return Err(ProFormaError::InvalidInput {
                    field: "term_years".into(),
                    reason: "Loan term must be at least 1 year".into(),
                });
            }
        }
        let ltv = ltv
            .or(global.acquisition_ltv)
            .unwrap_or(DEFAULT_ACQUISITION_LTV);
        if ltv > dec!(0.85) {
            warnings.push(format!(
                "Acquisition LTV {:.1}% exceeds 85% — high leverage",
                ltv * dec!(100)
            ));
        }
    }

    if let Some(plan) = &property.refinance {
        if plan.date < property.operations_start {
            warnings.push(
                "Refinance date precedes operations start — stabilized NOI will be zero".into(),
            );
        }
        if let Some(years) = plan.term_years {
            if years == 0 {
                return Err(ProFormaError::InvalidInput {
                    field: "refinance.term_years".into(),
                    reason: "Refinance term must be at least 1 year".into(),
                });
            }
        }
    }

    if property.room_count == 0 {
        warnings.push("Room count is zero — projection will carry no revenue".into());
    }

    if property.max_occupancy < property.start_occupancy {
        warnings.push("Max occupancy below starting occupancy — ramp will never apply".into());
    }

    if let Some(cap) = global.exit_cap_rate {
        if cap <= Decimal::ZERO {
            return Err(ProFormaError::InvalidInput {
                field: "exit_cap_rate".into(),
                reason: "Exit cap rate must be positive".into(),
            });
        }
        if cap > dec!(0.12) {
            warnings.push(format!(
                "Exit cap rate {cap} exceeds 12% — unusually high, may indicate elevated risk"
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_property() -> PropertyAssumptions {
        PropertyAssumptions {
            property_name: "Harbourview Inn".into(),
            operations_start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            acquisition_date: None,
            room_count: 10,
            start_occupancy: dec!(0.70),
            max_occupancy: dec!(0.85),
            occupancy_growth_step: dec!(0.02),
            occupancy_ramp_months: None,
            start_adr: dec!(100),
            adr_growth: dec!(0.03),
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
        }
    }

    fn sample_global() -> GlobalAssumptions {
        GlobalAssumptions::for_start(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
    }

    #[test]
    fn test_defaults_applied() {
        let mut warnings = Vec::new();
        let resolved = resolve(&sample_property(), &sample_global(), 120, &mut warnings).unwrap();

        assert_eq!(resolved.tax_rate, dec!(0.25));
        assert_eq!(resolved.base_fee_rate, dec!(0.085));
        assert_eq!(resolved.land_value_fraction, dec!(0.25));
        assert_eq!(resolved.occupancy_ramp_months, 6);
        assert_eq!(resolved.acquisition_date, resolved.operations_start);
    }

    #[test]
    fn test_loan_sized_at_default_ltv() {
        let mut warnings = Vec::new();
        let resolved = resolve(&sample_property(), &sample_global(), 120, &mut warnings).unwrap();

        // (1,000,000 + 200,000) * 0.75 = 900,000 at 9% over 25y
        assert_eq!(resolved.loan_amount, dec!(900000));
        assert_eq!(resolved.loan_term_months, 300);
        assert!(resolved.monthly_payment > dec!(7500) && resolved.monthly_payment < dec!(7600));
    }

    #[test]
    fn test_depreciable_basis() {
        let mut warnings = Vec::new();
        let resolved = resolve(&sample_property(), &sample_global(), 120, &mut warnings).unwrap();

        // 1,000,000 * 0.75 + 200,000 = 950,000
        assert_eq!(resolved.depreciable_basis, dec!(950000));
        assert_eq!(resolved.land_value, dec!(250000));
        // 950,000 / 27.5 / 12 ≈ 2,878.79
        let annual = resolved.monthly_depreciation * dec!(12);
        assert!((annual - dec!(34545.45)).abs() < dec!(0.01));
    }

    #[test]
    fn test_full_equity_zeroes_debt() {
        let mut property = sample_property();
        property.financing = FinancingType::FullEquity;
        let mut warnings = Vec::new();
        let resolved = resolve(&property, &sample_global(), 120, &mut warnings).unwrap();

        assert!(!resolved.is_financed);
        assert_eq!(resolved.loan_amount, Decimal::ZERO);
        assert_eq!(resolved.monthly_payment, Decimal::ZERO);
    }

    #[test]
    fn test_base_monthly_revenue_anchor() {
        let mut warnings = Vec::new();
        let resolved = resolve(&sample_property(), &sample_global(), 120, &mut warnings).unwrap();

        // Room base: 10 * 30.5 * 0.70 * 100 = 21,350
        // Total: 21,350 * (1 + 0.30 + 0.18*1.22 + 0.05)
        let expected = dec!(21350) * (Decimal::ONE + dec!(0.30) + dec!(0.18) * dec!(1.22) + dec!(0.05));
        assert_eq!(resolved.base_monthly_revenue, expected);
    }

    #[test]
    fn test_invalid_occupancy_rejected() {
        let mut property = sample_property();
        property.start_occupancy = dec!(1.3);
        let mut warnings = Vec::new();
        let result = resolve(&property, &sample_global(), 120, &mut warnings);
        assert!(matches!(
            result,
            Err(ProFormaError::InvalidInput { field, .. }) if field == "start_occupancy"
        ));
    }

    #[test]
    fn test_zero_rooms_warns() {
        let mut property = sample_property();
        property.room_count = 0;
        let mut warnings = Vec::new();
        resolve(&property, &sample_global(), 120, &mut warnings).unwrap();
        assert!(warnings.iter().any(|w| w.contains("Room count is zero")));
    }

    #[test]
    fn test_high_ltv_warns() {
        let mut property = sample_property();
        property.financing = FinancingType::Financed {
            ltv: Some(dec!(0.90)),
            annual_rate: None,
            term_years: None,
        };
        let mut warnings = Vec::new();
        resolve(&property, &sample_global(), 120, &mut warnings).unwrap();
        assert!(warnings.iter().any(|w| w.contains("exceeds 85%")));
    }
}
