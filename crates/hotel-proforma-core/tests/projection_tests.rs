use chrono::NaiveDate;
use hotel_proforma_core::assumptions::{
    FinancingType, GlobalAssumptions, PropertyAssumptions, RefinancePlan,
};
use hotel_proforma_core::engine::{project, RefinanceOutcome};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, 1).unwrap()
}

fn base_property(name: &str) -> PropertyAssumptions {
    PropertyAssumptions {
        property_name: name.into(),
        operations_start: date(2025, 1),
        acquisition_date: None,
        room_count: 10,
        start_occupancy: dec!(0.70),
        max_occupancy: dec!(0.70),
        occupancy_growth_step: Decimal::ZERO,
        occupancy_ramp_months: None,
        start_adr: dec!(100),
        adr_growth: Decimal::ZERO,
        purchase_price: dec!(1_000_000),
        improvements: dec!(200_000),
        land_value_fraction: None,
        operating_reserve: None,
        financing: FinancingType::FullEquity,
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

fn run(
    property: &PropertyAssumptions,
    horizon: usize,
) -> (
    hotel_proforma_core::assumptions::ResolvedAssumptions,
    hotel_proforma_core::engine::ProjectionResult,
) {
    let global = GlobalAssumptions::for_start(date(2025, 1));
    let mut warnings = Vec::new();
    project(property, &global, Some(horizon), &mut warnings).unwrap()
}

// ===========================================================================
// Known-value scenarios
// ===========================================================================

#[test]
fn test_flat_property_room_revenue() {
    // 10 rooms × $100 ADR × 70% occupancy × 30.5 nights = $21,350/month
    let (_, result) = run(&base_property("Flat Ten"), 24);
    for m in &result.months {
        assert_eq!(m.revenue_rooms, dec!(21350));
    }
}

#[test]
fn test_straight_line_depreciation_annual_charge() {
    // ($1,000,000 × 0.75 + $200,000) / 27.5 = $34,545.45 per year
    let (cfg, result) = run(&base_property("Depreciating"), 24);
    assert_eq!(cfg.depreciable_basis, dec!(950_000));

    let annual: Decimal = result
        .months
        .iter()
        .take(12)
        .map(|m| m.depreciation_expense)
        .sum();
    assert!(
        (annual - dec!(34545.45)).abs() < dec!(0.01),
        "annual depreciation {annual} off the straight-line charge"
    );
}

#[test]
fn test_financed_property_level_payment() {
    // $900k loan at 9% over 25 years pays ≈ $7,552.77/month
    let mut property = base_property("Leveraged");
    property.purchase_price = dec!(1_000_000);
    property.improvements = dec!(200_000);
    property.financing = FinancingType::Financed {
        ltv: Some(dec!(0.75)),
        annual_rate: None,
        term_years: None,
    };
    let (cfg, result) = run(&property, 24);

    assert_eq!(cfg.loan_amount, dec!(900_000));
    let payment = result.months[0].debt_payment;
    assert!(
        (payment - dec!(7552.77)).abs() < dec!(1),
        "monthly payment {payment} off the PMT value"
    );
}

// ===========================================================================
// Gating
// ===========================================================================

#[test]
fn test_pre_operations_months_are_dark() {
    let mut property = base_property("Late Opener");
    property.acquisition_date = Some(date(2025, 1));
    property.operations_start = date(2025, 7);
    property.financing = FinancingType::Financed {
        ltv: None,
        annual_rate: None,
        term_years: None,
    };
    let (_, result) = run(&property, 24);

    for m in result.months.iter().take(6) {
        assert_eq!(m.revenue_total, Decimal::ZERO, "month {}", m.month_index);
        assert_eq!(m.gop, Decimal::ZERO, "month {}", m.month_index);
        // Ownership costs run from acquisition even while dark
        assert!(m.depreciation_expense > Decimal::ZERO);
        assert!(m.debt_payment > Decimal::ZERO);
    }
    assert!(result.months[6].revenue_total > Decimal::ZERO);
}

#[test]
fn test_pre_acquisition_months_carry_nothing() {
    let mut property = base_property("Late Closer");
    property.acquisition_date = Some(date(2025, 7));
    property.operations_start = date(2026, 1);
    property.financing = FinancingType::Financed {
        ltv: None,
        annual_rate: None,
        term_years: None,
    };
    let (_, result) = run(&property, 24);

    for m in result.months.iter().take(6) {
        assert_eq!(m.depreciation_expense, Decimal::ZERO);
        assert_eq!(m.debt_payment, Decimal::ZERO);
        assert_eq!(m.property_book_value, Decimal::ZERO);
    }
    assert!(result.months[6].depreciation_expense > Decimal::ZERO);
}

// ===========================================================================
// Identities and monotonicity
// ===========================================================================

#[test]
fn test_monthly_identities_hold_everywhere() {
    let mut property = base_property("Identity Check");
    property.max_occupancy = dec!(0.85);
    property.occupancy_growth_step = dec!(0.05);
    property.adr_growth = dec!(0.03);
    property.financing = FinancingType::Financed {
        ltv: None,
        annual_rate: None,
        term_years: None,
    };
    let (_, result) = run(&property, 120);

    for m in &result.months {
        let streams = m.revenue_rooms + m.revenue_events + m.revenue_fb + m.revenue_other;
        assert_eq!(m.revenue_total, streams, "month {}", m.month_index);

        assert_eq!(
            m.debt_payment,
            m.interest_expense + m.principal_payment,
            "month {}",
            m.month_index
        );

        let ni = m.noi - m.interest_expense - m.depreciation_expense - m.income_tax;
        assert_eq!(m.net_income, ni, "month {}", m.month_index);

        assert_eq!(
            m.cash_flow,
            m.operating_cash_flow + m.financing_cash_flow,
            "month {}",
            m.month_index
        );
    }
}

#[test]
fn test_amortization_is_monotone() {
    let mut property = base_property("Amortizing");
    property.financing = FinancingType::Financed {
        ltv: None,
        annual_rate: None,
        term_years: None,
    };
    let (_, result) = run(&property, 120);

    for w in result.months.windows(2) {
        assert!(
            w[1].debt_outstanding <= w[0].debt_outstanding,
            "balance grew between months {} and {}",
            w[0].month_index,
            w[1].month_index
        );
        assert!(
            w[1].interest_expense <= w[0].interest_expense,
            "interest grew between months {} and {}",
            w[0].month_index,
            w[1].month_index
        );
    }
}

#[test]
fn test_projection_is_deterministic() {
    let mut property = base_property("Deterministic");
    property.max_occupancy = dec!(0.85);
    property.occupancy_growth_step = dec!(0.05);
    property.adr_growth = dec!(0.03);
    property.financing = FinancingType::Financed {
        ltv: None,
        annual_rate: None,
        term_years: None,
    };

    let (_, first) = run(&property, 120);
    let (_, second) = run(&property, 120);
    assert_eq!(first.months, second.months);
}

// ===========================================================================
// Refinance overlay
// ===========================================================================

fn refinancing_property() -> PropertyAssumptions {
    let mut property = base_property("Refi Candidate");
    property.room_count = 60;
    property.start_adr = dec!(180);
    property.max_occupancy = dec!(0.85);
    property.occupancy_growth_step = dec!(0.05);
    property.adr_growth = dec!(0.03);
    property.purchase_price = dec!(8_000_000);
    property.improvements = dec!(1_000_000);
    property.financing = FinancingType::Financed {
        ltv: None,
        annual_rate: None,
        term_years: None,
    };
    property.refinance = Some(RefinancePlan {
        date: date(2027, 1),
        ltv: None,
        annual_rate: Some(dec!(0.07)),
        term_years: None,
        closing_cost_rate: None,
        interest_only_months: None,
        min_dscr: None,
    });
    property
}

#[test]
fn test_refinance_preserves_pass_one_prefix() {
    let refi = refinancing_property();
    let mut plain = refi.clone();
    plain.refinance = None;

    let (_, with_refi) = run(&refi, 60);
    let (_, without) = run(&plain, 60);

    let RefinanceOutcome::Applied { month_index, .. } = &with_refi.refinance else {
        panic!("overlay should have applied");
    };
    assert_eq!(*month_index, 24);

    // Everything before the refinance month is untouched pass-1 output.
    assert_eq!(&with_refi.months[..24], &without.months[..24]);
}

#[test]
fn test_refinance_proceeds_injected_once() {
    let (_, result) = run(&refinancing_property(), 60);

    let RefinanceOutcome::Applied { month_index, event } = &result.refinance else {
        panic!("overlay should have applied");
    };
    assert!(event.proceeds >= Decimal::ZERO);

    for m in &result.months {
        if m.month_index == *month_index {
            assert_eq!(m.refinancing_proceeds, event.proceeds);
        } else {
            assert_eq!(
                m.refinancing_proceeds,
                Decimal::ZERO,
                "proceeds leaked into month {}",
                m.month_index
            );
        }
    }
}

#[test]
fn test_refinance_replaces_debt_schedule_from_index() {
    let (_, result) = run(&refinancing_property(), 60);

    let RefinanceOutcome::Applied { month_index, event } = &result.refinance else {
        panic!("overlay should have applied");
    };

    let refi_month = &result.months[*month_index];
    assert_eq!(refi_month.debt_payment, event.monthly_payment);

    // New loan amortizes monotonically from the refinance forward.
    for w in result.months[*month_index..].windows(2) {
        assert!(w[1].debt_outstanding <= w[0].debt_outstanding);
    }
}

#[test]
fn test_refinance_outside_horizon_is_skipped() {
    let mut property = refinancing_property();
    if let Some(plan) = property.refinance.as_mut() {
        plan.date = date(2045, 1);
    }
    let (_, result) = run(&property, 60);
    assert!(matches!(result.refinance, RefinanceOutcome::Skipped { .. }));
}
