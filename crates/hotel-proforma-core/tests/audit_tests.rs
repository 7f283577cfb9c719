use chrono::NaiveDate;
use hotel_proforma_core::assumptions::{FinancingType, GlobalAssumptions, PropertyAssumptions};
use hotel_proforma_core::audit::{render_workpaper, run_full_audit, Opinion, Severity};
use hotel_proforma_core::cross_validation::run_cross_validation;
use hotel_proforma_core::engine::project;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, 1).unwrap()
}

fn sample_property() -> PropertyAssumptions {
    PropertyAssumptions {
        property_name: "Audited Hotel".into(),
        operations_start: date(2025, 1),
        acquisition_date: None,
        room_count: 50,
        start_occupancy: dec!(0.62),
        max_occupancy: dec!(0.82),
        occupancy_growth_step: dec!(0.05),
        occupancy_ramp_months: None,
        start_adr: dec!(165),
        adr_growth: dec!(0.03),
        purchase_price: dec!(6_000_000),
        improvements: dec!(750_000),
        land_value_fraction: None,
        operating_reserve: Some(dec!(250_000)),
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

fn run(
    horizon: usize,
) -> (
    hotel_proforma_core::assumptions::ResolvedAssumptions,
    hotel_proforma_core::engine::ProjectionResult,
) {
    let global = GlobalAssumptions::for_start(date(2025, 1));
    let mut warnings = Vec::new();
    project(&sample_property(), &global, Some(horizon), &mut warnings).unwrap()
}

// ===========================================================================
// Clean model
// ===========================================================================

#[test]
fn test_clean_model_earns_unqualified_opinion() {
    let (cfg, result) = run(120);
    let report = run_full_audit(&cfg, &result.months);

    assert_eq!(report.critical_issues, 0, "{:#?}", report.sections);
    assert_eq!(report.material_issues, 0);
    assert_eq!(report.total_failed, 0);
    assert_eq!(report.opinion, Opinion::Unqualified);
    assert_eq!(report.sections.len(), 7);
    // Positive evidence, not silence-on-success
    assert!(report.total_passed > 0);
}

#[test]
fn test_clean_model_passes_cross_validation() {
    let (cfg, result) = run(120);
    let report = run_cross_validation(&cfg, &result.months);

    assert_eq!(report.failed, 0, "{:#?}", report.results);
    assert_eq!(report.critical_issues, 0);
}

#[test]
fn test_audit_is_read_only() {
    let (cfg, result) = run(60);
    let before = result.months.clone();
    let _ = run_full_audit(&cfg, &result.months);
    let _ = run_cross_validation(&cfg, &result.months);
    assert_eq!(before, result.months);
}

// ===========================================================================
// Seeded defects
// ===========================================================================

#[test]
fn test_principal_in_net_income_is_flagged_critical() {
    let (cfg, mut result) = run(60);

    // The cash-basis shortcut: NOI − total debt service masquerading
    // as net income. Numerically plausible, GAAP-wrong.
    for m in result.months.iter_mut().skip(12).take(3) {
        m.net_income = m.noi - m.debt_payment;
    }

    let report = run_full_audit(&cfg, &result.months);
    assert!(report.critical_issues > 0);
    assert_ne!(report.opinion, Opinion::Unqualified);

    let income = report
        .sections
        .iter()
        .find(|s| s.name.contains("Income Statement"))
        .unwrap();
    assert!(income
        .findings
        .iter()
        .any(|f| !f.passed && f.rule.contains("Principal In Net Income")));
}

#[test]
fn test_widespread_corruption_earns_adverse_opinion() {
    let (cfg, mut result) = run(60);

    // Break the revenue identity across many months; detail is capped
    // but the criticals that do surface push past the adverse threshold.
    for m in result.months.iter_mut().skip(6).take(10) {
        m.revenue_total += dec!(50_000);
    }

    let report = run_full_audit(&cfg, &result.months);
    assert!(report.critical_issues > 3, "got {}", report.critical_issues);
    assert_eq!(report.opinion, Opinion::Adverse);
}

#[test]
fn test_negative_incentive_fee_is_always_critical() {
    let (cfg, mut result) = run(60);
    result.months[20].fee_incentive = dec!(-1);

    let report = run_full_audit(&cfg, &result.months);
    let fees = report
        .sections
        .iter()
        .find(|s| s.name.contains("Management Fee"))
        .unwrap();
    assert!(fees.failures(Severity::Critical) >= 1);
}

#[test]
fn test_widespread_negative_incentive_caps_detail() {
    let (cfg, mut result) = run(60);
    for m in result.months.iter_mut().skip(12).take(12) {
        m.fee_incentive = dec!(-250);
    }

    let report = run_full_audit(&cfg, &result.months);
    let fees = report
        .sections
        .iter()
        .find(|s| s.name.contains("Management Fee"))
        .unwrap();

    // Three per-month findings, then one systemic rollup; the section
    // never grows one finding per corrupt month.
    let detailed = fees
        .findings
        .iter()
        .filter(|f| !f.passed && f.rule == "Negative Incentive Fee")
        .count();
    assert_eq!(detailed, 3);
    assert!(fees
        .findings
        .iter()
        .any(|f| !f.passed
            && f.severity == Severity::Critical
            && f.rule.contains("Systemic")));
    assert_eq!(fees.failures(Severity::Critical), 4);
    assert_eq!(report.opinion, Opinion::Adverse);
}

#[test]
fn test_pre_operations_revenue_is_flagged() {
    let (cfg, mut result) = {
        let mut property = sample_property();
        property.acquisition_date = Some(date(2025, 1));
        property.operations_start = date(2025, 7);
        let global = GlobalAssumptions::for_start(date(2025, 1));
        let mut warnings = Vec::new();
        project(&property, &global, Some(60), &mut warnings).unwrap()
    };

    result.months[2].revenue_total = dec!(10_000);

    let report = run_full_audit(&cfg, &result.months);
    let timing = report
        .sections
        .iter()
        .find(|s| s.name.contains("Timing"))
        .unwrap();
    assert!(timing.failures(Severity::Critical) >= 1);
}

#[test]
fn test_depreciation_drift_is_material() {
    let (cfg, mut result) = run(60);
    // A 10% overcharge well past the 1% relative tolerance
    result.months[5].depreciation_expense *= dec!(1.10);

    let report = run_full_audit(&cfg, &result.months);
    let dep = report
        .sections
        .iter()
        .find(|s| s.name.contains("Depreciation"))
        .unwrap();
    assert!(dep.failures(Severity::Material) >= 1);
}

// ===========================================================================
// Workpaper rendering
// ===========================================================================

#[test]
fn test_workpaper_contains_opinion_and_sections() {
    let (cfg, result) = run(60);
    let report = run_full_audit(&cfg, &result.months);
    let text = render_workpaper(&report);

    assert!(text.contains("INDEPENDENT VERIFICATION WORKPAPER"));
    assert!(text.contains("Audited Hotel"));
    assert!(text.contains("OPINION: UNQUALIFIED"));
    for section in &report.sections {
        assert!(text.contains(&section.name), "missing {}", section.name);
    }
}

#[test]
fn test_workpaper_shows_remediation_for_failures() {
    let (cfg, mut result) = run(60);
    result.months[20].fee_incentive = dec!(-500);

    let report = run_full_audit(&cfg, &result.months);
    let text = render_workpaper(&report);
    assert!(text.contains("[FAIL]"));
    assert!(text.contains("remediation:"));
}

// ===========================================================================
// Tolerance behaviour exercised end-to-end
// ===========================================================================

#[test]
fn test_hairline_rounding_does_not_fail_the_audit() {
    let (cfg, mut result) = run(60);
    // Sub-cent noise on a five-figure balance stays inside tolerance
    result.months[30].depreciation_expense += dec!(0.001);
    result.months[30].ending_cash += dec!(0.001);

    let report = run_full_audit(&cfg, &result.months);
    assert_eq!(report.critical_issues, 0);
    assert_eq!(report.opinion, Opinion::Unqualified);
}

#[test]
fn test_multi_property_runs_are_independent() {
    let global = GlobalAssumptions::for_start(date(2025, 1));

    let mut warnings_a = Vec::new();
    let (cfg_a, run_a) =
        project(&sample_property(), &global, Some(60), &mut warnings_a).unwrap();

    let mut flawed = sample_property();
    flawed.property_name = "Flawed Hotel".into();
    let mut warnings_b = Vec::new();
    let (cfg_b, mut run_b) = project(&flawed, &global, Some(60), &mut warnings_b).unwrap();
    for m in run_b.months.iter_mut() {
        m.net_income = Decimal::ZERO;
    }

    let report_a = run_full_audit(&cfg_a, &run_a.months);
    let report_b = run_full_audit(&cfg_b, &run_b.months);

    assert_eq!(report_a.opinion, Opinion::Unqualified);
    assert_ne!(report_b.opinion, Opinion::Unqualified);
    assert_eq!(report_a.property_name, "Audited Hotel");
    assert_eq!(report_b.property_name, "Flawed Hotel");
}
