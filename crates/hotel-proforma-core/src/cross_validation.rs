//! Cross-calculator validator: a second verification pass, structured
//! around cross-cutting numerical invariants rather than accounting
//! domains. A bug that slips past a section's framing still tends to
//! break one of these simpler, orthogonal checks.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::assumptions::ResolvedAssumptions;
use crate::audit::Severity;
use crate::formulas::{pmt, within_absolute_tolerance, within_tolerance, AUDIT_TOLERANCE_PCT};
use crate::types::{with_metadata, ComputationOutput, MonthlySnapshot};
use crate::ProFormaResult;

/// One cross-cutting invariant's verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossCheckResult {
    pub check: String,
    pub severity: Severity,
    pub passed: bool,
    pub detail: String,
}

impl CrossCheckResult {
    fn pass(check: &str, detail: String) -> Self {
        CrossCheckResult {
            check: check.into(),
            severity: Severity::Info,
            passed: true,
            detail,
        }
    }

    fn fail(check: &str, severity: Severity, detail: String) -> Self {
        CrossCheckResult {
            check: check.into(),
            severity,
            passed: false,
            detail,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossValidationReport {
    pub property_name: String,
    pub results: Vec<CrossCheckResult>,
    pub total_checks: usize,
    pub passed: usize,
    pub failed: usize,
    pub critical_issues: usize,
}

impl CrossValidationReport {
    fn push(&mut self, result: CrossCheckResult) {
        self.total_checks += 1;
        if result.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
            if result.severity == Severity::Critical {
                self.critical_issues += 1;
            }
        }
        self.results.push(result);
    }
}

/// Run every cross-cutting invariant over a finished snapshot sequence.
pub fn run_cross_validation(
    cfg: &ResolvedAssumptions,
    months: &[MonthlySnapshot],
) -> CrossValidationReport {
    let mut report = CrossValidationReport {
        property_name: cfg.property_name.clone(),
        results: Vec::new(),
        total_checks: 0,
        passed: 0,
        failed: 0,
        critical_issues: 0,
    };

    check_pmt_agreement(cfg, months, &mut report);
    check_debt_service_split(months, &mut report);
    check_dscr(months, &mut report);
    check_debt_yield(cfg, months, &mut report);
    check_balance_monotone(cfg, months, &mut report);
    check_interest_monotone(cfg, months, &mut report);
    check_net_income_identity(months, &mut report);
    check_cash_flow_reconciliation(months, &mut report);
    check_revenue_identity(months, &mut report);
    check_gop_identity(months, &mut report);
    check_noi_identity(months, &mut report);
    check_book_value_split(cfg, months, &mut report);
    check_zero_occupancy(months, &mut report);
    check_depreciation_rate(cfg, months, &mut report);

    report
}

/// Envelope variant for callers that want the standard output shape.
pub fn run_cross_validation_output(
    cfg: &ResolvedAssumptions,
    months: &[MonthlySnapshot],
) -> ProFormaResult<ComputationOutput<CrossValidationReport>> {
    let start = Instant::now();
    let report = run_cross_validation(cfg, months);
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Cross-Calculator Invariant Validation (orthogonal to sectional audit)",
        cfg,
        Vec::new(),
        elapsed,
        report,
    ))
}

// ---------------------------------------------------------------------------
// Debt checks
// ---------------------------------------------------------------------------

fn check_pmt_agreement(
    cfg: &ResolvedAssumptions,
    months: &[MonthlySnapshot],
    report: &mut CrossValidationReport,
) {
    const CHECK: &str = "PMT formula agreement";
    if !cfg.is_financed {
        report.push(CrossCheckResult::pass(
            CHECK,
            "property unfinanced at acquisition, no payment to verify".into(),
        ));
        return;
    }
    let expected = pmt(
        cfg.loan_amount,
        cfg.loan_annual_rate / dec!(12),
        cfg.loan_term_months,
    );
    let first_payment = months
        .iter()
        .find(|m| m.debt_payment > Decimal::ZERO)
        .map(|m| m.debt_payment);
    match first_payment {
        Some(actual) if within_tolerance(expected, actual, AUDIT_TOLERANCE_PCT) => {
            report.push(CrossCheckResult::pass(
                CHECK,
                format!("engine payment {actual:.2} matches library PMT {expected:.2}"),
            ));
        }
        Some(actual) => {
            report.push(CrossCheckResult::fail(
                CHECK,
                Severity::Critical,
                format!("engine payment {actual:.2} disagrees with library PMT {expected:.2}"),
            ));
        }
        None => {
            report.push(CrossCheckResult::fail(
                CHECK,
                Severity::Critical,
                "financed property produced no debt service payments".into(),
            ));
        }
    }
}

fn check_debt_service_split(months: &[MonthlySnapshot], report: &mut CrossValidationReport) {
    const CHECK: &str = "Debt service split";
    let bad = months
        .iter()
        .filter(|m| {
            (m.debt_payment - (m.interest_expense + m.principal_payment)).abs() > Decimal::ONE
        })
        .count();
    if bad == 0 {
        report.push(CrossCheckResult::pass(
            CHECK,
            "payment = interest + principal in every month".into(),
        ));
    } else {
        report.push(CrossCheckResult::fail(
            CHECK,
            Severity::Critical,
            format!("{bad} months where payment does not split into interest + principal"),
        ));
    }
}

fn check_dscr(months: &[MonthlySnapshot], report: &mut CrossValidationReport) {
    const CHECK: &str = "DSCR sanity";
    let mut thin_years: Vec<String> = Vec::new();
    let mut any_debt = false;
    for (year, chunk) in months.chunks(12).take(5).enumerate() {
        let noi: Decimal = chunk.iter().map(|m| m.noi).sum();
        let ds: Decimal = chunk.iter().map(|m| m.debt_payment).sum();
        if ds > Decimal::ZERO {
            any_debt = true;
            let dscr = noi / ds;
            if dscr < Decimal::ONE {
                thin_years.push(format!("year {} DSCR {dscr:.2}", year + 1));
            }
        }
    }
    if !any_debt {
        report.push(CrossCheckResult::pass(
            CHECK,
            "no debt service in the first five years".into(),
        ));
    } else if thin_years.is_empty() {
        report.push(CrossCheckResult::pass(
            CHECK,
            "DSCR ≥ 1.0 in every debt-bearing year of the first five".into(),
        ));
    } else {
        report.push(CrossCheckResult::fail(
            CHECK,
            Severity::Material,
            format!("NOI does not cover debt service: {}", thin_years.join(", ")),
        ));
    }
}

fn check_debt_yield(
    cfg: &ResolvedAssumptions,
    months: &[MonthlySnapshot],
    report: &mut CrossValidationReport,
) {
    const CHECK: &str = "Debt yield sanity";
    if !cfg.is_financed || cfg.loan_amount.is_zero() {
        report.push(CrossCheckResult::pass(CHECK, "no acquisition loan".into()));
        return;
    }
    let year_one_noi: Decimal = months.iter().take(12).map(|m| m.noi).sum();
    let debt_yield = year_one_noi / cfg.loan_amount;
    if debt_yield > Decimal::ZERO {
        report.push(CrossCheckResult::pass(
            CHECK,
            format!("year-1 debt yield {:.2}%", debt_yield * dec!(100)),
        ));
    } else {
        // Ramp-up years can legitimately run negative, so informational only.
        report.push(CrossCheckResult::fail(
            CHECK,
            Severity::Info,
            format!(
                "year-1 NOI {year_one_noi:.2} yields nothing on the {:.2} loan",
                cfg.loan_amount
            ),
        ));
    }
}

fn check_balance_monotone(
    cfg: &ResolvedAssumptions,
    months: &[MonthlySnapshot],
    report: &mut CrossValidationReport,
) {
    const CHECK: &str = "Loan balance monotonicity";
    if cfg.refinance.is_some() {
        // The refinance month legitimately steps the balance up.
        report.push(CrossCheckResult::pass(
            CHECK,
            "skipped: refinance resets the balance mid-run".into(),
        ));
        return;
    }
    let increases = months
        .windows(2)
        .filter(|w| w[1].debt_outstanding > w[0].debt_outstanding + Decimal::ONE)
        .count();
    if increases == 0 {
        report.push(CrossCheckResult::pass(
            CHECK,
            "outstanding balance never increases".into(),
        ));
    } else {
        report.push(CrossCheckResult::fail(
            CHECK,
            Severity::Critical,
            format!("balance increases in {increases} month transitions without a refinance"),
        ));
    }
}

fn check_interest_monotone(
    cfg: &ResolvedAssumptions,
    months: &[MonthlySnapshot],
    report: &mut CrossValidationReport,
) {
    const CHECK: &str = "Interest expense monotonicity";
    if cfg.refinance.is_some() {
        report.push(CrossCheckResult::pass(
            CHECK,
            "skipped: refinance resets the interest schedule mid-run".into(),
        ));
        return;
    }
    let increases = months
        .windows(2)
        .filter(|w| {
            w[0].interest_expense > Decimal::ZERO
                && w[1].interest_expense > w[0].interest_expense + Decimal::ONE
        })
        .count();
    if increases == 0 {
        report.push(CrossCheckResult::pass(
            CHECK,
            "interest expense never increases over an amortizing loan's life".into(),
        ));
    } else {
        report.push(CrossCheckResult::fail(
            CHECK,
            Severity::Material,
            format!("interest expense increases in {increases} month transitions"),
        ));
    }
}

// ---------------------------------------------------------------------------
// Identity checks
// ---------------------------------------------------------------------------

fn check_net_income_identity(months: &[MonthlySnapshot], report: &mut CrossValidationReport) {
    const CHECK: &str = "Net income identity";
    let bad = months
        .iter()
        .filter(|m| {
            let expected = m.noi - m.interest_expense - m.depreciation_expense - m.income_tax;
            !within_absolute_tolerance(expected, m.net_income, Decimal::ONE)
        })
        .count();
    push_identity(report, CHECK, bad, Severity::Critical, "NOI − interest − depreciation − tax");
}

fn check_cash_flow_reconciliation(months: &[MonthlySnapshot], report: &mut CrossValidationReport) {
    const CHECK: &str = "Cash flow statement reconciliation";
    let bad = months
        .iter()
        .filter(|m| {
            let expected = m.operating_cash_flow + m.financing_cash_flow;
            !within_absolute_tolerance(expected, m.cash_flow, Decimal::ONE)
        })
        .count();
    push_identity(report, CHECK, bad, Severity::Critical, "operating CF + financing CF");
}

fn check_revenue_identity(months: &[MonthlySnapshot], report: &mut CrossValidationReport) {
    const CHECK: &str = "Revenue stream identity";
    let bad = months
        .iter()
        .filter(|m| {
            let expected = m.revenue_rooms + m.revenue_events + m.revenue_fb + m.revenue_other;
            !within_absolute_tolerance(expected, m.revenue_total, Decimal::ONE)
        })
        .count();
    push_identity(report, CHECK, bad, Severity::Critical, "sum of the four revenue streams");
}

fn check_gop_identity(months: &[MonthlySnapshot], report: &mut CrossValidationReport) {
    const CHECK: &str = "GOP identity";
    let bad = months
        .iter()
        .filter(|m| {
            let opex = m.expense_rooms
                + m.expense_fb
                + m.expense_events
                + m.expense_other_var
                + m.expense_marketing
                + m.expense_utilities_variable
                + m.expense_admin
                + m.expense_property_ops
                + m.expense_it
                + m.expense_utilities_fixed
                + m.expense_insurance
                + m.expense_property_taxes
                + m.expense_other_fixed;
            !within_absolute_tolerance(m.revenue_total - opex, m.gop, Decimal::ONE)
        })
        .count();
    push_identity(report, CHECK, bad, Severity::Critical, "revenue − operating expenses");
}

fn check_noi_identity(months: &[MonthlySnapshot], report: &mut CrossValidationReport) {
    const CHECK: &str = "NOI identity";
    let bad = months
        .iter()
        .filter(|m| {
            let expected = m.gop - m.fee_base - m.fee_incentive - m.expense_ffe;
            !within_absolute_tolerance(expected, m.noi, Decimal::ONE)
        })
        .count();
    push_identity(report, CHECK, bad, Severity::Critical, "GOP − fees − FF&E reserve");
}

fn push_identity(
    report: &mut CrossValidationReport,
    check: &str,
    bad: usize,
    severity: Severity,
    formula: &str,
) {
    if bad == 0 {
        report.push(CrossCheckResult::pass(
            check,
            format!("{formula} holds in every month"),
        ));
    } else {
        report.push(CrossCheckResult::fail(
            check,
            severity,
            format!("{formula} broken in {bad} months"),
        ));
    }
}

// ---------------------------------------------------------------------------
// Asset checks
// ---------------------------------------------------------------------------

fn check_book_value_split(
    cfg: &ResolvedAssumptions,
    months: &[MonthlySnapshot],
    report: &mut CrossValidationReport,
) {
    const CHECK: &str = "Book value land/building split";
    let bad = months
        .iter()
        .filter(|m| m.property_book_value > Decimal::ZERO)
        .filter(|m| {
            let expected = cfg.land_value + cfg.depreciable_basis - m.accumulated_depreciation;
            !within_tolerance(expected, m.property_book_value, dec!(0.05))
        })
        .count();
    if bad == 0 {
        report.push(CrossCheckResult::pass(
            CHECK,
            "book value tracks land + basis − accumulated depreciation".into(),
        ));
    } else {
        report.push(CrossCheckResult::fail(
            CHECK,
            Severity::Material,
            format!("book value deviates more than 5% from the asset split in {bad} months"),
        ));
    }
}

fn check_zero_occupancy(months: &[MonthlySnapshot], report: &mut CrossValidationReport) {
    const CHECK: &str = "Zero occupancy implies zero revenue";
    let bad = months
        .iter()
        .filter(|m| m.occupancy_rate.is_zero() && !m.revenue_total.is_zero())
        .count();
    if bad == 0 {
        report.push(CrossCheckResult::pass(
            CHECK,
            "every zero-occupancy month books zero revenue".into(),
        ));
    } else {
        report.push(CrossCheckResult::fail(
            CHECK,
            Severity::Critical,
            format!("{bad} months book revenue with zero occupancy"),
        ));
    }
}

fn check_depreciation_rate(
    cfg: &ResolvedAssumptions,
    months: &[MonthlySnapshot],
    report: &mut CrossValidationReport,
) {
    const CHECK: &str = "Straight-line depreciation rate";
    let expected = cfg.depreciable_basis / cfg.depreciation_years / dec!(12);
    let bad = months
        .iter()
        .filter(|m| m.depreciation_expense > Decimal::ZERO)
        .filter(|m| {
            // The final charge may be a stub once the basis is exhausted.
            m.accumulated_depreciation < cfg.depreciable_basis
                && !within_absolute_tolerance(expected, m.depreciation_expense, dec!(1.0))
        })
        .count();
    if bad == 0 {
        report.push(CrossCheckResult::pass(
            CHECK,
            format!("every active month charges {expected:.2}"),
        ));
    } else {
        report.push(CrossCheckResult::fail(
            CHECK,
            Severity::Material,
            format!("{bad} months deviate from the straight-line monthly charge"),
        ));
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Plain-text rendering of the validator's verdicts, one line per check.
pub fn render_cross_validation(report: &CrossValidationReport) -> String {
    let mut out = String::new();
    let rule = "─".repeat(78);
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format!(
        "CROSS-CALCULATOR VALIDATION — {}\n",
        report.property_name
    ));
    out.push_str(&rule);
    out.push('\n');
    for r in &report.results {
        let mark = if r.passed { "PASS" } else { "FAIL" };
        out.push_str(&format!("[{mark}] {} — {}\n", r.check, r.detail));
    }
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format!(
        "{} checks, {} passed, {} failed ({} critical)\n",
        report.total_checks, report.passed, report.failed, report.critical_issues
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{FinancingType, GlobalAssumptions, PropertyAssumptions};
    use crate::engine::project;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn financed_property() -> (PropertyAssumptions, GlobalAssumptions) {
        let global = GlobalAssumptions::for_start(date(2025, 1));
        let property = PropertyAssumptions {
            property_name: "Crosscheck Hotel".into(),
            operations_start: date(2025, 1),
            acquisition_date: None,
            room_count: 40,
            start_occupancy: dec!(0.60),
            max_occupancy: dec!(0.80),
            occupancy_growth_step: dec!(0.05),
            occupancy_ramp_months: None,
            start_adr: dec!(150),
            adr_growth: dec!(0.03),
            purchase_price: dec!(4000000),
            improvements: dec!(500000),
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
        (property, global)
    }

    #[test]
    fn test_clean_projection_passes_all_checks() {
        let (property, global) = financed_property();
        let mut warnings = Vec::new();
        let (cfg, result) = project(&property, &global, Some(60), &mut warnings).unwrap();

        let report = run_cross_validation(&cfg, &result.months);
        assert_eq!(report.failed, 0, "unexpected failures: {:#?}", report.results);
        assert_eq!(report.total_checks, 14);
        assert_eq!(report.critical_issues, 0);
    }

    #[test]
    fn test_corrupted_snapshot_is_caught() {
        let (property, global) = financed_property();
        let mut warnings = Vec::new();
        let (cfg, mut result) = project(&property, &global, Some(60), &mut warnings).unwrap();

        // Substitute the wrong cash-basis formula into one month's net income.
        let m = &mut result.months[24];
        m.net_income = m.noi - m.debt_payment;

        let report = run_cross_validation(&cfg, &result.months);
        assert!(report.critical_issues >= 1);
        let ni = report
            .results
            .iter()
            .find(|r| r.check == "Net income identity")
            .unwrap();
        assert!(!ni.passed);
    }

    #[test]
    fn test_render_lists_every_check() {
        let (property, global) = financed_property();
        let mut warnings = Vec::new();
        let (cfg, result) = project(&property, &global, Some(24), &mut warnings).unwrap();

        let report = run_cross_validation(&cfg, &result.months);
        let text = render_cross_validation(&report);
        assert!(text.contains("CROSS-CALCULATOR VALIDATION"));
        assert!(text.contains("[PASS]"));
        assert!(text.contains("14 checks"));
    }
}
