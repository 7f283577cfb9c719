//! Independent verification engine.
//!
//! Seven sections each re-derive one accounting domain from the
//! *inputs* the engine ran on, never from another section's output, and
//! compare to the engine's snapshots. Findings are graded, aggregated,
//! and condensed into a GAAP-style opinion. Accounting identities here
//! are written out independently of the engine on purpose; only the
//! arithmetic primitives (PMT, tolerance) are shared.

pub mod amortization;
pub mod balance_sheet;
pub mod cash_flow;
pub mod depreciation;
pub mod fees;
pub mod income_statement;
pub mod timing;
pub mod types;

use std::time::Instant;

use crate::assumptions::ResolvedAssumptions;
use crate::formulas::ADVERSE_CRITICAL_THRESHOLD;
use crate::types::{with_metadata, ComputationOutput, MonthlySnapshot};
use crate::ProFormaResult;

pub use types::{AuditFinding, AuditReport, AuditSection, Opinion, Severity};

/// Run all seven sections and aggregate into a report with an opinion.
pub fn run_full_audit(cfg: &ResolvedAssumptions, months: &[MonthlySnapshot]) -> AuditReport {
    let sections = vec![
        timing::audit_timing(cfg, months),
        depreciation::audit_depreciation(cfg, months),
        amortization::audit_amortization(cfg, months),
        income_statement::audit_income_statement(cfg, months),
        fees::audit_management_fees(cfg, months),
        balance_sheet::audit_balance_sheet(cfg, months),
        cash_flow::audit_cash_flow(cfg, months),
    ];

    let total_checks: usize = sections.iter().map(|s| s.passed + s.failed).sum();
    let total_passed: usize = sections.iter().map(|s| s.passed).sum();
    let total_failed: usize = sections.iter().map(|s| s.failed).sum();
    let critical_issues: usize = sections.iter().map(|s| s.failures(Severity::Critical)).sum();
    let material_issues: usize = sections.iter().map(|s| s.material_issues).sum();

    let (opinion, opinion_text) = derive_opinion(critical_issues, material_issues);

    AuditReport {
        timestamp: chrono::Utc::now().to_rfc3339(),
        auditor_name: "Independent Model Verification".into(),
        property_name: cfg.property_name.clone(),
        sections,
        total_checks,
        total_passed,
        total_failed,
        critical_issues,
        material_issues,
        opinion,
        opinion_text,
    }
}

/// Audit entry point wrapped in the standard computation envelope.
pub fn run_full_audit_output(
    cfg: &ResolvedAssumptions,
    months: &[MonthlySnapshot],
) -> ProFormaResult<ComputationOutput<AuditReport>> {
    let start = Instant::now();
    let report = run_full_audit(cfg, months);
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Independent Verification (7-section audit with GAAP-style opinion)",
        cfg,
        Vec::new(),
        elapsed,
        report,
    ))
}

/// Opinion from issue counts. Criticals up to the threshold still allow
/// a qualified opinion (adjustment needed); beyond it the projections
/// cannot be relied on.
pub fn derive_opinion(critical_issues: usize, material_issues: usize) -> (Opinion, String) {
    if critical_issues == 0 && material_issues == 0 {
        (
            Opinion::Unqualified,
            "In our opinion, the financial projections present fairly, in all material \
             respects, the projected results of operations and cash flows of the property, \
             in conformity with the stated assumptions and USALI-consistent accounting."
                .into(),
        )
    } else if critical_issues == 0 {
        (
            Opinion::Qualified,
            format!(
                "In our opinion, except for the effects of the {material_issues} material \
                 matter(s) described in the findings, the financial projections present \
                 fairly the projected results of operations and cash flows of the property."
            ),
        )
    } else if critical_issues <= ADVERSE_CRITICAL_THRESHOLD {
        (
            Opinion::Qualified,
            format!(
                "In our opinion, the financial projections require adjustment for the \
                 {critical_issues} critical matter(s) identified before reliance; subject \
                 to those adjustments, the projections are otherwise fairly presented."
            ),
        )
    } else {
        (
            Opinion::Adverse,
            format!(
                "In our opinion, because of the significance of the {critical_issues} \
                 critical matters described in the findings, the financial projections do \
                 not present fairly the projected results of operations and cash flows of \
                 the property."
            ),
        )
    }
}

/// Render the report as a plain-text audit workpaper.
pub fn render_workpaper(report: &AuditReport) -> String {
    let mut out = String::new();
    let rule = "═".repeat(78);
    let thin = "─".repeat(78);

    out.push_str(&rule);
    out.push('\n');
    out.push_str("  INDEPENDENT VERIFICATION WORKPAPER\n");
    out.push_str(&format!("  Property: {}\n", report.property_name));
    out.push_str(&format!("  Prepared by: {}\n", report.auditor_name));
    out.push_str(&format!("  Date: {}\n", report.timestamp));
    out.push_str(&rule);
    out.push('\n');

    for section in &report.sections {
        out.push_str(&format!("\n  {} — {}\n", section.name, section.description));
        out.push_str(&format!(
            "  checks passed: {}   failed: {}   material: {}\n",
            section.passed, section.failed, section.material_issues
        ));
        out.push_str(&format!("  {thin}\n"));
        for f in &section.findings {
            let status = if f.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!(
                "  [{status}] ({:?}) {} | {} | {}\n",
                f.severity, f.rule, f.workpaper_ref, f.gaap_reference
            ));
            if !f.passed {
                out.push_str(&format!(
                    "         expected: {}  actual: {}  variance: {}\n",
                    f.expected, f.actual, f.variance
                ));
                out.push_str(&format!("         remediation: {}\n", f.recommendation));
            }
        }
    }

    out.push('\n');
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format!(
        "  TOTALS: {} checks, {} passed, {} failed ({} critical, {} material)\n",
        report.total_checks,
        report.total_passed,
        report.total_failed,
        report.critical_issues,
        report.material_issues
    ));
    out.push_str(&format!("  OPINION: {}\n", report.opinion));
    out.push_str(&format!("  {}\n", report.opinion_text));
    out.push_str(&rule);
    out.push('\n');

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opinion_boundaries() {
        assert_eq!(derive_opinion(0, 0).0, Opinion::Unqualified);
        assert_eq!(derive_opinion(0, 1).0, Opinion::Qualified);
        assert_eq!(derive_opinion(1, 0).0, Opinion::Qualified);
        assert_eq!(derive_opinion(3, 5).0, Opinion::Qualified);
        assert_eq!(derive_opinion(4, 0).0, Opinion::Adverse);
        assert_eq!(derive_opinion(12, 12).0, Opinion::Adverse);
    }

    #[test]
    fn test_opinion_text_mentions_counts() {
        let (_, text) = derive_opinion(0, 2);
        assert!(text.contains("2 material"));
        let (_, text) = derive_opinion(5, 0);
        assert!(text.contains("do not present fairly"));
    }
}
