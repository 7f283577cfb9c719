//! Management fee section: base fee tracks revenue, incentive fee is
//! GOP-linked and can never go negative.

use rust_decimal::Decimal;

use crate::assumptions::ResolvedAssumptions;
use crate::audit::types::{AuditFinding, AuditSection, Severity};
use crate::formulas::{within_tolerance, AUDIT_SAMPLE_MONTHS, AUDIT_TOLERANCE_PCT};
use crate::types::MonthlySnapshot;

const CATEGORY: &str = "Management Fees";

pub fn audit_management_fees(
    cfg: &ResolvedAssumptions,
    months: &[MonthlySnapshot],
) -> AuditSection {
    let mut section = AuditSection::new(
        "Management Fees",
        "Base fee = revenue × rate; incentive fee = max(0, GOP × rate)",
    );

    let operational: Vec<&MonthlySnapshot> = months
        .iter()
        .filter(|m| m.date >= cfg.operations_start)
        .collect();

    if operational.is_empty() {
        section.push(AuditFinding::note(
            CATEGORY,
            "No Operational Months",
            "USALI / management agreement",
            "property never operates within the horizon; fee checks skipped",
            "WP-FEE-000",
        ));
        return section;
    }

    let mut base_mismatches = 0usize;
    for m in operational.iter().take(AUDIT_SAMPLE_MONTHS) {
        let expected_base = m.revenue_total * cfg.base_fee_rate;
        if !within_tolerance(expected_base, m.fee_base, AUDIT_TOLERANCE_PCT) {
            base_mismatches += 1;
            if base_mismatches <= 3 {
                section.push(AuditFinding::variance_failure(
                    CATEGORY,
                    "Base Fee Mismatch",
                    "USALI / management agreement",
                    Severity::Material,
                    expected_base,
                    m.fee_base,
                    &format!(
                        "Month {}: base fee must equal total revenue × {:.4}",
                        m.month_index, cfg.base_fee_rate
                    ),
                    "WP-FEE-001",
                ));
            }
        }
    }
    if base_mismatches > 3 {
        section.push(AuditFinding::violation(
            CATEGORY,
            "Base Fee Mismatch (Systemic)",
            "USALI / management agreement",
            Severity::Material,
            &format!("base fee = revenue × {:.4}", cfg.base_fee_rate),
            &format!("{base_mismatches} sampled months deviate"),
            "Re-derive the base fee from the contracted rate",
            "WP-FEE-001",
        ));
    }

    // Negative incentive is always critical, regardless of magnitude:
    // the floor is contractual, not a rounding concern.
    let mut negative_incentive = 0usize;
    for m in &operational {
        if m.fee_incentive < Decimal::ZERO {
            negative_incentive += 1;
            if negative_incentive <= 3 {
                section.push(AuditFinding::variance_failure(
                    CATEGORY,
                    "Negative Incentive Fee",
                    "USALI / management agreement",
                    Severity::Critical,
                    Decimal::ZERO,
                    m.fee_incentive,
                    &format!(
                        "Month {}: incentive fee must be floored at zero in loss months",
                        m.month_index
                    ),
                    "WP-FEE-002",
                ));
            }
        }
    }
    if negative_incentive > 3 {
        section.push(AuditFinding::violation(
            CATEGORY,
            "Negative Incentive Fee (Systemic)",
            "USALI / management agreement",
            Severity::Critical,
            "incentive fee = max(0, GOP × rate)",
            &format!("{negative_incentive} operational months carry a negative incentive fee"),
            "Re-apply the zero floor before the fee posts to the income statement",
            "WP-FEE-002",
        ));
    }

    if base_mismatches == 0 && negative_incentive == 0 {
        section.push(AuditFinding::note(
            CATEGORY,
            "Fee Structure Verified",
            "USALI / management agreement",
            &format!(
                "base {:.4} of revenue, incentive {:.4} of GOP with zero floor; \
                 sampled months conform",
                cfg.base_fee_rate, cfg.incentive_fee_rate
            ),
            "WP-FEE-003",
        ));
    }

    section
}
