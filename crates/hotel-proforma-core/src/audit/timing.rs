//! Timing section: nothing earns or borrows before its gate.

use rust_decimal::Decimal;

use crate::assumptions::ResolvedAssumptions;
use crate::audit::types::{AuditFinding, AuditSection, Severity};
use crate::types::MonthlySnapshot;

const CATEGORY: &str = "Timing";
const DETAIL_CAP: usize = 3;

pub fn audit_timing(cfg: &ResolvedAssumptions, months: &[MonthlySnapshot]) -> AuditSection {
    let mut section = AuditSection::new(
        "Activation Timing",
        "Revenue gated to operations start; debt and depreciation gated to acquisition",
    );

    section.push(AuditFinding::note(
        CATEGORY,
        "Model Dates Documented",
        "ASC 606",
        &format!(
            "model start {}, operations start {}, acquisition {}",
            cfg.model_start, cfg.operations_start, cfg.acquisition_date
        ),
        "WP-TIME-001",
    ));

    // --- No revenue before the operations gate ---
    let mut early_revenue = 0usize;
    for m in months.iter().filter(|m| m.date < cfg.operations_start) {
        if m.revenue_total > Decimal::ZERO {
            early_revenue += 1;
            if early_revenue <= DETAIL_CAP {
                section.push(AuditFinding::variance_failure(
                    CATEGORY,
                    "Revenue Before Operations Start",
                    "ASC 606",
                    Severity::Critical,
                    Decimal::ZERO,
                    m.revenue_total,
                    &format!(
                        "Month {} recognizes revenue before the property operates; \
                         zero the month or correct the operations start date",
                        m.month_index
                    ),
                    "WP-TIME-002",
                ));
            }
        }
    }
    if early_revenue > DETAIL_CAP {
        section.push(AuditFinding::violation(
            CATEGORY,
            "Revenue Before Operations Start (Systemic)",
            "ASC 606",
            Severity::Critical,
            "0 pre-operational months with revenue",
            &format!("{early_revenue} months affected"),
            "Review the operations start date against the revenue activation logic",
            "WP-TIME-002",
        ));
    }

    // --- No debt activity before the acquisition gate ---
    let mut early_debt = 0usize;
    for m in months.iter().filter(|m| m.date < cfg.acquisition_date) {
        if !m.debt_payment.is_zero() || !m.debt_outstanding.is_zero() {
            early_debt += 1;
            if early_debt <= DETAIL_CAP {
                section.push(AuditFinding::variance_failure(
                    CATEGORY,
                    "Debt Activity Before Acquisition",
                    "ASC 470",
                    Severity::Critical,
                    Decimal::ZERO,
                    m.debt_payment.max(m.debt_outstanding),
                    &format!(
                        "Month {} carries debt before the property is acquired; \
                         defer loan origination to the acquisition date",
                        m.month_index
                    ),
                    "WP-TIME-003",
                ));
            }
        }
    }
    if early_debt > DETAIL_CAP {
        section.push(AuditFinding::violation(
            CATEGORY,
            "Debt Activity Before Acquisition (Systemic)",
            "ASC 470",
            Severity::Critical,
            "0 pre-acquisition months with debt",
            &format!("{early_debt} months affected"),
            "Review the acquisition date against the loan activation logic",
            "WP-TIME-003",
        ));
    }

    // --- Positive evidence: first operational month actually operates ---
    if let Some(first_ops) = months.iter().find(|m| m.date >= cfg.operations_start) {
        if first_ops.revenue_total > Decimal::ZERO {
            section.push(AuditFinding::note(
                CATEGORY,
                "Operations Start Verified",
                "ASC 606",
                &format!(
                    "month {} is the first operational month and carries revenue {:.2}",
                    first_ops.month_index, first_ops.revenue_total
                ),
                "WP-TIME-004",
            ));
        }
    }

    section
}
