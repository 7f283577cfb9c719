//! Cash flow reconciliation section: tracks its own cumulative cash from
//! month 0 to catch drift the refinance overlay could introduce, and
//! re-derives both statement sections from income-statement components.

use rust_decimal::Decimal;

use crate::assumptions::ResolvedAssumptions;
use crate::audit::types::{AuditFinding, AuditSection, Severity};
use crate::formulas::{within_absolute_tolerance, AUDIT_TOLERANCE_DOLLARS};
use crate::types::MonthlySnapshot;

const CATEGORY: &str = "Cash Flow";
const DETAIL_CAP: usize = 3;

pub fn audit_cash_flow(cfg: &ResolvedAssumptions, months: &[MonthlySnapshot]) -> AuditSection {
    let mut section = AuditSection::new(
        "Cash Flow Reconciliation",
        "Independent running balance from month 0; statement sections re-derived",
    );

    let acquisition_month = cfg.acquisition_month();
    let mut cumulative = Decimal::ZERO;

    let mut ending_mismatches = 0usize;
    let mut operating_mismatches = 0usize;
    let mut financing_mismatches = 0usize;
    let mut split_mismatches = 0usize;

    for m in months {
        // The shadow balance accumulates every month, including the
        // reserve seed, regardless of which months the checks cover.
        if m.month_index == acquisition_month {
            cumulative += cfg.operating_reserve;
        }
        cumulative += m.cash_flow;

        if !within_absolute_tolerance(cumulative, m.ending_cash, AUDIT_TOLERANCE_DOLLARS) {
            ending_mismatches += 1;
            if ending_mismatches <= DETAIL_CAP {
                section.push(AuditFinding::variance_failure(
                    CATEGORY,
                    "Ending Cash Drift",
                    "ASC 230",
                    Severity::Critical,
                    cumulative,
                    m.ending_cash,
                    &format!(
                        "Month {}: ending cash deviates from the independent running sum",
                        m.month_index
                    ),
                    "WP-CF-001",
                ));
            }
        }

        if m.date < cfg.acquisition_date {
            continue;
        }

        // --- Operating section = net income + depreciation add-back ---
        let expected_operating = m.net_income + m.depreciation_expense;
        if !within_absolute_tolerance(
            expected_operating,
            m.operating_cash_flow,
            AUDIT_TOLERANCE_DOLLARS,
        ) {
            operating_mismatches += 1;
            if operating_mismatches <= DETAIL_CAP {
                section.push(AuditFinding::variance_failure(
                    CATEGORY,
                    "Operating Section",
                    "ASC 230",
                    Severity::Material,
                    expected_operating,
                    m.operating_cash_flow,
                    &format!(
                        "Month {}: operating CF must equal net income plus the \
                         depreciation add-back",
                        m.month_index
                    ),
                    "WP-CF-002",
                ));
            }
        }

        // --- Financing section = −principal (+ proceeds in the refi month) ---
        let expected_financing = -m.principal_payment + m.refinancing_proceeds;
        if !within_absolute_tolerance(
            expected_financing,
            m.financing_cash_flow,
            AUDIT_TOLERANCE_DOLLARS,
        ) {
            financing_mismatches += 1;
            if financing_mismatches <= DETAIL_CAP {
                section.push(AuditFinding::variance_failure(
                    CATEGORY,
                    "Financing Section",
                    "ASC 230",
                    Severity::Material,
                    expected_financing,
                    m.financing_cash_flow,
                    &format!(
                        "Month {}: financing CF must equal principal repayment \
                         (plus refinance proceeds once)",
                        m.month_index
                    ),
                    "WP-CF-003",
                ));
            }
        }

        // --- Debt service splits cleanly ---
        if (m.debt_payment - (m.interest_expense + m.principal_payment)).abs() > Decimal::ONE {
            split_mismatches += 1;
            if split_mismatches <= DETAIL_CAP {
                section.push(AuditFinding::variance_failure(
                    CATEGORY,
                    "Debt Service Split",
                    "ASC 470",
                    Severity::Material,
                    m.interest_expense + m.principal_payment,
                    m.debt_payment,
                    &format!(
                        "Month {}: total debt service must equal interest plus principal",
                        m.month_index
                    ),
                    "WP-CF-004",
                ));
            }
        }
    }

    for (rule, count) in [
        ("Ending Cash Drift", ending_mismatches),
        ("Operating Section", operating_mismatches),
        ("Financing Section", financing_mismatches),
        ("Debt Service Split", split_mismatches),
    ] {
        if count > DETAIL_CAP {
            section.push(AuditFinding::violation(
                CATEGORY,
                &format!("{rule} (Systemic)"),
                "ASC 230",
                Severity::Material,
                "reconciles every month",
                &format!("{count} months deviate"),
                "Rebuild the cash flow statement from the income statement components",
                "WP-CF-005",
            ));
        }
    }

    if ending_mismatches == 0
        && operating_mismatches == 0
        && financing_mismatches == 0
        && split_mismatches == 0
    {
        section.push(AuditFinding::note(
            CATEGORY,
            "Cash Flow Verified",
            "ASC 230",
            &format!(
                "running balance reconciles for all {} months including the \
                 reserve seed and any refinance proceeds",
                months.len()
            ),
            "WP-CF-006",
        ));
    }

    section
}
