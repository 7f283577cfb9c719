//! Loan amortization section: re-derives interest/principal splits from
//! a running balance and the PMT formula, re-anchoring at a refinance.
//!
//! The auditor does not re-run refinance sizing; it infers the new loan
//! from the engine's own post-refinance balance plus that month's
//! principal, then verifies the split is internally consistent.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::assumptions::ResolvedAssumptions;
use crate::audit::types::{AuditFinding, AuditSection, Severity};
use crate::formulas::{pmt, within_tolerance, AUDIT_SAMPLE_MONTHS, AUDIT_TOLERANCE_PCT};
use crate::types::{months_between, MonthlySnapshot};

const CATEGORY: &str = "Loan Amortization";

pub fn audit_amortization(cfg: &ResolvedAssumptions, months: &[MonthlySnapshot]) -> AuditSection {
    let mut section = AuditSection::new(
        "Loan Amortization",
        "Level-payment split: interest = balance × rate, principal = payment − interest",
    );

    let refinance_index = cfg
        .refinance
        .as_ref()
        .map(|r| months_between(cfg.model_start, r.date))
        .filter(|i| *i >= 0 && (*i as usize) < months.len())
        .map(|i| i as usize);

    if !cfg.is_financed && refinance_index.is_none() {
        section.push(AuditFinding::note(
            CATEGORY,
            "No Debt To Audit",
            "ASC 470",
            "property is full-equity with no refinance; amortization checks skipped",
            "WP-LOAN-000",
        ));
        return section;
    }

    // --- Documented payment on the original loan ---
    if cfg.is_financed {
        let documented = pmt(
            cfg.loan_amount,
            cfg.loan_annual_rate / dec!(12),
            cfg.loan_term_months,
        );
        section.push(AuditFinding::note(
            CATEGORY,
            "Level Payment Documented",
            "ASC 835",
            &format!(
                "loan {:.2} at {:.4} annual over {} months: payment {documented:.2}",
                cfg.loan_amount, cfg.loan_annual_rate, cfg.loan_term_months
            ),
            "WP-LOAN-001",
        ));
    }

    // --- No debt service before acquisition ---
    for m in months.iter().filter(|m| m.date < cfg.acquisition_date) {
        if !m.debt_payment.is_zero() {
            section.push(AuditFinding::variance_failure(
                CATEGORY,
                "Debt Service Before Acquisition",
                "ASC 470",
                Severity::Critical,
                Decimal::ZERO,
                m.debt_payment,
                &format!("Month {} services a loan that does not yet exist", m.month_index),
                "WP-LOAN-002",
            ));
            break; // timing section carries the per-month detail
        }
    }

    // Full-equity properties have no debt until the refinance month.
    let start = if cfg.is_financed {
        cfg.acquisition_month()
    } else {
        refinance_index.unwrap_or(0)
    };
    let end = (start + AUDIT_SAMPLE_MONTHS).min(months.len());

    let mut running_balance = cfg.loan_amount;
    let mut monthly_rate = cfg.loan_annual_rate / dec!(12);
    let mut mismatches = 0usize;
    let mut clean = 0usize;

    for m in &months[start.min(months.len())..end] {
        // Re-anchor on the refinance month: the new loan is the engine's
        // ending balance plus the principal it retired that month.
        if Some(m.month_index) == refinance_index {
            if let Some(refi) = &cfg.refinance {
                running_balance = m.debt_outstanding + m.principal_payment;
                monthly_rate = refi.annual_rate / dec!(12);
                section.push(AuditFinding::note(
                    CATEGORY,
                    "Refinance Re-Anchor",
                    "ASC 470",
                    &format!(
                        "month {}: new loan inferred at {running_balance:.2}, rate {:.4} annual \
                         over {} months",
                        m.month_index, refi.annual_rate, refi.term_months
                    ),
                    "WP-LOAN-REFI",
                ));
            }
        }

        if m.debt_payment.is_zero() {
            continue;
        }

        let expected_interest = running_balance * monthly_rate;
        let expected_principal = m.debt_payment - expected_interest;

        let interest_ok =
            within_tolerance(expected_interest, m.interest_expense, AUDIT_TOLERANCE_PCT);
        let principal_ok =
            within_tolerance(expected_principal, m.principal_payment, AUDIT_TOLERANCE_PCT);

        if !interest_ok {
            mismatches += 1;
            if mismatches <= 3 {
                section.push(AuditFinding::variance_failure(
                    CATEGORY,
                    "Interest Split Mismatch",
                    "ASC 835",
                    Severity::Material,
                    expected_interest,
                    m.interest_expense,
                    &format!(
                        "Month {}: interest should equal the running balance times the \
                         periodic rate",
                        m.month_index
                    ),
                    "WP-LOAN-003",
                ));
            }
        } else if !principal_ok {
            mismatches += 1;
            if mismatches <= 3 {
                section.push(AuditFinding::variance_failure(
                    CATEGORY,
                    "Principal Split Mismatch",
                    "ASC 835",
                    Severity::Material,
                    expected_principal,
                    m.principal_payment,
                    &format!(
                        "Month {}: principal should equal payment minus interest",
                        m.month_index
                    ),
                    "WP-LOAN-004",
                ));
            }
        } else {
            clean += 1;
            if clean <= 3 {
                section.push(AuditFinding::variance_pass(
                    CATEGORY,
                    "Amortization Split Verified",
                    "ASC 835",
                    expected_interest,
                    m.interest_expense,
                    "WP-LOAN-005",
                ));
            }
        }

        // Re-sync to the engine's balance so one bad month does not
        // cascade through the whole sample.
        running_balance = if m.debt_outstanding > Decimal::ZERO {
            m.debt_outstanding
        } else {
            (running_balance - m.principal_payment).max(Decimal::ZERO)
        };
    }

    if mismatches > 3 {
        section.push(AuditFinding::violation(
            CATEGORY,
            "Amortization Split Mismatch (Systemic)",
            "ASC 835",
            Severity::Material,
            "interest = balance × rate each sampled month",
            &format!("{mismatches} sampled months deviate"),
            "Recompute the schedule from origination with the level payment",
            "WP-LOAN-006",
        ));
    }

    section
}
