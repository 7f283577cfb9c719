//! Balance sheet section: book value rolls forward with an independently
//! accumulated depreciation balance; cash flow decomposes into its
//! statement sections. Dollar tolerance, not percentage — balances are
//! large and the drift of interest is absolute.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::assumptions::ResolvedAssumptions;
use crate::audit::types::{AuditFinding, AuditSection, Severity};
use crate::constants::DEPRECIATION_YEARS;
use crate::formulas::{within_absolute_tolerance, AUDIT_TOLERANCE_DOLLARS};
use crate::types::MonthlySnapshot;

const CATEGORY: &str = "Balance Sheet";
const DETAIL_CAP: usize = 3;

pub fn audit_balance_sheet(cfg: &ResolvedAssumptions, months: &[MonthlySnapshot]) -> AuditSection {
    let mut section = AuditSection::new(
        "Balance Sheet",
        "Book value = land + basis − accumulated depreciation; CF sections reconcile",
    );

    // Independent accumulation, never read from the snapshots
    let basis = cfg.purchase_price * (Decimal::ONE - cfg.land_value_fraction) + cfg.improvements;
    let land = cfg.purchase_price * cfg.land_value_fraction;
    let monthly_charge = basis / DEPRECIATION_YEARS / dec!(12);

    let mut accumulated = Decimal::ZERO;
    let mut book_mismatches = 0usize;
    let mut cf_mismatches = 0usize;

    for m in months.iter().filter(|m| m.date >= cfg.acquisition_date) {
        accumulated = (accumulated + monthly_charge).min(basis);
        let expected_book = land + basis - accumulated;

        if !within_absolute_tolerance(expected_book, m.property_book_value, AUDIT_TOLERANCE_DOLLARS)
        {
            book_mismatches += 1;
            if book_mismatches <= DETAIL_CAP {
                section.push(AuditFinding::variance_failure(
                    CATEGORY,
                    "Property Book Value",
                    "ASC 360",
                    Severity::Material,
                    expected_book,
                    m.property_book_value,
                    &format!(
                        "Month {}: book value must equal land + basis − accumulated \
                         depreciation",
                        m.month_index
                    ),
                    "WP-BS-001",
                ));
            }
        }

        let expected_cf = m.operating_cash_flow + m.financing_cash_flow;
        if !within_absolute_tolerance(expected_cf, m.cash_flow, AUDIT_TOLERANCE_DOLLARS) {
            cf_mismatches += 1;
            if cf_mismatches <= DETAIL_CAP {
                section.push(AuditFinding::variance_failure(
                    CATEGORY,
                    "Cash Flow Decomposition",
                    "ASC 230",
                    Severity::Material,
                    expected_cf,
                    m.cash_flow,
                    &format!(
                        "Month {}: total cash flow must equal operating + financing sections",
                        m.month_index
                    ),
                    "WP-BS-002",
                ));
            }
        }
    }

    if book_mismatches > DETAIL_CAP {
        section.push(AuditFinding::violation(
            CATEGORY,
            "Property Book Value (Systemic)",
            "ASC 360",
            Severity::Material,
            "book value rolls forward with straight-line depreciation",
            &format!("{book_mismatches} months deviate"),
            "Rebuild the fixed-asset rollforward from the acquisition month",
            "WP-BS-001",
        ));
    }
    if cf_mismatches > DETAIL_CAP {
        section.push(AuditFinding::violation(
            CATEGORY,
            "Cash Flow Decomposition (Systemic)",
            "ASC 230",
            Severity::Material,
            "cash flow = operating + financing",
            &format!("{cf_mismatches} months deviate"),
            "Reconcile the cash flow statement sections month by month",
            "WP-BS-002",
        ));
    }

    if book_mismatches == 0 && cf_mismatches == 0 {
        section.push(AuditFinding::note(
            CATEGORY,
            "Balance Sheet Verified",
            "ASC 360 / ASC 230",
            "book value rollforward and cash flow decomposition hold for all months",
            "WP-BS-003",
        ));
    }

    section
}
