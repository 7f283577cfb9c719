//! Depreciation section: straight-line over 27.5 years, post-acquisition
//! only. The expected charge is re-derived from the raw acquisition
//! economics, not read from the engine's resolved values.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::assumptions::ResolvedAssumptions;
use crate::audit::types::{AuditFinding, AuditSection, Severity};
use crate::constants::DEPRECIATION_YEARS;
use crate::formulas::{
    within_tolerance, AUDIT_SAMPLE_MONTHS, AUDIT_TOLERANCE_DOLLARS, AUDIT_TOLERANCE_PCT,
};
use crate::types::MonthlySnapshot;

const CATEGORY: &str = "Depreciation";

pub fn audit_depreciation(cfg: &ResolvedAssumptions, months: &[MonthlySnapshot]) -> AuditSection {
    let mut section = AuditSection::new(
        "Depreciation",
        "Straight-line building depreciation, 27.5-year life, acquisition-gated",
    );

    // Independent re-derivation of the monthly charge
    let basis = cfg.purchase_price * (Decimal::ONE - cfg.land_value_fraction) + cfg.improvements;
    let expected_monthly = basis / DEPRECIATION_YEARS / dec!(12);

    section.push(AuditFinding::note(
        CATEGORY,
        "Depreciable Basis Documented",
        "ASC 360",
        &format!(
            "basis {basis:.2} = purchase {:.2} × (1 − land {:.4}) + improvements {:.2}; \
             monthly charge {expected_monthly:.2}",
            cfg.purchase_price, cfg.land_value_fraction, cfg.improvements
        ),
        "WP-DEP-001",
    ));

    // --- No depreciation before acquisition ---
    let mut early = 0usize;
    for m in months.iter().filter(|m| m.date < cfg.acquisition_date) {
        if m.depreciation_expense.abs() > AUDIT_TOLERANCE_DOLLARS {
            early += 1;
            if early <= 2 {
                section.push(AuditFinding::variance_failure(
                    CATEGORY,
                    "Depreciation Before Acquisition",
                    "ASC 360",
                    Severity::Critical,
                    Decimal::ZERO,
                    m.depreciation_expense,
                    &format!(
                        "Month {} depreciates an asset not yet placed in service",
                        m.month_index
                    ),
                    "WP-DEP-002",
                ));
            }
        }
    }
    if early > 2 {
        section.push(AuditFinding::violation(
            CATEGORY,
            "Depreciation Before Acquisition (Systemic)",
            "ASC 360",
            Severity::Critical,
            "0 pre-acquisition months with depreciation",
            &format!("{early} months affected"),
            "Gate the depreciation start to the in-service date",
            "WP-DEP-002",
        ));
    }

    // --- Sampled window after acquisition ---
    let start = cfg.acquisition_month().min(months.len());
    let end = (start + AUDIT_SAMPLE_MONTHS).min(months.len());
    let mut mismatches = 0usize;
    for m in &months[start..end] {
        if m.date < cfg.acquisition_date {
            continue;
        }
        if !within_tolerance(expected_monthly, m.depreciation_expense, AUDIT_TOLERANCE_PCT) {
            mismatches += 1;
            if mismatches <= 3 {
                section.push(AuditFinding::variance_failure(
                    CATEGORY,
                    "Monthly Depreciation Mismatch",
                    "ASC 360",
                    Severity::Material,
                    expected_monthly,
                    m.depreciation_expense,
                    &format!(
                        "Month {} deviates from the straight-line charge; recompute \
                         basis / 27.5 / 12",
                        m.month_index
                    ),
                    "WP-DEP-003",
                ));
            }
        }
    }
    if mismatches > 3 {
        section.push(AuditFinding::violation(
            CATEGORY,
            "Monthly Depreciation Mismatch (Systemic)",
            "ASC 360",
            Severity::Material,
            &format!("monthly charge {expected_monthly:.2}"),
            &format!("{mismatches} sampled months deviate"),
            "Recompute the straight-line schedule from the depreciable basis",
            "WP-DEP-003",
        ));
    }

    if early == 0 && mismatches == 0 {
        section.push(AuditFinding::note(
            CATEGORY,
            "Depreciation Schedule Verified",
            "ASC 360",
            &format!(
                "{} sampled months match the straight-line charge within tolerance",
                end.saturating_sub(start)
            ),
            "WP-DEP-004",
        ));
    }

    section
}
