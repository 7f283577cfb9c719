//! Mechanical arithmetic shared by the projection engine, the audit
//! sections, and the cross-calculator validator.
//!
//! Only formula primitives live here. Accounting identities are
//! deliberately re-expressed independently inside the verification
//! layers so that they never inherit an engine bug.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{Money, Rate};

/// Relative tolerance for percentage-based audit comparisons (1%)
pub const AUDIT_TOLERANCE_PCT: Decimal = dec!(0.01);

/// Absolute tolerance for dollar-based audit comparisons
pub const AUDIT_TOLERANCE_DOLLARS: Decimal = dec!(1.00);

/// Months sampled per audit section after an activation gate
pub const AUDIT_SAMPLE_MONTHS: usize = 24;

/// Critical-finding count above which the opinion turns adverse
pub const ADVERSE_CRITICAL_THRESHOLD: usize = 3;

/// Level payment for a fully-amortizing loan: `P·r·(1+r)^n / ((1+r)^n − 1)`.
///
/// Zero principal returns zero (unfinanced properties short-circuit all
/// debt math). Zero rate degrades to straight-line `P / n`.
pub fn pmt(principal: Money, monthly_rate: Rate, total_payments: u32) -> Money {
    if principal.is_zero() || total_payments == 0 {
        return Decimal::ZERO;
    }
    if monthly_rate.is_zero() {
        return principal / Decimal::from(total_payments);
    }

    let compound = compound_factor(monthly_rate, total_payments);
    principal * monthly_rate * compound / (compound - Decimal::ONE)
}

/// `(1 + rate)^periods` via iterative multiplication; stable for
/// monthly terms out to 360 periods.
pub fn compound_factor(rate: Rate, periods: u32) -> Decimal {
    let mut factor = Decimal::ONE;
    for _ in 0..periods {
        factor *= Decimal::ONE + rate;
    }
    factor
}

/// Relative-error comparison with asymmetric zero handling.
///
/// Both zero passes. A zero expectation passes only when the actual is
/// under the tolerance in absolute terms — this is what lets
/// "no activity yet" months pass without spurious percentage failures.
pub fn within_tolerance(expected: Decimal, actual: Decimal, tolerance: Decimal) -> bool {
    if expected.is_zero() && actual.is_zero() {
        return true;
    }
    if expected.is_zero() {
        return actual.abs() < tolerance;
    }
    ((expected - actual) / expected).abs() < tolerance
}

/// Dollar-tolerance comparison used by the cross-validator and the
/// balance-sheet / cash-flow sections. Scales with magnitude so that
/// very large balances are not held to a flat dollar.
pub fn within_absolute_tolerance(a: Decimal, b: Decimal, abs_tol: Decimal) -> bool {
    if a.is_zero() && b.is_zero() {
        return true;
    }
    (a - b).abs() <= abs_tol.max(a.abs() * dec!(0.0001))
}

/// Signed dollar variance with a percentage, e.g. `+12.50 (0.83%)`.
/// Percentage reads `N/A` when the expectation is zero.
pub fn format_variance(expected: Decimal, actual: Decimal) -> String {
    let diff = actual - expected;
    let sign = if diff >= Decimal::ZERO { "+" } else { "" };
    if expected.is_zero() {
        format!("{sign}{diff:.2} (N/A%)")
    } else {
        let pct = diff / expected * dec!(100);
        format!("{sign}{diff:.2} ({pct:.2}%)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- PMT ---

    #[test]
    fn test_pmt_25_year_loan() {
        // $900k at 9% over 25 years ≈ $7,552.77/mo
        let payment = pmt(dec!(900000), dec!(0.09) / dec!(12), 300);
        assert!(
            within_tolerance(payment, dec!(7552.77), dec!(0.001)),
            "payment {payment} outside expected range"
        );
    }

    #[test]
    fn test_pmt_zero_principal() {
        assert_eq!(pmt(Decimal::ZERO, dec!(0.0075), 300), Decimal::ZERO);
    }

    #[test]
    fn test_pmt_zero_rate_straight_line() {
        // $360k / 360 months = $1000/mo
        assert_eq!(pmt(dec!(360000), Decimal::ZERO, 360), dec!(1000));
    }

    #[test]
    fn test_pmt_zero_term() {
        assert_eq!(pmt(dec!(100000), dec!(0.005), 0), Decimal::ZERO);
    }

    #[test]
    fn test_pmt_stable_at_360_months() {
        // $750k at 6.5% over 30 years, expected ~$4,740/mo
        let payment = pmt(dec!(750000), dec!(0.065) / dec!(12), 360);
        assert!(
            payment > dec!(4700) && payment < dec!(4800),
            "payment {payment} outside expected range"
        );
    }

    // --- Tolerance ---

    #[test]
    fn test_tolerance_identity() {
        assert!(within_tolerance(dec!(123.456), dec!(123.456), AUDIT_TOLERANCE_PCT));
        assert!(within_tolerance(Decimal::ZERO, Decimal::ZERO, AUDIT_TOLERANCE_PCT));
    }

    #[test]
    fn test_tolerance_one_percent_band() {
        assert!(within_tolerance(dec!(100), dec!(100.001), AUDIT_TOLERANCE_PCT));
        assert!(!within_tolerance(dec!(100), dec!(105), AUDIT_TOLERANCE_PCT));
    }

    #[test]
    fn test_tolerance_zero_expected_asymmetry() {
        // Zero expectation compares the actual in absolute terms
        assert!(within_tolerance(Decimal::ZERO, dec!(0.005), AUDIT_TOLERANCE_PCT));
        assert!(!within_tolerance(Decimal::ZERO, dec!(0.5), AUDIT_TOLERANCE_PCT));
    }

    #[test]
    fn test_tolerance_negative_values() {
        assert!(within_tolerance(dec!(-100), dec!(-100.5), AUDIT_TOLERANCE_PCT));
        assert!(!within_tolerance(dec!(-100), dec!(-110), AUDIT_TOLERANCE_PCT));
    }

    #[test]
    fn test_absolute_tolerance() {
        assert!(within_absolute_tolerance(dec!(100.40), dec!(100.90), dec!(1)));
        assert!(!within_absolute_tolerance(dec!(100), dec!(102), dec!(1)));
        // Scales with magnitude: 0.01% of 50M is 5000
        assert!(within_absolute_tolerance(dec!(50000000), dec!(50002000), dec!(1)));
        assert!(within_absolute_tolerance(Decimal::ZERO, Decimal::ZERO, dec!(0.01)));
    }

    // --- Variance formatting ---

    #[test]
    fn test_format_variance_signs() {
        assert_eq!(format_variance(dec!(100), dec!(105)), "+5.00 (5.00%)");
        assert_eq!(format_variance(dec!(100), dec!(95)), "-5.00 (-5.00%)");
    }

    #[test]
    fn test_format_variance_zero_expected() {
        assert_eq!(format_variance(Decimal::ZERO, dec!(3)), "+3.00 (N/A%)");
    }

    // --- Compounding ---

    #[test]
    fn test_compound_factor() {
        assert_eq!(compound_factor(dec!(0.10), 0), Decimal::ONE);
        assert_eq!(compound_factor(dec!(0.10), 2), dec!(1.21));
    }
}
