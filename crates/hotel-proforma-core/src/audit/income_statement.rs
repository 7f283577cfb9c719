//! Income statement section: USALI revenue and profitability identities,
//! GAAP net income, and the deliberate negative test for principal
//! masquerading as an expense.

use rust_decimal::Decimal;

use crate::assumptions::ResolvedAssumptions;
use crate::audit::types::{AuditFinding, AuditSection, Severity};
use crate::formulas::{within_tolerance, AUDIT_TOLERANCE_PCT};
use crate::types::MonthlySnapshot;

const CATEGORY: &str = "Income Statement";
const DETAIL_CAP: usize = 3;

struct RuleTally {
    failures: usize,
}

impl RuleTally {
    fn new() -> Self {
        RuleTally { failures: 0 }
    }

    /// True while this failure should be reported in detail.
    fn record(&mut self) -> bool {
        self.failures += 1;
        self.failures <= DETAIL_CAP
    }
}

pub fn audit_income_statement(
    cfg: &ResolvedAssumptions,
    months: &[MonthlySnapshot],
) -> AuditSection {
    let mut section = AuditSection::new(
        "Income Statement",
        "USALI revenue/GOP/NOI identities and GAAP net income derivation",
    );

    let mut room_revenue = RuleTally::new();
    let mut sold_rooms = RuleTally::new();
    let mut total_revenue = RuleTally::new();
    let mut gop_identity = RuleTally::new();
    let mut noi_identity = RuleTally::new();
    let mut net_income = RuleTally::new();
    let mut wrong_formula = RuleTally::new();
    let mut cash_flow = RuleTally::new();
    let mut clean = 0usize;

    for m in months.iter().filter(|m| m.date >= cfg.operations_start) {
        let mut month_clean = true;

        // --- Room revenue = ADR × sold room-nights ---
        let expected_rooms = m.adr * m.sold_room_nights;
        if !within_tolerance(expected_rooms, m.revenue_rooms, AUDIT_TOLERANCE_PCT) {
            month_clean = false;
            if room_revenue.record() {
                section.push(AuditFinding::variance_failure(
                    CATEGORY,
                    "Room Revenue Identity",
                    "ASC 606 / USALI Rooms",
                    Severity::Critical,
                    expected_rooms,
                    m.revenue_rooms,
                    &format!("Month {}: room revenue must equal ADR × sold rooms", m.month_index),
                    "WP-IS-001",
                ));
            }
        }

        // --- Sold rooms consistent with occupancy (±1 room-night) ---
        let expected_sold = m.available_room_nights * m.occupancy_rate;
        if (expected_sold - m.sold_room_nights).abs() > Decimal::ONE {
            month_clean = false;
            if sold_rooms.record() {
                section.push(AuditFinding::variance_failure(
                    CATEGORY,
                    "Sold Rooms vs Occupancy",
                    "USALI Rooms",
                    Severity::Material,
                    expected_sold,
                    m.sold_room_nights,
                    &format!(
                        "Month {}: sold room-nights deviate from available × occupancy",
                        m.month_index
                    ),
                    "WP-IS-002",
                ));
            }
        }

        // --- Total revenue = sum of streams ---
        let expected_total = m.revenue_rooms + m.revenue_events + m.revenue_fb + m.revenue_other;
        if !within_tolerance(expected_total, m.revenue_total, AUDIT_TOLERANCE_PCT) {
            month_clean = false;
            if total_revenue.record() {
                section.push(AuditFinding::variance_failure(
                    CATEGORY,
                    "Total Revenue Identity",
                    "ASC 606",
                    Severity::Critical,
                    expected_total,
                    m.revenue_total,
                    &format!("Month {}: total revenue must equal the sum of streams", m.month_index),
                    "WP-IS-003",
                ));
            }
        }

        // --- GOP = revenue − operating expenses (fees and FF&E excluded) ---
        let operating_expenses = m.expense_rooms
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
        let expected_gop = m.revenue_total - operating_expenses;
        if !within_tolerance(expected_gop, m.gop, AUDIT_TOLERANCE_PCT) {
            month_clean = false;
            if gop_identity.record() {
                section.push(AuditFinding::variance_failure(
                    CATEGORY,
                    "GOP Identity",
                    "USALI Summary P&L",
                    Severity::Critical,
                    expected_gop,
                    m.gop,
                    &format!(
                        "Month {}: GOP must equal revenue less operating expenses, \
                         before fees and FF&E",
                        m.month_index
                    ),
                    "WP-IS-004",
                ));
            }
        }

        // --- NOI = GOP − fees − FF&E ---
        let expected_noi = m.gop - m.fee_base - m.fee_incentive - m.expense_ffe;
        if !within_tolerance(expected_noi, m.noi, AUDIT_TOLERANCE_PCT) {
            month_clean = false;
            if noi_identity.record() {
                section.push(AuditFinding::variance_failure(
                    CATEGORY,
                    "NOI Identity",
                    "USALI Summary P&L",
                    Severity::Critical,
                    expected_noi,
                    m.noi,
                    &format!("Month {}: NOI must equal GOP less fees and FF&E reserve", m.month_index),
                    "WP-IS-005",
                ));
            }
        }

        // --- Net income with independently re-derived tax ---
        let taxable = m.noi - m.interest_expense - m.depreciation_expense;
        let expected_tax = taxable.max(Decimal::ZERO) * cfg.tax_rate;
        let expected_ni = m.noi - m.interest_expense - m.depreciation_expense - expected_tax;
        if !within_tolerance(expected_ni, m.net_income, AUDIT_TOLERANCE_PCT) {
            month_clean = false;
            if net_income.record() {
                section.push(AuditFinding::variance_failure(
                    CATEGORY,
                    "Net Income Identity",
                    "ASC 740",
                    Severity::Critical,
                    expected_ni,
                    m.net_income,
                    &format!(
                        "Month {}: net income must equal NOI − interest − depreciation − tax",
                        m.month_index
                    ),
                    "WP-IS-006",
                ));
            }
        }

        // --- Negative test: principal is NOT an income-statement expense.
        //     If NOI − total debt service lands on net income, the model
        //     expensed principal. A numeric match here is the violation.
        //     (Single-pattern heuristic; it only catches this one wrong
        //     formula.) ---
        if m.principal_payment > Decimal::ZERO
            && within_tolerance(m.noi - m.debt_payment, m.net_income, AUDIT_TOLERANCE_PCT)
        {
            month_clean = false;
            if wrong_formula.record() {
                section.push(AuditFinding::violation(
                    CATEGORY,
                    "Principal In Net Income (ERROR)",
                    "ASC 470",
                    Severity::Critical,
                    "net income = NOI − interest − depreciation − tax",
                    &format!(
                        "month {}: net income equals NOI − total debt service",
                        m.month_index
                    ),
                    "Principal repayment is a financing outflow, not an expense; \
                     remove it from the income statement",
                    "WP-IS-007",
                ));
            }
        }

        // --- Cash-basis cash flow ---
        let expected_cf =
            m.noi - m.debt_payment - m.income_tax + m.refinancing_proceeds;
        if !within_tolerance(expected_cf, m.cash_flow, AUDIT_TOLERANCE_PCT) {
            month_clean = false;
            if cash_flow.record() {
                section.push(AuditFinding::variance_failure(
                    CATEGORY,
                    "Monthly Cash Flow",
                    "ASC 230",
                    Severity::Material,
                    expected_cf,
                    m.cash_flow,
                    &format!(
                        "Month {}: cash flow must equal NOI − debt service − tax \
                         (+ refinance proceeds)",
                        m.month_index
                    ),
                    "WP-IS-008",
                ));
            }
        }

        if month_clean {
            clean += 1;
            if clean <= DETAIL_CAP {
                section.push(AuditFinding::variance_pass(
                    CATEGORY,
                    "Month Fully Verified",
                    "USALI Summary P&L",
                    m.net_income,
                    m.net_income,
                    "WP-IS-009",
                ));
            }
        }
    }

    for (rule, tally) in [
        ("Room Revenue Identity", &room_revenue),
        ("Sold Rooms vs Occupancy", &sold_rooms),
        ("Total Revenue Identity", &total_revenue),
        ("GOP Identity", &gop_identity),
        ("NOI Identity", &noi_identity),
        ("Net Income Identity", &net_income),
        ("Principal In Net Income (ERROR)", &wrong_formula),
        ("Monthly Cash Flow", &cash_flow),
    ] {
        if tally.failures > DETAIL_CAP {
            section.push(AuditFinding::note(
                CATEGORY,
                &format!("{rule} — Additional Occurrences"),
                "USALI Summary P&L",
                &format!(
                    "{} further months failed this rule beyond the {DETAIL_CAP} detailed",
                    tally.failures - DETAIL_CAP
                ),
                "WP-IS-010",
            ));
        }
    }

    if section.failed == 0 && clean > 0 {
        section.push(AuditFinding::note(
            CATEGORY,
            "Income Statement Verified",
            "USALI Summary P&L",
            &format!("{clean} operational months passed every identity within the 1% tolerance"),
            "WP-IS-011",
        ));
    }

    section
}
