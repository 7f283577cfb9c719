//! Finding, section, and report types shared by the audit sections.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::formulas::format_variance;

/// Risk grade of a finding. Failures are collected, never aborted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Material,
    Minor,
    Info,
}

/// GAAP-style audit opinion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Opinion {
    Unqualified,
    Qualified,
    Adverse,
    /// Reserved for runs where the audit could not be completed
    Disclaimer,
}

impl std::fmt::Display for Opinion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Opinion::Unqualified => "UNQUALIFIED",
            Opinion::Qualified => "QUALIFIED",
            Opinion::Adverse => "ADVERSE",
            Opinion::Disclaimer => "DISCLAIMER",
        };
        f.write_str(s)
    }
}

/// One checked rule, for one month or one aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditFinding {
    pub category: String,
    pub rule: String,
    /// Authoritative reference (accounting standard or USALI section)
    pub gaap_reference: String,
    pub severity: Severity,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
    pub variance: String,
    pub recommendation: String,
    pub workpaper_ref: String,
}

impl AuditFinding {
    /// Failed numeric comparison with a formatted variance.
    #[allow(clippy::too_many_arguments)]
    pub fn variance_failure(
        category: &str,
        rule: &str,
        gaap_reference: &str,
        severity: Severity,
        expected: Decimal,
        actual: Decimal,
        recommendation: &str,
        workpaper_ref: &str,
    ) -> Self {
        AuditFinding {
            category: category.into(),
            rule: rule.into(),
            gaap_reference: gaap_reference.into(),
            severity,
            passed: false,
            expected: format!("{expected:.2}"),
            actual: format!("{actual:.2}"),
            variance: format_variance(expected, actual),
            recommendation: recommendation.into(),
            workpaper_ref: workpaper_ref.into(),
        }
    }

    /// Passing numeric comparison, kept as positive evidence.
    pub fn variance_pass(
        category: &str,
        rule: &str,
        gaap_reference: &str,
        expected: Decimal,
        actual: Decimal,
        workpaper_ref: &str,
    ) -> Self {
        AuditFinding {
            category: category.into(),
            rule: rule.into(),
            gaap_reference: gaap_reference.into(),
            severity: Severity::Info,
            passed: true,
            expected: format!("{expected:.2}"),
            actual: format!("{actual:.2}"),
            variance: format_variance(expected, actual),
            recommendation: "None".into(),
            workpaper_ref: workpaper_ref.into(),
        }
    }

    /// Informational note (documentation, summaries).
    pub fn note(
        category: &str,
        rule: &str,
        gaap_reference: &str,
        text: &str,
        workpaper_ref: &str,
    ) -> Self {
        AuditFinding {
            category: category.into(),
            rule: rule.into(),
            gaap_reference: gaap_reference.into(),
            severity: Severity::Info,
            passed: true,
            expected: "—".into(),
            actual: text.into(),
            variance: "—".into(),
            recommendation: "None".into(),
            workpaper_ref: workpaper_ref.into(),
        }
    }

    /// Failed qualitative rule with textual expected/actual.
    #[allow(clippy::too_many_arguments)]
    pub fn violation(
        category: &str,
        rule: &str,
        gaap_reference: &str,
        severity: Severity,
        expected: &str,
        actual: &str,
        recommendation: &str,
        workpaper_ref: &str,
    ) -> Self {
        AuditFinding {
            category: category.into(),
            rule: rule.into(),
            gaap_reference: gaap_reference.into(),
            severity,
            passed: false,
            expected: expected.into(),
            actual: actual.into(),
            variance: "—".into(),
            recommendation: recommendation.into(),
            workpaper_ref: workpaper_ref.into(),
        }
    }
}

/// One accounting domain's findings and tallies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSection {
    pub name: String,
    pub description: String,
    pub findings: Vec<AuditFinding>,
    pub passed: usize,
    pub failed: usize,
    pub material_issues: usize,
}

impl AuditSection {
    pub fn new(name: &str, description: &str) -> Self {
        AuditSection {
            name: name.into(),
            description: description.into(),
            findings: Vec::new(),
            passed: 0,
            failed: 0,
            material_issues: 0,
        }
    }

    pub fn push(&mut self, finding: AuditFinding) {
        if finding.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
            if finding.severity == Severity::Material {
                self.material_issues += 1;
            }
        }
        self.findings.push(finding);
    }

    /// Failed findings of a given severity.
    pub fn failures(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| !f.passed && f.severity == severity)
            .count()
    }
}

/// Full verification report for one property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub timestamp: String,
    pub auditor_name: String,
    pub property_name: String,
    pub sections: Vec<AuditSection>,
    pub total_checks: usize,
    pub total_passed: usize,
    pub total_failed: usize,
    pub critical_issues: usize,
    pub material_issues: usize,
    pub opinion: Opinion,
    pub opinion_text: String,
}
