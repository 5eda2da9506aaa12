use crate::findings::{Finding, FindingKind, Severity};
use serde::{Deserialize, Serialize};

/// Discrete risk bucket derived from the numeric score via fixed thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// A target is safe when it sits in the bottom two buckets.
    pub fn is_safe(self) -> bool {
        matches!(self, RiskLevel::Safe | RiskLevel::Low)
    }
}

/// Score thresholds, highest bucket first.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub critical: u8,
    pub high: u8,
    pub medium: u8,
    pub low: u8,
}

/// Thresholds for URL scan scores.
pub const URL_THRESHOLDS: Thresholds = Thresholds {
    critical: 50,
    high: 30,
    medium: 15,
    low: 5,
};

/// Thresholds for email breach scores.
pub const BREACH_THRESHOLDS: Thresholds = Thresholds {
    critical: 80,
    high: 60,
    medium: 40,
    low: 20,
};

impl Thresholds {
    pub fn level_for(&self, score: u8) -> RiskLevel {
        if score >= self.critical {
            RiskLevel::Critical
        } else if score >= self.high {
            RiskLevel::High
        } else if score >= self.medium {
            RiskLevel::Medium
        } else if score >= self.low {
            RiskLevel::Low
        } else {
            RiskLevel::Safe
        }
    }
}

/// Per-type score bonuses added on top of the severity base amounts.
const THREAT_TYPE_BONUS: &[(&str, u32)] = &[
    ("lookalike_domain", 10),
    ("raw_ip_address", 8),
    ("punycode_domain", 8),
];

const WARNING_TYPE_BONUS: &[(&str, u32)] = &[
    ("suspicious_tld", 5),
    ("random_elements", 3),
    ("suspicious_subdomain", 3),
];

fn base_weight(kind: FindingKind, severity: Severity) -> u32 {
    match kind {
        FindingKind::Threat => match severity {
            Severity::Critical => 40,
            Severity::High => 25,
            Severity::Medium => 15,
            Severity::Low => 8,
        },
        FindingKind::Warning => match severity {
            Severity::Critical | Severity::High => 12,
            Severity::Medium => 8,
            Severity::Low => 3,
        },
    }
}

fn type_bonus(kind: FindingKind, finding_type: &str) -> u32 {
    let table = match kind {
        FindingKind::Threat => THREAT_TYPE_BONUS,
        FindingKind::Warning => WARNING_TYPE_BONUS,
    };
    table
        .iter()
        .find(|(name, _)| *name == finding_type)
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0)
}

/// Reduce a finding set to a bounded risk score.
///
/// Pure and deterministic: the same findings always produce the same score.
/// The sum of severity base weights and per-type bonuses, clamped to [0,100].
pub fn score_findings(findings: &[Finding]) -> u8 {
    let total: u32 = findings
        .iter()
        .map(|f| base_weight(f.kind, f.severity) + type_bonus(f.kind, &f.finding_type))
        .sum();
    total.min(100) as u8
}

/// Score a URL finding set and bucket it with the URL thresholds.
pub fn assess_url_findings(findings: &[Finding]) -> (u8, RiskLevel) {
    let score = score_findings(findings);
    (score, URL_THRESHOLDS.level_for(score))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn threat(finding_type: &str, severity: Severity) -> Finding {
        Finding::threat(finding_type, severity, "d", "r")
    }

    fn warning(finding_type: &str, severity: Severity) -> Finding {
        Finding::warning(finding_type, severity, "d", "r")
    }

    #[test]
    fn test_score_saturates_at_100() {
        let findings: Vec<Finding> = (0..10)
            .map(|i| threat(&format!("t{i}"), Severity::Critical))
            .collect();
        assert_eq!(score_findings(&findings), 100);
    }

    #[test]
    fn test_empty_findings_score_zero() {
        assert_eq!(score_findings(&[]), 0);
        assert_eq!(URL_THRESHOLDS.level_for(0), RiskLevel::Safe);
    }

    #[test]
    fn test_severity_base_weights() {
        assert_eq!(score_findings(&[threat("x", Severity::Critical)]), 40);
        assert_eq!(score_findings(&[threat("x", Severity::High)]), 25);
        assert_eq!(score_findings(&[threat("x", Severity::Medium)]), 15);
        assert_eq!(score_findings(&[threat("x", Severity::Low)]), 8);
        assert_eq!(score_findings(&[warning("x", Severity::High)]), 12);
        assert_eq!(score_findings(&[warning("x", Severity::Medium)]), 8);
        assert_eq!(score_findings(&[warning("x", Severity::Low)]), 3);
    }

    #[test]
    fn test_type_bonuses_are_additive() {
        // High threat (25) + lookalike bonus (10)
        let f = threat("lookalike_domain", Severity::High);
        assert_eq!(score_findings(&[f]), 35);
        // Medium warning (8) + suspicious_tld bonus (5)
        let f = warning("suspicious_tld", Severity::Medium);
        assert_eq!(score_findings(&[f]), 13);
        // Bonuses only apply to the matching kind.
        let f = threat("suspicious_tld", Severity::Medium);
        assert_eq!(score_findings(&[f]), 15);
    }

    #[test]
    fn test_url_threshold_boundaries() {
        assert_eq!(URL_THRESHOLDS.level_for(4), RiskLevel::Safe);
        assert_eq!(URL_THRESHOLDS.level_for(5), RiskLevel::Low);
        assert_eq!(URL_THRESHOLDS.level_for(15), RiskLevel::Medium);
        assert_eq!(URL_THRESHOLDS.level_for(30), RiskLevel::High);
        assert_eq!(URL_THRESHOLDS.level_for(50), RiskLevel::Critical);
        assert_eq!(URL_THRESHOLDS.level_for(100), RiskLevel::Critical);
    }

    #[test]
    fn test_breach_threshold_boundaries() {
        assert_eq!(BREACH_THRESHOLDS.level_for(19), RiskLevel::Safe);
        assert_eq!(BREACH_THRESHOLDS.level_for(20), RiskLevel::Low);
        assert_eq!(BREACH_THRESHOLDS.level_for(40), RiskLevel::Medium);
        assert_eq!(BREACH_THRESHOLDS.level_for(60), RiskLevel::High);
        assert_eq!(BREACH_THRESHOLDS.level_for(80), RiskLevel::Critical);
    }

    #[test]
    fn test_reducer_is_idempotent() {
        let findings = vec![
            threat("raw_ip_address", Severity::High),
            warning("suspicious_tld", Severity::Medium),
            warning("excessive_hyphens", Severity::Medium),
        ];
        let first = assess_url_findings(&findings);
        let second = assess_url_findings(&findings);
        assert_eq!(first, second);
    }
}
