use crate::findings::Finding;
use crate::scoring::RiskLevel;
use crate::target::{EmailTarget, UrlTarget};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Per-checker observability record attached to every verdict.
#[derive(Debug, Clone, Serialize)]
pub struct CheckerDiagnostic {
    pub name: String,
    pub succeeded: bool,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Final artifact of a URL scan. Produced exactly once per request and
/// immutable afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub target: UrlTarget,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub safe: bool,
    pub whitelisted: bool,
    pub findings: Vec<Finding>,
    pub checker_diagnostics: Vec<CheckerDiagnostic>,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
}

/// One known data-breach exposure of an email address.
#[derive(Debug, Clone, Serialize)]
pub struct BreachRecord {
    pub source: String,
    pub name: String,
    pub domain: String,
    /// ISO date (YYYY-MM-DD) when known, otherwise the vendor's raw value.
    pub breach_date: String,
    pub description: String,
    pub data_classes: Vec<String>,
    pub verified: bool,
    pub sensitive: bool,
}

/// Final artifact of an email breach check.
#[derive(Debug, Clone, Serialize)]
pub struct EmailVerdict {
    pub target: EmailTarget,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub safe: bool,
    pub total_breaches: usize,
    pub breaches: Vec<BreachRecord>,
    pub findings: Vec<Finding>,
    pub checker_diagnostics: Vec<CheckerDiagnostic>,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Outcome of one entry in a batch email check.
#[derive(Debug, Clone, Serialize)]
pub struct BatchEmailItem {
    pub email: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<EmailVerdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// All-settle summary of a batch email check; one failed entry never aborts
/// the others.
#[derive(Debug, Clone, Serialize)]
pub struct BatchEmailReport {
    pub total_emails: usize,
    pub successful_checks: usize,
    pub failed_checks: usize,
    pub items: Vec<BatchEmailItem>,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
}
