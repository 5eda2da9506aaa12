use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingKind {
    Threat,
    Warning,
}

/// A single normalized observation produced by a checker.
///
/// `finding_type` together with the optional `qualifier` forms the dedup key.
/// Findings are immutable once produced; nothing downstream rewrites them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    #[serde(rename = "type")]
    pub finding_type: String,
    pub severity: Severity,
    pub description: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
}

impl Finding {
    pub fn threat(
        finding_type: &str,
        severity: Severity,
        description: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Finding {
            kind: FindingKind::Threat,
            finding_type: finding_type.to_string(),
            severity,
            description: description.into(),
            reason: reason.into(),
            qualifier: None,
        }
    }

    pub fn warning(
        finding_type: &str,
        severity: Severity,
        description: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Finding {
            kind: FindingKind::Warning,
            finding_type: finding_type.to_string(),
            severity,
            description: description.into(),
            reason: reason.into(),
            qualifier: None,
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }
}

/// Successful output of one checker: its findings plus free-form metadata
/// surfaced in the verdict details.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckerResult {
    pub findings: Vec<Finding>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl CheckerResult {
    pub fn from_findings(findings: Vec<Finding>) -> Self {
        CheckerResult {
            findings,
            metadata: serde_json::Map::new(),
        }
    }
}

/// Collapse repeated findings keyed by `(type, qualifier)`.
///
/// First occurrence wins; later duplicates are dropped without merging
/// severities. Findings with the same type but different qualifiers are kept.
pub fn dedup_findings(findings: Vec<Finding>) -> Vec<Finding> {
    let mut seen: HashSet<(String, Option<String>)> = HashSet::new();
    let mut out = Vec::with_capacity(findings.len());
    for finding in findings {
        let key = (finding.finding_type.clone(), finding.qualifier.clone());
        if seen.insert(key) {
            out.push(finding);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(finding_type: &str, qualifier: Option<&str>) -> Finding {
        let mut f = Finding::warning(finding_type, Severity::Medium, "desc", "reason");
        f.qualifier = qualifier.map(|q| q.to_string());
        f
    }

    #[test]
    fn test_dedup_same_key_collapses() {
        let deduped = dedup_findings(vec![
            sample("suspicious_tld", None),
            sample("suspicious_tld", None),
        ]);
        assert_eq!(deduped.len(), 1);
    }

    #[test]
    fn test_dedup_first_occurrence_wins() {
        let first = Finding::warning("suspicious_tld", Severity::Low, "first", "a");
        let second = Finding::warning("suspicious_tld", Severity::High, "second", "b");
        let deduped = dedup_findings(vec![first.clone(), second]);
        assert_eq!(deduped, vec![first]);
    }

    #[test]
    fn test_dedup_different_qualifiers_kept() {
        let deduped = dedup_findings(vec![
            sample("breach", Some("example.com")),
            sample("breach", Some("other.com")),
        ]);
        assert_eq!(deduped.len(), 2);
    }

    #[test]
    fn test_dedup_different_types_kept() {
        let deduped = dedup_findings(vec![
            sample("suspicious_tld", None),
            sample("domain_heuristics", None),
        ]);
        assert_eq!(deduped.len(), 2);
    }
}
