use crate::config::ScannerConfig;
use crate::findings::{CheckerResult, Finding, Severity};
use crate::target::EmailTarget;
use crate::verdict::BreachRecord;
use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LOCAL_PART_PATTERNS: Vec<(Regex, &'static str)> = vec![
        (
            Regex::new(r"admin|root|test|demo|example").unwrap(),
            "Common admin/test emails are often targeted",
        ),
        (
            Regex::new(r"[0-9]{8,}").unwrap(),
            "Email contains excessive numbers (potential spam)",
        ),
        (
            Regex::new(r"[a-z]{20,}").unwrap(),
            "Email contains very long random string",
        ),
        (
            Regex::new(r"[a-z0-9]{15,}@").unwrap(),
            "Email username is suspiciously long",
        ),
    ];
    static ref BREACH_TARGET_PATTERNS: Vec<(Regex, &'static str)> = vec![
        (
            Regex::new(r"password|pwd|pass").unwrap(),
            "Email contains password-related keywords",
        ),
        (
            Regex::new(r"login|signin|auth").unwrap(),
            "Email contains authentication keywords",
        ),
        (
            Regex::new(r"bank|paypal|stripe|venmo").unwrap(),
            "Email contains financial keywords",
        ),
        (
            Regex::new(r"crypto|bitcoin|wallet").unwrap(),
            "Email contains cryptocurrency keywords",
        ),
    ];
}

/// Domain reputation heuristics for URL scans. Pure; tolerates a missing
/// domain by emitting a single low-severity warning instead of failing.
pub fn check_domain(domain: Option<&str>, config: &ScannerConfig) -> CheckerResult {
    let domain = match domain {
        Some(d) if !d.is_empty() => d,
        _ => {
            return CheckerResult::from_findings(vec![Finding::warning(
                "invalid_domain",
                Severity::Low,
                "Invalid domain parameter",
                "Domain is missing or empty",
            )]);
        }
    };

    let mut reasons = Vec::new();

    let tld = domain.rsplit('.').next().unwrap_or(domain);
    if config.suspicious_tlds.iter().any(|t| t == tld) {
        reasons.push(format!("Suspicious TLD: .{tld}"));
    }

    let hyphen_count = domain.matches('-').count();
    if hyphen_count > 2 {
        reasons.push(format!("Excessive hyphens: {hyphen_count}"));
    }

    if domain.len() > 50 {
        reasons.push("Domain name too long".to_string());
    }

    if domain.contains("xn--") {
        reasons.push("Punycode domain detected".to_string());
    }

    let found_keywords: Vec<&str> = config
        .suspicious_domain_keywords
        .iter()
        .filter(|k| domain.contains(k.as_str()))
        .map(|k| k.as_str())
        .collect();
    if !found_keywords.is_empty() {
        reasons.push(format!("Suspicious keywords: {}", found_keywords.join(", ")));
    }

    let mut result = CheckerResult::default();
    result.metadata.insert(
        "domain_info".to_string(),
        serde_json::json!({
            "domain": domain,
            "tld": tld,
            "suspicious": !reasons.is_empty(),
            "hyphen_count": hyphen_count,
            "length": domain.len(),
        }),
    );

    if !reasons.is_empty() {
        result.findings.push(Finding::warning(
            "domain_heuristics",
            Severity::Medium,
            "Domain shows suspicious patterns",
            reasons.join(", "),
        ));
    }
    result
}

/// Outcome of the pure email reputation heuristics.
#[derive(Debug, Default)]
pub struct EmailReputation {
    pub findings: Vec<Finding>,
    /// Partial risk contribution, added to the breach score before clamping.
    pub risk_score: u32,
    /// Synthesized when the heuristics alone cross the high-risk bar.
    pub synthetic_breach: Option<BreachRecord>,
}

/// Email reputation heuristics: disposable domains, suspicious local parts,
/// breach-target keywords and risky domain extensions. Pure, no I/O.
pub fn check_email(target: &EmailTarget, config: &ScannerConfig) -> EmailReputation {
    let mut rep = EmailReputation::default();
    let full_lower = format!("{}@{}", target.local_part, target.domain);

    if config
        .disposable_email_domains
        .iter()
        .any(|d| d == &target.domain)
    {
        rep.findings.push(Finding::warning(
            "disposable_email",
            Severity::Medium,
            "Email uses disposable email service",
            "Disposable emails are often used for malicious purposes",
        ));
        rep.risk_score += 30;
    }

    for (pattern, reason) in LOCAL_PART_PATTERNS.iter() {
        if pattern.is_match(&full_lower) {
            rep.findings.push(
                Finding::warning(
                    "suspicious_email_pattern",
                    Severity::Low,
                    "Email contains suspicious patterns",
                    *reason,
                )
                .with_qualifier(*reason),
            );
            rep.risk_score += 10;
        }
    }

    for (pattern, reason) in BREACH_TARGET_PATTERNS.iter() {
        if pattern.is_match(&full_lower) {
            rep.findings.push(
                Finding::warning(
                    "potential_breach_target",
                    Severity::Medium,
                    "Email matches common breach target patterns",
                    *reason,
                )
                .with_qualifier(*reason),
            );
            rep.risk_score += 20;
        }
    }

    if config
        .suspicious_email_tlds
        .iter()
        .any(|tld| target.domain.ends_with(&format!(".{tld}")))
    {
        rep.findings.push(Finding::warning(
            "suspicious_domain",
            Severity::Medium,
            "Email uses suspicious domain extension",
            "New or less reputable domain extensions are often used for phishing",
        ));
        rep.risk_score += 25;
    }

    if rep.risk_score >= 50 {
        rep.synthetic_breach = Some(BreachRecord {
            source: "EmailReputation".to_string(),
            name: "High Risk Email Pattern".to_string(),
            domain: target.domain.clone(),
            breach_date: Utc::now().format("%Y-%m-%d").to_string(),
            description: "Email matches multiple high-risk patterns".to_string(),
            data_classes: vec!["email".to_string(), "pattern_analysis".to_string()],
            verified: false,
            sensitive: false,
        });
    }

    rep
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ScannerConfig {
        ScannerConfig::default()
    }

    #[test]
    fn test_missing_domain_is_a_warning_not_an_error() {
        let result = check_domain(None, &config());
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].finding_type, "invalid_domain");
        assert_eq!(result.findings[0].severity, Severity::Low);

        let result = check_domain(Some(""), &config());
        assert_eq!(result.findings[0].finding_type, "invalid_domain");
    }

    #[test]
    fn test_clean_domain_has_no_findings() {
        let result = check_domain(Some("example.org"), &config());
        assert!(result.findings.is_empty());
    }

    #[test]
    fn test_suspicious_domain_lists_all_reasons() {
        let result = check_domain(Some("secure-bank-login-verify.tk"), &config());
        assert_eq!(result.findings.len(), 1);
        let finding = &result.findings[0];
        assert_eq!(finding.finding_type, "domain_heuristics");
        assert!(finding.reason.contains("Suspicious TLD: .tk"));
        assert!(finding.reason.contains("Excessive hyphens"));
        assert!(finding.reason.contains("secure"));
    }

    #[test]
    fn test_disposable_email_risk() {
        let target = EmailTarget::parse("someone@mailinator.com").unwrap();
        let rep = check_email(&target, &config());
        assert!(rep
            .findings
            .iter()
            .any(|f| f.finding_type == "disposable_email"));
        assert!(rep.risk_score >= 30);
    }

    #[test]
    fn test_breach_target_keywords() {
        let target = EmailTarget::parse("bank-support@example.org").unwrap();
        let rep = check_email(&target, &config());
        assert!(rep
            .findings
            .iter()
            .any(|f| f.finding_type == "potential_breach_target"));
    }

    #[test]
    fn test_high_risk_synthesizes_breach_record() {
        // Disposable domain (+30), "test" local part (+10) and a financial
        // keyword (+20) cross the 50-point bar.
        let target = EmailTarget::parse("paypal-test@mailinator.com").unwrap();
        let rep = check_email(&target, &config());
        assert!(rep.risk_score >= 50);
        let breach = rep.synthetic_breach.expect("synthetic breach expected");
        assert_eq!(breach.source, "EmailReputation");
        assert!(!breach.verified);
    }

    #[test]
    fn test_clean_email_is_quiet() {
        let target = EmailTarget::parse("jane.doe@acme-widgets.org").unwrap();
        let rep = check_email(&target, &config());
        assert!(rep.findings.is_empty());
        assert_eq!(rep.risk_score, 0);
        assert!(rep.synthetic_breach.is_none());
    }
}
