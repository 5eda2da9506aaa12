use crate::config::ScannerConfig;
use crate::findings::{Finding, Severity};
use crate::target::UrlTarget;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DIGIT_RUN_RE: Regex = Regex::new(r"\d{3,}").unwrap();
    static ref LONG_STRING_RE: Regex = Regex::new(r"[a-z]{8,}").unwrap();
    // Generated-domain shapes seen in bulk phishing registrations.
    static ref PHISHING_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"[a-z]+\d{3,}").unwrap(),
        Regex::new(r"\d{3,}[a-z]+\d{3,}").unwrap(),
        Regex::new(r"[a-z]+-[a-z]+-[a-z]+").unwrap(),
        Regex::new(r"[a-z]{2,}\.[a-z]{2,}\.[a-z]{2,}").unwrap(),
        Regex::new(r"[a-z]+[0-9]{3,}[a-z]+").unwrap(),
        Regex::new(r"[a-z]{10,}").unwrap(),
        Regex::new(r"\d{6,}").unwrap(),
    ];
    // Shapes typical of freshly registered throwaway domains (first label only).
    static ref NEW_DOMAIN_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"^[a-z]{1,3}\d{2,4}[a-z]{1,3}$").unwrap(),
        Regex::new(r"^\d{2,4}[a-z]{1,3}\d{2,4}$").unwrap(),
        Regex::new(r"^[a-z]{1,3}-[a-z]{1,3}-\d{2,4}$").unwrap(),
    ];
}

/// Whitelist membership: exact hostname match, or a trusted subdomain of a
/// whitelisted registrable domain. Brand containment never whitelists; that is
/// the lookalike signal's job.
pub fn is_whitelisted(target: &UrlTarget, config: &ScannerConfig) -> bool {
    if config.whitelist.iter().any(|h| h == &target.hostname) {
        return true;
    }
    if let (Some(domain), Some(subdomain)) =
        (target.registrable_domain.as_deref(), target.subdomain.as_deref())
    {
        if config.whitelist.iter().any(|h| h == domain)
            && config.trusted_subdomains.iter().any(|s| s == subdomain)
        {
            return true;
        }
    }
    false
}

/// Lexical URL analysis: pure structural heuristics over the parsed target,
/// no I/O. Runs first and feeds the whitelist short-circuit decision.
pub fn analyze(target: &UrlTarget, config: &ScannerConfig) -> Vec<Finding> {
    let mut findings = Vec::new();
    let hostname = &target.hostname;

    if target.is_ip_literal {
        findings.push(Finding::threat(
            "raw_ip_address",
            Severity::High,
            "URL uses raw IP address instead of domain name",
            "Phishers often use IP addresses to bypass domain-based security measures",
        ));
    }

    if hostname.contains("xn--") {
        findings.push(Finding::threat(
            "punycode_domain",
            Severity::High,
            "Punycode domain detected",
            "Punycode can be used to create visually similar domains for phishing",
        ));
    }

    if hostname.len() > 63 {
        findings.push(Finding::threat(
            "excessive_domain_length",
            Severity::Medium,
            "Domain name is excessively long",
            "Very long domains are often used to hide malicious intent",
        ));
    }

    if let Some(tld) = target.public_suffix() {
        if config.suspicious_tlds.iter().any(|t| t == tld) {
            findings.push(Finding::warning(
                "suspicious_tld",
                Severity::Medium,
                format!("Suspicious top-level domain: .{tld}"),
                "This TLD is commonly associated with malicious sites",
            ));
        }
    }

    // Ordered scan; only the first matching brand is reported.
    for brand in &config.brands {
        if hostname.contains(&brand.token) && !hostname.ends_with(&brand.canonical_domain) {
            findings.push(Finding::threat(
                "lookalike_domain",
                Severity::High,
                format!(
                    "Domain contains brand name \"{}\" but is not the official domain",
                    brand.token
                ),
                "Possible phishing/typosquatting attempt",
            ));
            break;
        }
    }

    let hyphen_count = hostname.matches('-').count();
    if hyphen_count > 2 {
        findings.push(Finding::warning(
            "excessive_hyphens",
            Severity::Medium,
            format!("Domain contains {hyphen_count} hyphens"),
            "Many hyphens can indicate phishing domains",
        ));
    }

    if DIGIT_RUN_RE.is_match(hostname) || LONG_STRING_RE.is_match(hostname) {
        findings.push(Finding::warning(
            "random_elements",
            Severity::Medium,
            "Domain contains random numbers or long strings",
            "Random elements can indicate generated phishing domains",
        ));
    }

    if let Some(subdomain) = target.subdomain.as_deref() {
        if config
            .suspicious_subdomain_keywords
            .iter()
            .any(|k| subdomain.contains(k.as_str()))
        {
            findings.push(Finding::warning(
                "suspicious_subdomain",
                Severity::Medium,
                format!("Suspicious subdomain: {subdomain}"),
                "Subdomain contains suspicious keywords",
            ));
        }
    }

    if PHISHING_PATTERNS.iter().any(|p| p.is_match(hostname)) {
        findings.push(Finding::warning(
            "phishing_pattern",
            Severity::Medium,
            "Domain matches common phishing patterns",
            "Domain structure follows known phishing domain generation patterns",
        ));
    }

    let first_label = hostname.split('.').next().unwrap_or(hostname);
    if NEW_DOMAIN_PATTERNS.iter().any(|p| p.is_match(first_label)) {
        findings.push(Finding::warning(
            "new_domain_pattern",
            Severity::Medium,
            "Domain follows newly registered domain patterns",
            "Domain structure suggests it may be recently registered for malicious purposes",
        ));
    }

    let label_count = hostname.split('.').count();
    if label_count > 3 {
        findings.push(Finding::warning(
            "excessive_domain_parts",
            Severity::Medium,
            format!("Domain has {label_count} parts"),
            "Many domain parts can indicate phishing attempts",
        ));
    }

    if target.scheme == "http" {
        findings.push(Finding::threat(
            "no_ssl_certificate",
            Severity::High,
            "No SSL certificate (HTTPS)",
            "URL uses HTTP instead of HTTPS - vulnerable to man-in-the-middle attacks",
        ));
    }

    let found_keywords: Vec<&str> = config
        .suspicious_path_keywords
        .iter()
        .filter(|k| target.path.contains(k.as_str()))
        .map(|k| k.as_str())
        .collect();
    if !found_keywords.is_empty() {
        findings.push(Finding::warning(
            "suspicious_path_keywords",
            Severity::Medium,
            format!(
                "Suspicious keywords found in URL path: {}",
                found_keywords.join(", ")
            ),
            "These keywords are commonly used in phishing attempts",
        ));
    }

    if config.url_shorteners.iter().any(|s| s == hostname) {
        findings.push(Finding::warning(
            "url_shortener",
            Severity::Medium,
            "URL shortening service detected",
            "Shortened URLs can hide the true destination",
        ));
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::score_findings;

    fn config() -> ScannerConfig {
        ScannerConfig::default()
    }

    fn types(findings: &[Finding]) -> Vec<&str> {
        findings.iter().map(|f| f.finding_type.as_str()).collect()
    }

    fn analyze_url(url: &str) -> Vec<Finding> {
        analyze(&UrlTarget::parse(url).unwrap(), &config())
    }

    #[test]
    fn test_whitelist_exact_hostname() {
        let target = UrlTarget::parse("https://google.com/search").unwrap();
        assert!(is_whitelisted(&target, &config()));
    }

    #[test]
    fn test_whitelist_trusted_subdomain() {
        let target = UrlTarget::parse("https://mail.google.com").unwrap();
        assert!(is_whitelisted(&target, &config()));
    }

    #[test]
    fn test_whitelist_rejects_untrusted_subdomain() {
        let target = UrlTarget::parse("https://evil.google.com").unwrap();
        assert!(!is_whitelisted(&target, &config()));
    }

    #[test]
    fn test_whitelist_rejects_brand_containment() {
        // Partial containment is a threat signal, never a whitelist hit.
        let target = UrlTarget::parse("https://google.com.evil.net").unwrap();
        assert!(!is_whitelisted(&target, &config()));
        let findings = analyze(&target, &config());
        assert!(types(&findings).contains(&"lookalike_domain"));
    }

    #[test]
    fn test_raw_ip_address() {
        let findings = analyze_url("http://192.168.1.10/");
        assert!(types(&findings).contains(&"raw_ip_address"));
    }

    #[test]
    fn test_punycode_domain() {
        let findings = analyze_url("https://xn--pple-43d.com");
        assert!(types(&findings).contains(&"punycode_domain"));
    }

    #[test]
    fn test_suspicious_tld() {
        let findings = analyze_url("https://deal.tk");
        assert!(types(&findings).contains(&"suspicious_tld"));
    }

    #[test]
    fn test_lookalike_flags_first_brand_only() {
        // Hostname contains both "paypal" and "apple" tokens; only one
        // lookalike finding may be emitted.
        let findings = analyze_url("https://paypal-apple-check.net");
        let count = findings
            .iter()
            .filter(|f| f.finding_type == "lookalike_domain")
            .count();
        assert_eq!(count, 1);
        assert!(findings
            .iter()
            .find(|f| f.finding_type == "lookalike_domain")
            .unwrap()
            .description
            .contains("paypal"));
    }

    #[test]
    fn test_official_brand_domain_not_flagged() {
        let findings = analyze_url("https://www.paypal.com");
        assert!(!types(&findings).contains(&"lookalike_domain"));
    }

    #[test]
    fn test_excessive_hyphens() {
        let findings = analyze_url("https://my-very-cheap-deal.org");
        assert!(types(&findings).contains(&"excessive_hyphens"));
    }

    #[test]
    fn test_new_domain_pattern_first_label() {
        let findings = analyze_url("https://ab123cd.org");
        assert!(types(&findings).contains(&"new_domain_pattern"));
    }

    #[test]
    fn test_excessive_domain_parts() {
        let findings = analyze_url("https://a.b.c.example.org");
        assert!(types(&findings).contains(&"excessive_domain_parts"));
    }

    #[test]
    fn test_suspicious_path_keywords() {
        let findings = analyze_url("https://example.org/verify/account");
        assert!(types(&findings).contains(&"suspicious_path_keywords"));
    }

    #[test]
    fn test_url_shortener() {
        let findings = analyze_url("https://bit.ly/abc123");
        assert!(types(&findings).contains(&"url_shortener"));
    }

    #[test]
    fn test_plain_http_scores_at_least_25() {
        let findings = analyze_url("http://totally-random-9284.example");
        assert!(types(&findings).contains(&"no_ssl_certificate"));
        assert!(score_findings(&findings) >= 25);
    }
}
