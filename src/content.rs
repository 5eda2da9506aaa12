use crate::config::ScannerConfig;
use crate::findings::{CheckerResult, Finding, Severity};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;

lazy_static! {
    static ref TITLE_RE: Regex = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap();
    static ref FORM_RE: Regex = Regex::new(r"(?is)<form\b[^>]*>").unwrap();
    static ref EXTERNAL_SCRIPT_RE: Regex =
        Regex::new(r#"(?i)<script\b[^>]*src\s*=\s*["']https?://"#).unwrap();
    static ref IFRAME_RE: Regex = Regex::new(r"(?i)<iframe\b").unwrap();
    static ref METHOD_POST_RE: Regex = Regex::new(r#"(?i)method\s*=\s*["']?post"#).unwrap();
    static ref ACTION_LOGIN_RE: Regex = Regex::new(r#"(?i)action\s*=\s*["'][^"']*login"#).unwrap();
}

/// Fetch the page and inspect its markup for phishing tells. A fetch failure
/// is itself a low-severity warning, not a checker failure.
pub async fn check(
    client: Client,
    url: String,
    config: &ScannerConfig,
) -> anyhow::Result<CheckerResult> {
    let response = client
        .get(&url)
        .timeout(Duration::from_secs(config.vendor_timeout_seconds))
        .send()
        .await;

    let body = match response {
        Ok(r) => match r.text().await {
            Ok(t) => t,
            Err(e) => return Ok(fetch_failure(&e.to_string())),
        },
        Err(e) => return Ok(fetch_failure(&e.to_string())),
    };

    Ok(analyze_markup(&body, config))
}

fn fetch_failure(reason: &str) -> CheckerResult {
    CheckerResult::from_findings(vec![Finding::warning(
        "content_analysis_failed",
        Severity::Low,
        "Failed to analyze page content",
        reason,
    )])
}

/// Markup inspection, pure over the fetched body.
pub fn analyze_markup(body: &str, config: &ScannerConfig) -> CheckerResult {
    let mut findings = Vec::new();
    let mut result = CheckerResult::default();

    if let Some(caps) = TITLE_RE.captures(body) {
        let title = caps.get(1).map(|m| m.as_str()).unwrap_or("").to_lowercase();
        let found: Vec<&str> = config
            .suspicious_title_keywords
            .iter()
            .filter(|k| title.contains(k.as_str()))
            .map(|k| k.as_str())
            .collect();
        if !found.is_empty() {
            findings.push(Finding::warning(
                "suspicious_title_keywords",
                Severity::Medium,
                format!("Suspicious keywords in page title: {}", found.join(", ")),
                "These keywords are commonly used in phishing pages",
            ));
        }
    }

    let forms: Vec<&str> = FORM_RE.find_iter(body).map(|m| m.as_str()).collect();
    if !forms.is_empty() {
        result
            .metadata
            .insert("form_count".to_string(), serde_json::json!(forms.len()));
        if forms
            .iter()
            .any(|form| METHOD_POST_RE.is_match(form) && ACTION_LOGIN_RE.is_match(form))
        {
            findings.push(Finding::warning(
                "login_form_detected",
                Severity::Medium,
                "Login form detected",
                "Could be legitimate or credential harvesting attempt",
            ));
        }
    }

    if EXTERNAL_SCRIPT_RE.find_iter(body).count() > 5 {
        findings.push(Finding::warning(
            "many_external_scripts",
            Severity::Low,
            "Many external scripts loaded",
            "Could indicate tracking or malicious code injection",
        ));
    }

    let iframe_count = IFRAME_RE.find_iter(body).count();
    if iframe_count > 0 {
        result
            .metadata
            .insert("iframe_count".to_string(), serde_json::json!(iframe_count));
        findings.push(Finding::warning(
            "iframes_detected",
            Severity::Low,
            "Iframes detected on page",
            "Iframes can be used for clickjacking or content injection",
        ));
    }

    result.findings = findings;
    result
}

/// SSL-only analysis stage. Screenshot capture is not implemented, so this
/// stage reports that and falls back to a plain transport check.
pub fn ssl_check(scheme: &str) -> CheckerResult {
    let mut findings = vec![Finding::warning(
        "screenshot_disabled",
        Severity::Low,
        "Screenshot analysis disabled",
        "Screenshot capture is not available in this build",
    )];

    if scheme != "https" {
        findings.push(Finding::threat(
            "no_ssl_certificate",
            Severity::High,
            "No SSL certificate (HTTPS)",
            "URL uses HTTP instead of HTTPS - vulnerable to man-in-the-middle attacks",
        ));
    }

    CheckerResult::from_findings(findings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ScannerConfig {
        ScannerConfig::default()
    }

    fn types(result: &CheckerResult) -> Vec<&str> {
        result
            .findings
            .iter()
            .map(|f| f.finding_type.as_str())
            .collect()
    }

    #[test]
    fn test_suspicious_title_keywords() {
        let body = "<html><head><title>PayPal Login - Verify Account</title></head></html>";
        let result = analyze_markup(body, &config());
        assert!(types(&result).contains(&"suspicious_title_keywords"));
    }

    #[test]
    fn test_post_login_form_detected() {
        let body = r#"<form method="POST" action="/login/submit"><input name="pw"></form>"#;
        let result = analyze_markup(body, &config());
        assert!(types(&result).contains(&"login_form_detected"));
    }

    #[test]
    fn test_get_form_not_flagged() {
        let body = r#"<form method="get" action="/search"></form>"#;
        let result = analyze_markup(body, &config());
        assert!(!types(&result).contains(&"login_form_detected"));
        assert_eq!(result.metadata["form_count"], serde_json::json!(1));
    }

    #[test]
    fn test_iframes_and_scripts() {
        let scripts = r#"<script src="https://x.test/a.js"></script>"#.repeat(6);
        let body = format!("{scripts}<iframe src=\"https://x.test\"></iframe>");
        let result = analyze_markup(&body, &config());
        assert!(types(&result).contains(&"many_external_scripts"));
        assert!(types(&result).contains(&"iframes_detected"));
    }

    #[test]
    fn test_ssl_check_flags_http() {
        let result = ssl_check("http");
        assert!(types(&result).contains(&"no_ssl_certificate"));
        assert!(types(&result).contains(&"screenshot_disabled"));

        let result = ssl_check("https");
        assert!(!types(&result).contains(&"no_ssl_certificate"));
    }
}
