use crate::findings::{CheckerResult, Finding, Severity};
use hickory_resolver::TokioAsyncResolver;
use std::time::Duration;

/// Raw DNS answers for a hostname. `mx`/`txt` are None when the lookup itself
/// failed or returned nothing; only A-record failure is a threat signal.
#[derive(Debug, Default)]
pub struct DnsRecords {
    pub a: Option<Vec<String>>,
    pub mx: Option<Vec<String>>,
    pub txt: Option<Vec<String>>,
}

/// Resolve A/MX/TXT records and interpret them.
///
/// Each record type tolerates failure independently: a missing MX or TXT
/// answer never aborts the checker, and even total resolution failure is
/// reported as a finding rather than an error.
pub async fn check(hostname: String, lookup_timeout: Duration) -> anyhow::Result<CheckerResult> {
    let resolver = TokioAsyncResolver::tokio_from_system_conf()?;
    let records = fetch_records(&resolver, &hostname, lookup_timeout).await;
    let findings = analyze_records(&hostname, &records);

    let mut result = CheckerResult::from_findings(findings);
    if let Some(a) = &records.a {
        result
            .metadata
            .insert("a_records".to_string(), serde_json::json!(a));
    }
    if let Some(mx) = &records.mx {
        result
            .metadata
            .insert("mx_records".to_string(), serde_json::json!(mx));
    }
    if let Some(txt) = &records.txt {
        result
            .metadata
            .insert("txt_records".to_string(), serde_json::json!(txt));
    }
    Ok(result)
}

async fn fetch_records(
    resolver: &TokioAsyncResolver,
    hostname: &str,
    lookup_timeout: Duration,
) -> DnsRecords {
    let mut records = DnsRecords::default();

    match tokio::time::timeout(lookup_timeout, resolver.ipv4_lookup(hostname)).await {
        Ok(Ok(response)) => {
            let addrs: Vec<String> = response.iter().map(|a| a.0.to_string()).collect();
            log::debug!("{hostname} resolved to {} A records", addrs.len());
            records.a = Some(addrs);
        }
        Ok(Err(e)) => {
            log::debug!("A lookup failed for {hostname}: {e}");
        }
        Err(_) => {
            log::debug!("A lookup timed out for {hostname}");
        }
    }

    // MX/TXT only matter when the domain resolves at all.
    if records.a.is_none() {
        return records;
    }

    match tokio::time::timeout(lookup_timeout, resolver.mx_lookup(hostname)).await {
        Ok(Ok(response)) => {
            records.mx = Some(
                response
                    .iter()
                    .map(|mx| mx.exchange().to_string())
                    .collect(),
            );
        }
        Ok(Err(e)) => {
            log::debug!("MX lookup failed for {hostname}: {e}");
        }
        Err(_) => {
            log::debug!("MX lookup timed out for {hostname}");
        }
    }

    match tokio::time::timeout(lookup_timeout, resolver.txt_lookup(hostname)).await {
        Ok(Ok(response)) => {
            records.txt = Some(
                response
                    .iter()
                    .map(|txt| {
                        txt.txt_data()
                            .iter()
                            .map(|part| String::from_utf8_lossy(part).into_owned())
                            .collect::<String>()
                    })
                    .collect(),
            );
        }
        Ok(Err(e)) => {
            log::debug!("TXT lookup failed for {hostname}: {e}");
        }
        Err(_) => {
            log::debug!("TXT lookup timed out for {hostname}");
        }
    }

    records
}

/// Interpret fetched records. Pure, so the rules are testable without a
/// resolver.
pub fn analyze_records(hostname: &str, records: &DnsRecords) -> Vec<Finding> {
    let mut findings = Vec::new();

    let a_records = match &records.a {
        Some(a) => a,
        None => {
            findings.push(Finding::threat(
                "dns_resolution_failed",
                Severity::High,
                "DNS resolution failed",
                "Could indicate malicious or non-existent domain",
            ));
            return findings;
        }
    };

    if a_records.len() > 5 {
        findings.push(Finding::warning(
            "multiple_ips",
            Severity::Low,
            "Domain resolves to many IP addresses",
            "Could indicate CDN usage or potential malicious infrastructure",
        ));
    }

    let has_mx = records.mx.as_ref().map(|mx| !mx.is_empty()).unwrap_or(false);
    if !has_mx && (hostname.contains("bank") || hostname.contains("secure")) {
        findings.push(Finding::warning(
            "no_mx_records",
            Severity::Low,
            "No mail exchange records found",
            "Legitimate financial/security sites typically have email infrastructure",
        ));
    }

    if let Some(txt) = &records.txt {
        let has_spf = txt.iter().any(|r| r.contains("v=spf1"));
        let has_dmarc = txt.iter().any(|r| r.contains("v=DMARC1"));
        if !has_spf {
            findings.push(Finding::warning(
                "no_spf_record",
                Severity::Low,
                "No SPF record found",
                "Missing SPF record makes domain vulnerable to email spoofing",
            ));
        }
        if !has_dmarc {
            findings.push(Finding::warning(
                "no_dmarc_record",
                Severity::Low,
                "No DMARC record found",
                "Missing DMARC record reduces email security",
            ));
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(findings: &[Finding]) -> Vec<&str> {
        findings.iter().map(|f| f.finding_type.as_str()).collect()
    }

    #[test]
    fn test_resolution_failure_is_high_threat() {
        let findings = analyze_records("example.com", &DnsRecords::default());
        assert_eq!(types(&findings), vec!["dns_resolution_failed"]);
        assert_eq!(findings[0].severity, Severity::High);
    }

    #[test]
    fn test_many_a_records_flagged() {
        let records = DnsRecords {
            a: Some((0..6).map(|i| format!("10.0.0.{i}")).collect()),
            mx: None,
            txt: None,
        };
        let findings = analyze_records("example.com", &records);
        assert!(types(&findings).contains(&"multiple_ips"));
    }

    #[test]
    fn test_missing_mx_only_flagged_for_sensitive_names() {
        let records = DnsRecords {
            a: Some(vec!["10.0.0.1".to_string()]),
            mx: None,
            txt: None,
        };
        let findings = analyze_records("securebank-portal.com", &records);
        assert!(types(&findings).contains(&"no_mx_records"));

        let findings = analyze_records("example.com", &records);
        assert!(!types(&findings).contains(&"no_mx_records"));
    }

    #[test]
    fn test_txt_records_without_spf_and_dmarc() {
        let records = DnsRecords {
            a: Some(vec!["10.0.0.1".to_string()]),
            mx: Some(vec!["mx.example.com.".to_string()]),
            txt: Some(vec!["google-site-verification=abc".to_string()]),
        };
        let findings = analyze_records("example.com", &records);
        assert!(types(&findings).contains(&"no_spf_record"));
        assert!(types(&findings).contains(&"no_dmarc_record"));
    }

    #[test]
    fn test_spf_and_dmarc_present() {
        let records = DnsRecords {
            a: Some(vec!["10.0.0.1".to_string()]),
            mx: Some(vec!["mx.example.com.".to_string()]),
            txt: Some(vec![
                "v=spf1 include:_spf.example.com ~all".to_string(),
                "v=DMARC1; p=reject".to_string(),
            ]),
        };
        let findings = analyze_records("example.com", &records);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_absent_txt_answer_is_not_flagged() {
        // A TXT lookup failure is tolerated; only present-but-incomplete TXT
        // sets produce SPF/DMARC warnings.
        let records = DnsRecords {
            a: Some(vec!["10.0.0.1".to_string()]),
            mx: Some(vec!["mx.example.com.".to_string()]),
            txt: None,
        };
        let findings = analyze_records("example.com", &records);
        assert!(findings.is_empty());
    }
}
