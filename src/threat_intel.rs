use crate::config::ScannerConfig;
use crate::findings::{CheckerResult, Finding, FindingKind, Severity};
use reqwest::Client;
use std::time::Duration;

/// Normalized output of one vendor lookup. Every vendor-specific response
/// shape is reduced to this before anything downstream sees it.
#[derive(Debug, Clone)]
pub struct VendorSignal {
    pub vendor: &'static str,
    pub finding_type: &'static str,
    pub kind: FindingKind,
    pub severity: Severity,
    pub description: String,
    pub detail: String,
}

impl VendorSignal {
    fn into_finding(self) -> Finding {
        Finding {
            kind: self.kind,
            finding_type: self.finding_type.to_string(),
            severity: self.severity,
            description: self.description,
            reason: self.detail,
            qualifier: None,
        }
    }
}

/// Fan out to all configured vendors with all-settle semantics.
///
/// A vendor with no credentials is skipped as a neutral no-signal result; a
/// vendor HTTP failure is logged and likewise neutral. Each vendor maps to at
/// most one finding.
pub async fn check(
    client: Client,
    url: String,
    hostname: String,
    config: &ScannerConfig,
) -> anyhow::Result<CheckerResult> {
    let timeout = Duration::from_secs(config.vendor_timeout_seconds);

    let (safe_browsing, virus_total, url_void, phish_tank) = tokio::join!(
        check_google_safe_browsing(&client, &url, config, timeout),
        check_virustotal(&client, &url, config, timeout),
        check_urlvoid(&client, &hostname, config, timeout),
        check_phishtank(&client, &url, timeout),
    );

    let findings = [safe_browsing, virus_total, url_void, phish_tank]
        .into_iter()
        .flatten()
        .map(VendorSignal::into_finding)
        .collect();

    Ok(CheckerResult::from_findings(findings))
}

async fn check_google_safe_browsing(
    client: &Client,
    url: &str,
    config: &ScannerConfig,
    timeout: Duration,
) -> Option<VendorSignal> {
    let key = config.vendor_keys.google_safe_browsing.as_deref()?;

    let body = serde_json::json!({
        "client": { "clientId": "phishguard", "clientVersion": env!("CARGO_PKG_VERSION") },
        "threatInfo": {
            "threatTypes": [
                "MALWARE",
                "SOCIAL_ENGINEERING",
                "UNWANTED_SOFTWARE",
                "POTENTIALLY_HARMFUL_APPLICATION"
            ],
            "platformTypes": ["ANY_PLATFORM"],
            "threatEntryTypes": ["URL"],
            "threatEntries": [{ "url": url }]
        }
    });

    let response = client
        .post(format!(
            "https://safebrowsing.googleapis.com/v4/threatMatches:find?key={key}"
        ))
        .json(&body)
        .timeout(timeout)
        .send()
        .await;

    let data: serde_json::Value = match response {
        Ok(r) => match r.json().await {
            Ok(v) => v,
            Err(e) => {
                log::debug!("Safe Browsing response decode failed: {e}");
                return None;
            }
        },
        Err(e) => {
            log::debug!("Safe Browsing lookup failed: {e}");
            return None;
        }
    };

    let matches = data.get("matches")?.as_array()?;
    if matches.is_empty() {
        return None;
    }
    let threat_types: Vec<&str> = matches
        .iter()
        .filter_map(|m| m.get("threatType").and_then(|t| t.as_str()))
        .collect();

    Some(VendorSignal {
        vendor: "GoogleSafeBrowsing",
        finding_type: "google_safe_browsing",
        kind: FindingKind::Threat,
        severity: Severity::High,
        description: "Flagged by Google Safe Browsing".to_string(),
        detail: threat_types.join(", "),
    })
}

async fn check_virustotal(
    client: &Client,
    url: &str,
    config: &ScannerConfig,
    timeout: Duration,
) -> Option<VendorSignal> {
    let key = config.vendor_keys.virustotal.as_deref()?;

    let response = client
        .get("https://www.virustotal.com/vtapi/v2/url/report")
        .query(&[("apikey", key), ("resource", url)])
        .timeout(timeout)
        .send()
        .await;

    let data: serde_json::Value = match response {
        Ok(r) => match r.json().await {
            Ok(v) => v,
            Err(e) => {
                log::debug!("VirusTotal response decode failed: {e}");
                return None;
            }
        },
        Err(e) => {
            log::debug!("VirusTotal lookup failed: {e}");
            return None;
        }
    };

    let positives = data.get("positives").and_then(|p| p.as_u64()).unwrap_or(0);
    if positives == 0 {
        return None;
    }

    Some(VendorSignal {
        vendor: "VirusTotal",
        finding_type: "virus_total",
        kind: FindingKind::Threat,
        severity: Severity::High,
        description: format!("Flagged by {positives} security vendors"),
        detail: "Multiple security vendors have flagged this URL as malicious".to_string(),
    })
}

async fn check_urlvoid(
    client: &Client,
    hostname: &str,
    config: &ScannerConfig,
    timeout: Duration,
) -> Option<VendorSignal> {
    let key = config.vendor_keys.urlvoid.as_deref()?;

    let response = client
        .get(format!("https://api.urlvoid.com/v1/purl/{hostname}"))
        .header("API-Key", key)
        .timeout(timeout)
        .send()
        .await;

    let data: serde_json::Value = match response {
        Ok(r) => match r.json().await {
            Ok(v) => v,
            Err(e) => {
                log::debug!("URLVoid response decode failed: {e}");
                return None;
            }
        },
        Err(e) => {
            log::debug!("URLVoid lookup failed: {e}");
            return None;
        }
    };

    // Unknown reputation counts as neutral, not as low.
    let reputation = data.get("reputation").and_then(|r| r.as_u64()).unwrap_or(50);
    if reputation >= 50 {
        return None;
    }

    Some(VendorSignal {
        vendor: "URLVoid",
        finding_type: "urlvoid_reputation",
        kind: FindingKind::Warning,
        severity: Severity::Medium,
        description: "Low domain reputation score".to_string(),
        detail: format!("Domain reputation: {reputation}/100"),
    })
}

// PhishTank's check endpoint needs no credentials, so it always runs.
async fn check_phishtank(client: &Client, url: &str, timeout: Duration) -> Option<VendorSignal> {
    let response = client
        .get("https://checkurl.phishtank.com/checkurl/")
        .query(&[("url", url)])
        .timeout(timeout)
        .send()
        .await;

    let body = match response {
        Ok(r) => match r.text().await {
            Ok(t) => t,
            Err(e) => {
                log::debug!("PhishTank response read failed: {e}");
                return None;
            }
        },
        Err(e) => {
            log::debug!("PhishTank lookup failed: {e}");
            return None;
        }
    };

    if !body.contains("phish confirmed") && !body.contains("phish verified") {
        return None;
    }

    Some(VendorSignal {
        vendor: "PhishTank",
        finding_type: "phishtank",
        kind: FindingKind::Threat,
        severity: Severity::Critical,
        description: "Found in PhishTank database".to_string(),
        detail: "Community-verified phishing attempt".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_vendors_are_neutral() {
        // No credentials configured: Safe Browsing, VirusTotal and URLVoid
        // must all short-circuit to None without any network traffic.
        let config = ScannerConfig::default();
        let client = Client::new();
        let timeout = Duration::from_secs(1);

        assert!(
            check_google_safe_browsing(&client, "https://example.com", &config, timeout)
                .await
                .is_none()
        );
        assert!(check_virustotal(&client, "https://example.com", &config, timeout)
            .await
            .is_none());
        assert!(check_urlvoid(&client, "example.com", &config, timeout)
            .await
            .is_none());
    }

    #[test]
    fn test_vendor_signal_maps_to_single_finding() {
        let signal = VendorSignal {
            vendor: "PhishTank",
            finding_type: "phishtank",
            kind: FindingKind::Threat,
            severity: Severity::Critical,
            description: "Found in PhishTank database".to_string(),
            detail: "Community-verified phishing attempt".to_string(),
        };
        let finding = signal.into_finding();
        assert_eq!(finding.finding_type, "phishtank");
        assert_eq!(finding.severity, Severity::Critical);
        assert_eq!(finding.kind, FindingKind::Threat);
    }
}
