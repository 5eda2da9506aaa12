use crate::config::ScannerConfig;
use crate::error::ScanError;
use crate::findings::{dedup_findings, Finding, Severity};
use crate::reputation;
use crate::scoring::BREACH_THRESHOLDS;
use crate::target::EmailTarget;
use crate::verdict::{
    BatchEmailItem, BatchEmailReport, BreachRecord, CheckerDiagnostic, EmailVerdict,
};
use chrono::{Datelike, NaiveDate, Utc};
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Email breach and reputation checking engine.
#[derive(Clone)]
pub struct EmailChecker {
    config: Arc<ScannerConfig>,
    client: Client,
}

/// Output of one breach data source: records found plus advisory findings.
#[derive(Debug, Default)]
struct BreachSourceResult {
    breaches: Vec<BreachRecord>,
    findings: Vec<Finding>,
}

impl EmailChecker {
    pub fn new(config: ScannerConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.vendor_timeout_seconds))
            .user_agent(concat!("phishguard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(EmailChecker {
            config: Arc::new(config),
            client,
        })
    }

    /// Check one email address against breach data and reputation heuristics.
    /// Only a malformed address is an error.
    pub async fn check_email(&self, raw: &str) -> Result<EmailVerdict, ScanError> {
        let started = Instant::now();
        let timestamp = Utc::now();
        let target = EmailTarget::parse(raw)?;
        log::info!("Breach check for {}@{}", target.local_part, target.domain);

        let mut diagnostics = Vec::new();
        let mut breaches = Vec::new();
        let mut findings = Vec::new();

        // Breach directory lookup and reputation heuristics settle
        // independently; a vendor failure never aborts the check.
        let vendor_started = Instant::now();
        let timeout = Duration::from_secs(self.config.checker_timeout_seconds);
        let vendor = tokio::time::timeout(
            timeout,
            check_breach_directory(&self.client, &target, &self.config),
        )
        .await;
        let vendor_ms = vendor_started.elapsed().as_millis() as u64;
        match vendor {
            Ok(Ok(result)) => {
                breaches.extend(result.breaches);
                findings.extend(result.findings);
                diagnostics.push(CheckerDiagnostic {
                    name: "breach_directory".to_string(),
                    succeeded: true,
                    duration_ms: vendor_ms,
                    error: None,
                });
            }
            Ok(Err(e)) => {
                findings.push(checker_failed("breach_directory", &e.to_string()));
                diagnostics.push(CheckerDiagnostic {
                    name: "breach_directory".to_string(),
                    succeeded: false,
                    duration_ms: vendor_ms,
                    error: Some(e.to_string()),
                });
            }
            Err(_) => {
                findings.push(checker_failed("breach_directory", "timeout"));
                diagnostics.push(CheckerDiagnostic {
                    name: "breach_directory".to_string(),
                    succeeded: false,
                    duration_ms: vendor_ms,
                    error: Some("timeout".to_string()),
                });
            }
        }

        let rep_started = Instant::now();
        let rep = reputation::check_email(&target, &self.config);
        diagnostics.push(CheckerDiagnostic {
            name: "reputation".to_string(),
            succeeded: true,
            duration_ms: rep_started.elapsed().as_millis() as u64,
            error: None,
        });
        findings.extend(rep.findings);
        breaches.extend(rep.synthetic_breach);

        let breaches = dedup_breaches(breaches);
        let findings = dedup_findings(findings);

        let breach_score = score_breaches(&breaches, Utc::now().year());
        let risk_score = (breach_score + rep.risk_score).min(100) as u8;
        let risk_level = BREACH_THRESHOLDS.level_for(risk_score);

        Ok(EmailVerdict {
            safe: risk_level.is_safe(),
            risk_score,
            risk_level,
            total_breaches: breaches.len(),
            breaches,
            findings,
            checker_diagnostics: diagnostics,
            target,
            timestamp,
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Check a batch of addresses as an outer all-settle fan-out: every entry
    /// is attempted, per-entry failures are reported in place.
    pub async fn batch_check(&self, emails: &[String]) -> BatchEmailReport {
        let started = Instant::now();
        let timestamp = Utc::now();
        log::info!("Batch breach check for {} emails", emails.len());

        let handles: Vec<_> = emails
            .iter()
            .map(|email| {
                let checker = self.clone();
                let email = email.clone();
                tokio::spawn(async move { checker.check_email(&email).await })
            })
            .collect();

        let mut items = Vec::with_capacity(emails.len());
        for (email, handle) in emails.iter().zip(handles) {
            let item = match handle.await {
                Ok(Ok(verdict)) => BatchEmailItem {
                    email: email.clone(),
                    success: true,
                    verdict: Some(verdict),
                    error: None,
                },
                Ok(Err(e)) => BatchEmailItem {
                    email: email.clone(),
                    success: false,
                    verdict: None,
                    error: Some(e.to_string()),
                },
                Err(join_error) => BatchEmailItem {
                    email: email.clone(),
                    success: false,
                    verdict: None,
                    error: Some(format!("check panicked: {join_error}")),
                },
            };
            items.push(item);
        }

        let successful_checks = items.iter().filter(|i| i.success).count();
        BatchEmailReport {
            total_emails: items.len(),
            failed_checks: items.len() - successful_checks,
            successful_checks,
            items,
            timestamp,
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }
}

fn checker_failed(name: &str, reason: &str) -> Finding {
    Finding::warning(
        "checker_failed",
        Severity::Low,
        format!("Checker {name} failed"),
        reason,
    )
    .with_qualifier(name)
}

/// Query the BreachDirectory API. A missing RapidAPI key makes this a neutral
/// no-signal source with an advisory warning, never a failure.
async fn check_breach_directory(
    client: &Client,
    target: &EmailTarget,
    config: &ScannerConfig,
) -> anyhow::Result<BreachSourceResult> {
    let key = match config.vendor_keys.rapidapi.as_deref() {
        Some(key) => key,
        None => {
            log::debug!("BreachDirectory lookup skipped: no RapidAPI key configured");
            return Ok(BreachSourceResult {
                breaches: Vec::new(),
                findings: vec![Finding::warning(
                    "api_unavailable",
                    Severity::Low,
                    "BreachDirectory API not configured",
                    "RapidAPI key not set",
                )],
            });
        }
    };

    let response = client
        .get("https://breachdirectory.p.rapidapi.com/")
        .query(&[("func", "auto"), ("term", target.raw_input.as_str())])
        .header("X-RapidAPI-Key", key)
        .header("X-RapidAPI-Host", "breachdirectory.p.rapidapi.com")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("BreachDirectory returned HTTP {status}");
    }

    let data: serde_json::Value = response.json().await?;
    let breaches = data
        .get("result")
        .and_then(|r| r.as_array())
        .map(|rows| {
            rows.iter()
                .map(|row| BreachRecord {
                    source: "BreachDirectory".to_string(),
                    name: field_or_unknown(row, "line"),
                    domain: field_or_unknown(row, "domain"),
                    breach_date: field_or_unknown(row, "date"),
                    description: "Data breach detected".to_string(),
                    data_classes: vec!["email".to_string(), "password".to_string()],
                    verified: true,
                    sensitive: false,
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(BreachSourceResult {
        breaches,
        findings: Vec::new(),
    })
}

fn field_or_unknown(row: &serde_json::Value, field: &str) -> String {
    row.get(field)
        .and_then(|v| v.as_str())
        .unwrap_or("Unknown")
        .to_string()
}

/// Drop duplicate breach records keyed by `(name, domain)`, first wins.
pub fn dedup_breaches(breaches: Vec<BreachRecord>) -> Vec<BreachRecord> {
    let mut seen = HashSet::new();
    breaches
        .into_iter()
        .filter(|b| seen.insert((b.name.clone(), b.domain.clone())))
        .collect()
}

/// Breach-side risk reduction: a flat amount per breach plus bonuses for
/// sensitive data, verified records, broad data exposure and recency.
pub fn score_breaches(breaches: &[BreachRecord], current_year: i32) -> u32 {
    let mut score = 0u32;
    for breach in breaches {
        score += 20;
        if breach.sensitive {
            score += 15;
        }
        if breach.verified {
            score += 10;
        }
        if breach.data_classes.len() > 3 {
            score += 10;
        }
        if let Some(year) = breach_year(&breach.breach_date) {
            if current_year - year <= 2 {
                score += 10;
            }
        }
    }
    score.min(100)
}

fn breach_year(date: &str) -> Option<i32> {
    if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Some(parsed.year());
    }
    date.get(0..4)?.parse().ok()
}
