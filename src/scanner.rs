use crate::config::ScannerConfig;
use crate::content;
use crate::dispatch::{self, CheckerOutcome};
use crate::dns;
use crate::error::ScanError;
use crate::findings::{dedup_findings, CheckerResult, Finding};
use crate::lexical;
use crate::reputation;
use crate::scoring::{self, RiskLevel};
use crate::target::UrlTarget;
use crate::threat_intel;
use crate::verdict::Verdict;
use chrono::Utc;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Optional scan stages requested by the caller.
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    pub include_content: bool,
    pub include_screenshot: bool,
    pub include_threat_intel: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            include_content: false,
            include_screenshot: false,
            include_threat_intel: true,
        }
    }
}

/// The URL scanning engine: runs the lexical stage, then fans out the
/// remaining checkers concurrently and reduces their findings to a verdict.
pub struct UrlScanner {
    config: Arc<ScannerConfig>,
    client: Client,
}

impl UrlScanner {
    pub fn new(config: ScannerConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.vendor_timeout_seconds))
            .user_agent(concat!("phishguard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(UrlScanner {
            config: Arc::new(config),
            client,
        })
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Scan a URL. Only malformed input is an error; every checker failure is
    /// absorbed into the verdict as a finding.
    pub async fn scan(&self, raw: &str, options: ScanOptions) -> Result<Verdict, ScanError> {
        let started = Instant::now();
        let timestamp = Utc::now();
        let target = UrlTarget::parse(raw)?;
        log::info!("Scanning {}", target.normalized_url);

        // Lexical analysis runs first: it is pure and it decides the
        // whitelist short-circuit before any network checker starts.
        let lexical_started = Instant::now();
        if lexical::is_whitelisted(&target, &self.config) {
            log::debug!("{} is whitelisted, skipping all checkers", target.hostname);
            let outcome = CheckerOutcome::success(
                "lexical",
                CheckerResult::default(),
                lexical_started.elapsed().as_millis() as u64,
            );
            return Ok(Verdict {
                target,
                risk_score: 0,
                risk_level: RiskLevel::Safe,
                safe: true,
                whitelisted: true,
                findings: Vec::new(),
                checker_diagnostics: vec![outcome.diagnostic()],
                timestamp,
                duration_ms: started.elapsed().as_millis() as u64,
            });
        }

        let lexical_findings = lexical::analyze(&target, &self.config);
        let lexical_outcome = CheckerOutcome::success(
            "lexical",
            CheckerResult::from_findings(lexical_findings),
            lexical_started.elapsed().as_millis() as u64,
        );

        let tasks = self.spawn_checkers(&target, options);
        let timeout = Duration::from_secs(self.config.checker_timeout_seconds);
        let settled = dispatch::settle(tasks, timeout).await;

        let mut outcomes = vec![lexical_outcome];
        outcomes.extend(settled);

        let findings: Vec<Finding> = outcomes.iter().flat_map(|o| o.findings()).collect();
        let findings = dedup_findings(findings);
        let (risk_score, risk_level) = scoring::assess_url_findings(&findings);

        let verdict = Verdict {
            safe: risk_level.is_safe(),
            whitelisted: false,
            risk_score,
            risk_level,
            findings,
            checker_diagnostics: outcomes.iter().map(|o| o.diagnostic()).collect(),
            target,
            timestamp,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        log::info!(
            "Scan of {} finished in {}ms: score {} ({:?})",
            verdict.target.normalized_url,
            verdict.duration_ms,
            verdict.risk_score,
            verdict.risk_level
        );
        Ok(verdict)
    }

    /// Spawn one task per applicable checker. The returned vector's order is
    /// the registration order the settle step preserves.
    fn spawn_checkers(
        &self,
        target: &UrlTarget,
        options: ScanOptions,
    ) -> Vec<(String, JoinHandle<anyhow::Result<CheckerResult>>)> {
        let mut tasks = Vec::new();
        let lookup_timeout = Duration::from_secs(self.config.checker_timeout_seconds);

        let hostname = target.hostname.clone();
        tasks.push((
            "dns".to_string(),
            tokio::spawn(async move { dns::check(hostname, lookup_timeout).await }),
        ));

        if options.include_threat_intel {
            let domain = target.effective_domain().to_string();
            let config = Arc::clone(&self.config);
            tasks.push((
                "reputation".to_string(),
                tokio::spawn(async move {
                    Ok(reputation::check_domain(Some(&domain), &config))
                }),
            ));

            let client = self.client.clone();
            let url = target.normalized_url.clone();
            let hostname = target.hostname.clone();
            let config = Arc::clone(&self.config);
            tasks.push((
                "threat_intel".to_string(),
                tokio::spawn(async move {
                    threat_intel::check(client, url, hostname, &config).await
                }),
            ));
        }

        if options.include_content {
            let client = self.client.clone();
            let url = target.normalized_url.clone();
            let config = Arc::clone(&self.config);
            tasks.push((
                "content".to_string(),
                tokio::spawn(async move { content::check(client, url, &config).await }),
            ));
        }

        if options.include_screenshot {
            let scheme = target.scheme.clone();
            tasks.push((
                "ssl".to_string(),
                tokio::spawn(async move { Ok(content::ssl_check(&scheme)) }),
            ));
        }

        tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> UrlScanner {
        UrlScanner::new(ScannerConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_whitelisted_host_short_circuits() {
        let verdict = scanner()
            .scan("https://google.com/search", ScanOptions::default())
            .await
            .unwrap();
        assert_eq!(verdict.risk_score, 0);
        assert_eq!(verdict.risk_level, RiskLevel::Safe);
        assert!(verdict.safe);
        assert!(verdict.whitelisted);
        assert!(verdict.findings.is_empty());
        // Only the lexical stage may appear in the diagnostics; nothing else
        // was allowed to start.
        assert_eq!(verdict.checker_diagnostics.len(), 1);
        assert_eq!(verdict.checker_diagnostics[0].name, "lexical");
    }

    #[tokio::test]
    async fn test_trusted_subdomain_short_circuits() {
        let verdict = scanner()
            .scan("https://mail.google.com", ScanOptions::default())
            .await
            .unwrap();
        assert!(verdict.whitelisted);
        assert!(verdict.safe);
    }

    #[tokio::test]
    async fn test_invalid_input_is_terminal() {
        let err = scanner()
            .scan("http://", ScanOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::InvalidInput(_)));
    }

    #[test]
    fn test_default_options() {
        let options = ScanOptions::default();
        assert!(!options.include_content);
        assert!(!options.include_screenshot);
        assert!(options.include_threat_intel);
    }
}
