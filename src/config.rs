use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Immutable scanner configuration.
///
/// Loaded once at startup and injected into the scanner; never mutated at
/// runtime, so every checker stays referentially transparent. All heuristic
/// thresholds and word lists live here rather than in control flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Exact hostnames that short-circuit the whole scan as safe.
    #[serde(default = "default_whitelist")]
    pub whitelist: Vec<String>,
    /// Subdomains trusted when the registrable domain is whitelisted.
    #[serde(default = "default_trusted_subdomains")]
    pub trusted_subdomains: Vec<String>,
    #[serde(default = "default_suspicious_tlds")]
    pub suspicious_tlds: Vec<String>,
    /// Ordered brand list; only the first matching brand is reported.
    #[serde(default = "default_brands")]
    pub brands: Vec<BrandEntry>,
    #[serde(default = "default_suspicious_path_keywords")]
    pub suspicious_path_keywords: Vec<String>,
    #[serde(default = "default_suspicious_subdomain_keywords")]
    pub suspicious_subdomain_keywords: Vec<String>,
    #[serde(default = "default_suspicious_domain_keywords")]
    pub suspicious_domain_keywords: Vec<String>,
    #[serde(default = "default_url_shorteners")]
    pub url_shorteners: Vec<String>,
    #[serde(default = "default_disposable_email_domains")]
    pub disposable_email_domains: Vec<String>,
    #[serde(default = "default_suspicious_email_tlds")]
    pub suspicious_email_tlds: Vec<String>,
    #[serde(default = "default_suspicious_title_keywords")]
    pub suspicious_title_keywords: Vec<String>,
    /// Per-checker timeout in seconds.
    #[serde(default = "default_checker_timeout_seconds")]
    pub checker_timeout_seconds: u64,
    /// Timeout for individual vendor HTTP calls.
    #[serde(default = "default_vendor_timeout_seconds")]
    pub vendor_timeout_seconds: u64,
    #[serde(default)]
    pub vendor_keys: VendorKeys,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandEntry {
    /// Token looked for anywhere in the hostname.
    pub token: String,
    /// The brand's canonical domain; hostnames ending with it are legitimate.
    pub canonical_domain: String,
}

/// Optional vendor API credentials. A missing key disables that vendor
/// entirely; it contributes no signal and no failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VendorKeys {
    #[serde(default)]
    pub google_safe_browsing: Option<String>,
    #[serde(default)]
    pub virustotal: Option<String>,
    #[serde(default)]
    pub urlvoid: Option<String>,
    #[serde(default)]
    pub rapidapi: Option<String>,
}

impl ScannerConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ScannerConfig = serde_yaml::from_str(&content)?;
        log::info!(
            "Loaded scanner config from {} ({} whitelisted hosts, {} brands)",
            path.display(),
            config.whitelist.len(),
            config.brands.len()
        );
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            whitelist: default_whitelist(),
            trusted_subdomains: default_trusted_subdomains(),
            suspicious_tlds: default_suspicious_tlds(),
            brands: default_brands(),
            suspicious_path_keywords: default_suspicious_path_keywords(),
            suspicious_subdomain_keywords: default_suspicious_subdomain_keywords(),
            suspicious_domain_keywords: default_suspicious_domain_keywords(),
            url_shorteners: default_url_shorteners(),
            disposable_email_domains: default_disposable_email_domains(),
            suspicious_email_tlds: default_suspicious_email_tlds(),
            suspicious_title_keywords: default_suspicious_title_keywords(),
            checker_timeout_seconds: default_checker_timeout_seconds(),
            vendor_timeout_seconds: default_vendor_timeout_seconds(),
            vendor_keys: VendorKeys::default(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_whitelist() -> Vec<String> {
    strings(&[
        "google.com",
        "gmail.com",
        "drive.google.com",
        "facebook.com",
        "instagram.com",
        "twitter.com",
        "amazon.com",
        "netflix.com",
        "spotify.com",
        "apple.com",
        "microsoft.com",
        "github.com",
        "wikipedia.org",
        "yahoo.com",
        "bing.com",
        "paypal.com",
        "zoom.us",
        "slack.com",
    ])
}

fn default_trusted_subdomains() -> Vec<String> {
    strings(&["www", "mail", "docs", "drive", "maps", "translate"])
}

fn default_suspicious_tlds() -> Vec<String> {
    strings(&[
        "zip", "mov", "country", "gq", "ml", "cf", "tk", "ga", "xyz", "top", "club", "online",
        "site", "click", "link", "bid", "loan", "work", "tech", "app", "dev", "io", "co", "me",
        "tv", "cc", "ws", "info", "biz",
    ])
}

fn default_brands() -> Vec<BrandEntry> {
    let entries = [
        ("allegro", "allegro.pl"),
        ("paypal", "paypal.com"),
        ("google", "google.com"),
        ("apple", "apple.com"),
        ("amazon", "amazon.com"),
        ("facebook", "facebook.com"),
        ("microsoft", "microsoft.com"),
        ("netflix", "netflix.com"),
        ("spotify", "spotify.com"),
        ("instagram", "instagram.com"),
        ("twitter", "twitter.com"),
        ("linkedin", "linkedin.com"),
        ("ebay", "ebay.com"),
        ("walmart", "walmart.com"),
        ("target", "target.com"),
        ("chase", "chase.com"),
        ("wellsfargo", "wellsfargo.com"),
        ("bankofamerica", "bankofamerica.com"),
        ("citibank", "citibank.com"),
        ("usbank", "usbank.com"),
        ("pnc", "pnc.com"),
        ("tdbank", "tdbank.com"),
        ("capitalone", "capitalone.com"),
        ("americanexpress", "americanexpress.com"),
    ];
    entries
        .iter()
        .map(|(token, domain)| BrandEntry {
            token: token.to_string(),
            canonical_domain: domain.to_string(),
        })
        .collect()
}

fn default_suspicious_path_keywords() -> Vec<String> {
    strings(&[
        "login", "verify", "update", "bank", "wallet", "free", "gift", "bonus", "secure",
        "account", "password", "credit", "debit", "social", "security",
    ])
}

fn default_suspicious_subdomain_keywords() -> Vec<String> {
    strings(&["login", "secure", "verify", "update", "account", "bank"])
}

fn default_suspicious_domain_keywords() -> Vec<String> {
    strings(&[
        "bank", "secure", "login", "verify", "update", "account", "password", "credit", "debit",
        "social", "security", "irs", "paypal", "wallet", "free", "gift", "bonus", "claim",
        "reward", "prize", "winner", "urgent", "limited", "offer", "discount", "sale", "deal",
        "save", "money", "cash", "payment", "billing", "invoice", "refund", "support", "help",
        "customer", "service",
    ])
}

fn default_url_shorteners() -> Vec<String> {
    strings(&[
        "bit.ly",
        "tinyurl.com",
        "goo.gl",
        "t.co",
        "is.gd",
        "v.gd",
        "shorturl.at",
        "rb.gy",
        "cutt.ly",
        "short.io",
    ])
}

fn default_disposable_email_domains() -> Vec<String> {
    strings(&[
        "10minutemail.com",
        "guerrillamail.com",
        "mailinator.com",
        "tempmail.org",
        "throwaway.email",
        "yopmail.com",
        "getnada.com",
        "mailnesia.com",
        "temp-mail.org",
        "sharklasers.com",
        "guerrillamailblock.com",
        "pokemail.net",
        "spam4.me",
        "bccto.me",
        "chacuo.net",
        "dispostable.com",
        "fakeinbox.com",
        "maildrop.cc",
        "mintemail.com",
        "mytrashmail.com",
        "nwldx.com",
        "spamspot.com",
        "tempr.email",
        "trashmail.com",
    ])
}

fn default_suspicious_email_tlds() -> Vec<String> {
    strings(&[
        "xyz", "top", "site", "online", "web", "net", "info", "buzz", "click", "icu", "tk", "ml",
        "cf", "ga", "gq", "co", "cc", "ws", "me",
    ])
}

fn default_suspicious_title_keywords() -> Vec<String> {
    strings(&[
        "login",
        "sign in",
        "verify",
        "update",
        "secure",
        "bank",
        "account",
        "password",
        "credit",
        "debit",
        "social security",
        "irs",
        "paypal",
    ])
}

fn default_checker_timeout_seconds() -> u64 {
    10
}

fn default_vendor_timeout_seconds() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_lists() {
        let config = ScannerConfig::default();
        assert!(config.whitelist.contains(&"google.com".to_string()));
        assert!(config.suspicious_tlds.contains(&"tk".to_string()));
        assert!(config
            .disposable_email_domains
            .contains(&"mailinator.com".to_string()));
        assert_eq!(config.checker_timeout_seconds, 10);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: ScannerConfig = serde_yaml::from_str("checker_timeout_seconds: 5\n").unwrap();
        assert_eq!(config.checker_timeout_seconds, 5);
        assert!(!config.brands.is_empty());
        assert!(config.vendor_keys.virustotal.is_none());
    }

    #[test]
    fn test_config_round_trip() {
        let config = ScannerConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let reloaded: ScannerConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(reloaded.whitelist, config.whitelist);
        assert_eq!(reloaded.brands.len(), config.brands.len());
    }

    #[test]
    fn test_brand_order_is_stable() {
        // First-match-wins lookalike detection depends on this ordering.
        let config = ScannerConfig::default();
        assert_eq!(config.brands[0].token, "allegro");
        assert_eq!(config.brands[1].token, "paypal");
    }
}
