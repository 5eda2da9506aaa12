use crate::error::ScanError;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use url::Url;

lazy_static! {
    static ref IPV4_RE: Regex = Regex::new(r"^\d+\.\d+\.\d+\.\d+$").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

// Common two-label public suffixes; enough for registrable-domain extraction
// without pulling in a full public suffix list.
const TWO_LABEL_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "gov.uk", "ac.uk", "com.au", "net.au", "org.au", "co.jp", "co.nz",
    "com.br", "co.in", "co.za", "com.mx", "com.cn",
];

/// Normalized identity of a URL under evaluation. Constructed once, read-only
/// thereafter; every checker receives it by shared reference or clone.
#[derive(Debug, Clone, Serialize)]
pub struct UrlTarget {
    pub raw_input: String,
    pub normalized_url: String,
    pub scheme: String,
    pub hostname: String,
    pub path: String,
    pub registrable_domain: Option<String>,
    pub subdomain: Option<String>,
    pub is_ip_literal: bool,
}

impl UrlTarget {
    /// Parse and normalize raw input. Scheme-less input defaults to https.
    pub fn parse(raw: &str) -> Result<Self, ScanError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ScanError::InvalidInput("empty URL".to_string()));
        }

        let with_scheme = if trimmed.to_lowercase().starts_with("http://")
            || trimmed.to_lowercase().starts_with("https://")
        {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };

        let parsed = Url::parse(&with_scheme)
            .map_err(|e| ScanError::InvalidInput(format!("{raw}: {e}")))?;

        let hostname = parsed
            .host_str()
            .ok_or_else(|| ScanError::InvalidInput(format!("{raw}: no hostname")))?
            .to_lowercase();

        let is_ip_literal = IPV4_RE.is_match(&hostname);
        let registrable_domain = if is_ip_literal {
            None
        } else {
            registrable_domain(&hostname)
        };
        let subdomain = registrable_domain.as_deref().and_then(|domain| {
            hostname
                .strip_suffix(domain)
                .and_then(|prefix| prefix.strip_suffix('.'))
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
        });

        Ok(UrlTarget {
            raw_input: raw.to_string(),
            normalized_url: parsed.to_string(),
            scheme: parsed.scheme().to_string(),
            hostname,
            path: parsed.path().to_lowercase(),
            registrable_domain,
            subdomain,
            is_ip_literal,
        })
    }

    /// The public suffix of the registrable domain ("tk" for "evil.tk",
    /// "co.uk" for "evil.co.uk"). None for IP literals and bare labels.
    pub fn public_suffix(&self) -> Option<&str> {
        self.registrable_domain
            .as_deref()
            .and_then(|d| d.split_once('.'))
            .map(|(_, suffix)| suffix)
    }

    /// Best domain identity for reputation lookups: the registrable domain
    /// when available, otherwise the hostname itself.
    pub fn effective_domain(&self) -> &str {
        self.registrable_domain.as_deref().unwrap_or(&self.hostname)
    }
}

/// Normalized identity of an email address under evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct EmailTarget {
    pub raw_input: String,
    pub local_part: String,
    pub domain: String,
}

impl EmailTarget {
    pub fn parse(raw: &str) -> Result<Self, ScanError> {
        let trimmed = raw.trim();
        if !EMAIL_RE.is_match(trimmed) {
            return Err(ScanError::InvalidInput(format!(
                "{raw}: not a valid email address"
            )));
        }
        // The format regex guarantees exactly the shape local@domain here.
        let (local_part, domain) = trimmed
            .rsplit_once('@')
            .ok_or_else(|| ScanError::InvalidInput(format!("{raw}: missing @")))?;

        Ok(EmailTarget {
            raw_input: raw.to_string(),
            local_part: local_part.to_lowercase(),
            domain: domain.to_lowercase(),
        })
    }
}

/// Extract the registrable domain from a hostname: the last two labels, or
/// three when the suffix is a known two-label public suffix.
fn registrable_domain(hostname: &str) -> Option<String> {
    let labels: Vec<&str> = hostname.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() < 2 {
        return None;
    }

    let take = if TWO_LABEL_SUFFIXES
        .iter()
        .any(|suffix| hostname.ends_with(&format!(".{suffix}")) || hostname == *suffix)
    {
        3
    } else {
        2
    };

    if labels.len() < take {
        return None;
    }
    Some(labels[labels.len() - take..].join("."))
}
