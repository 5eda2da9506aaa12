pub mod breach;
pub mod config;
pub mod content;
pub mod dispatch;
pub mod dns;
pub mod error;
pub mod findings;
pub mod lexical;
pub mod reputation;
pub mod scanner;
pub mod scoring;
pub mod target;
pub mod threat_intel;
pub mod verdict;

pub use breach::EmailChecker;
pub use config::ScannerConfig;
pub use error::ScanError;
pub use findings::{Finding, FindingKind, Severity};
pub use scanner::{ScanOptions, UrlScanner};
pub use scoring::RiskLevel;
pub use verdict::{BatchEmailReport, EmailVerdict, Verdict};
