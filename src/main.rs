use clap::{Arg, Command};
use log::LevelFilter;
use phishguard::breach::EmailChecker;
use phishguard::config::ScannerConfig;
use phishguard::error::ScanError;
use phishguard::scanner::{ScanOptions, UrlScanner};
use std::path::Path;
use std::process;

#[tokio::main]
async fn main() {
    let matches = Command::new("phishguard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("URL and email risk scanner combining lexical, DNS, reputation and threat-intel signals")
        .arg(
            Arg::new("url")
                .short('u')
                .long("url")
                .value_name("URL")
                .help("Scan a URL and print the verdict as JSON")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("email")
                .short('e')
                .long("email")
                .value_name("ADDRESS")
                .help("Check an email address for breaches and print the verdict as JSON")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("batch-emails")
                .long("batch-emails")
                .value_name("ADDRESSES")
                .help("Check a comma-separated list of email addresses")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Scanner configuration file path (YAML)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Write the default configuration to FILE and exit")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("include-content")
                .long("include-content")
                .help("Fetch and analyze the page content")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("include-screenshot")
                .long("include-screenshot")
                .help("Run the SSL-only screenshot analysis stage")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-threat-intel")
                .long("no-threat-intel")
                .help("Skip reputation and third-party threat intelligence lookups")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(path) = matches.get_one::<String>("generate-config") {
        let config = ScannerConfig::default();
        if let Err(e) = config.save(Path::new(path)) {
            eprintln!("Failed to write config to {path}: {e}");
            process::exit(1);
        }
        println!("Default configuration written to {path}");
        return;
    }

    let config = match matches.get_one::<String>("config") {
        Some(path) => match ScannerConfig::load(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config from {path}: {e}");
                process::exit(1);
            }
        },
        None => ScannerConfig::default(),
    };

    if let Some(url) = matches.get_one::<String>("url") {
        let options = ScanOptions {
            include_content: matches.get_flag("include-content"),
            include_screenshot: matches.get_flag("include-screenshot"),
            include_threat_intel: !matches.get_flag("no-threat-intel"),
        };
        let scanner = match UrlScanner::new(config) {
            Ok(scanner) => scanner,
            Err(e) => {
                eprintln!("Failed to initialize scanner: {e}");
                process::exit(1);
            }
        };
        match scanner.scan(url, options).await {
            Ok(verdict) => print_json(&verdict),
            Err(e @ ScanError::InvalidInput(_)) => {
                eprintln!("{e}");
                process::exit(2);
            }
        }
        return;
    }

    if let Some(email) = matches.get_one::<String>("email") {
        let checker = match EmailChecker::new(config) {
            Ok(checker) => checker,
            Err(e) => {
                eprintln!("Failed to initialize email checker: {e}");
                process::exit(1);
            }
        };
        match checker.check_email(email).await {
            Ok(verdict) => print_json(&verdict),
            Err(e @ ScanError::InvalidInput(_)) => {
                eprintln!("{e}");
                process::exit(2);
            }
        }
        return;
    }

    if let Some(list) = matches.get_one::<String>("batch-emails") {
        let emails: Vec<String> = list
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if emails.is_empty() {
            eprintln!("No email addresses given");
            process::exit(2);
        }
        let checker = match EmailChecker::new(config) {
            Ok(checker) => checker,
            Err(e) => {
                eprintln!("Failed to initialize email checker: {e}");
                process::exit(1);
            }
        };
        let report = checker.batch_check(&emails).await;
        print_json(&report);
        return;
    }

    eprintln!("Nothing to do: pass --url, --email or --batch-emails (see --help)");
    process::exit(2);
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Failed to serialize result: {e}");
            process::exit(1);
        }
    }
}
