//! markup-audit CLI
//!
//! Audits a live page (loaded in headless Chrome) or a saved snapshot and
//! prints the report as JSON. Exit status: 0 when clean, 1 when there are
//! findings, 2 when a check could not run.

use anyhow::{Context, bail};
use clap::Parser;
use markup_audit::audit::{CheckRegistry, run_all};
use markup_audit::{AuditConfig, AuditReport, BrowserSession, DomTree, LaunchOptions, SnapshotDocument};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "markup-audit", version, about = "Audit headings, links and images of a web page")]
struct Cli {
    /// Page to load and audit
    #[arg(required_unless_present_any = ["snapshot", "list_checks"], conflicts_with = "snapshot")]
    url: Option<String>,

    /// Audit a snapshot file instead of a live page
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Save the captured page to FILE before auditing
    #[arg(long, value_name = "FILE", conflicts_with = "snapshot")]
    save_snapshot: Option<PathBuf>,

    /// JSON audit config
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// The site's own host name (links mentioning it are internal)
    #[arg(long)]
    host: Option<String>,

    /// Run only this check (repeatable)
    #[arg(long = "check", value_name = "NAME")]
    checks: Vec<String>,

    /// Required meta description length, e.g. 120-160
    #[arg(long, value_name = "MIN-MAX", value_parser = parse_bounds)]
    meta_length: Option<(usize, usize)>,

    /// Page evaluation timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout: Option<u64>,

    /// Launch browser in headed mode
    #[arg(long)]
    headed: bool,

    /// Chrome binary to launch
    #[arg(long, value_name = "PATH")]
    chrome: Option<PathBuf>,

    #[arg(long)]
    no_sandbox: bool,

    /// List available checks and exit
    #[arg(long)]
    list_checks: bool,
}

fn parse_bounds(value: &str) -> Result<(usize, usize), String> {
    let (min, max) = value
        .split_once('-')
        .ok_or_else(|| format!("expected MIN-MAX, got '{}'", value))?;
    let min = min.trim().parse::<usize>().map_err(|e| e.to_string())?;
    let max = max.trim().parse::<usize>().map_err(|e| e.to_string())?;
    if min > max {
        return Err(format!("minimum {} exceeds maximum {}", min, max));
    }
    Ok((min, max))
}

impl Cli {
    fn audit_config(&self) -> anyhow::Result<AuditConfig> {
        let mut config = match &self.config {
            Some(path) => AuditConfig::load(path).with_context(|| format!("reading config {}", path.display()))?,
            None => AuditConfig::default(),
        };

        if let Some(host) = &self.host {
            config = config.site_host(host.clone());
        }
        if !self.checks.is_empty() {
            config = config.only(self.checks.iter().cloned());
        }
        if let Some((min, max)) = self.meta_length {
            config = config.meta_description_length(min, max);
        }
        if let Some(timeout) = self.timeout {
            config = config.evaluation_timeout(timeout);
        }
        Ok(config)
    }
}

fn audit_live(cli: &Cli, url: &str, config: &AuditConfig) -> anyhow::Result<AuditReport> {
    let mut options = LaunchOptions::new().headless(!cli.headed).sandbox(!cli.no_sandbox);
    if let Some(path) = &cli.chrome {
        options = options.chrome_path(path.clone());
    }

    let session = BrowserSession::launch(options)?;
    session.navigate(url)?;
    let loaded = session.current_url()?;

    let report = match &cli.save_snapshot {
        Some(path) => {
            let tree = session.snapshot()?;
            tree.save(path)
                .with_context(|| format!("writing snapshot {}", path.display()))?;
            log::info!("Saved snapshot to {}", path.display());
            run_all(&SnapshotDocument::new(&tree), config)
        }
        None => run_all(&session.document(config.timeout())?, config),
    };

    session.close()?;
    Ok(report.with_url(loaded))
}

fn audit_snapshot(path: &Path, config: &AuditConfig) -> anyhow::Result<AuditReport> {
    let tree = DomTree::load(path).with_context(|| format!("reading snapshot {}", path.display()))?;
    let report = run_all(&SnapshotDocument::new(&tree), config);
    Ok(match tree.url {
        Some(url) => report.with_url(url),
        None => report,
    })
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.list_checks {
        let registry = CheckRegistry::with_defaults();
        for name in registry.names() {
            if let Some(check) = registry.get(name) {
                println!("{:<24} {}", name, check.description());
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = cli.audit_config()?;
    let registry = CheckRegistry::with_defaults();
    if let Some(unknown) = config.checks.iter().find(|name| registry.get(name).is_none()) {
        bail!("unknown check '{}' (see --list-checks)", unknown);
    }

    let report = match (&cli.snapshot, &cli.url) {
        (Some(path), _) => audit_snapshot(path, &config)?,
        (None, Some(url)) => audit_live(&cli, url, &config)?,
        (None, None) => bail!("either a URL or --snapshot is required"),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(if report.error_count() > 0 {
        ExitCode::from(2)
    } else if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
