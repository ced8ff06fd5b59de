use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use bitfit_core::config::{HashMode, RunConfig, DEFAULT_MANIFEST_PATTERN, MAX_CHUNK};
use bitfit_core::discover::discover_manifest;
use bitfit_core::reconcile::Entry;
use bitfit_core::scan::{scan, ScanProblem};
use bitfit_core::verify::{verify, VerifyReport};
use bitfit_core::{manifest_codec, report};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit status for a completed run that found drift or unreadable files.
const EXIT_FAILED: u8 = 1;
/// Exit status for configuration and manifest errors.
const EXIT_FATAL: u8 = 2;

#[derive(Parser)]
#[command(
    name = "bitfit",
    version,
    about = "Recursively hash a directory tree, or validate it against a VERSION file",
    after_help = "In verification mode, + indicates a file not present in the VERSION file, -\n\
                  indicates a missing file in the directory tree, and ! indicates content\n\
                  mismatch."
)]
struct Cli {
    /// Search for a VERSION verification file and validate hashes
    #[arg(short = 'v', long)]
    verify: bool,
    /// Reduce memory consumption for hashing on low memory systems
    #[arg(short = 'l', long, conflicts_with = "chunk_size")]
    low_memory: bool,
    /// Hash in blocks of this many bytes instead of whole files (at most 1 GiB)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=MAX_CHUNK as u64))]
    chunk_size: Option<u64>,
    /// Descend into symlinked directories
    #[arg(long, default_value_t = false)]
    follow_symlinks: bool,
    /// Use this manifest instead of searching the starting directory
    #[arg(long, requires = "verify")]
    manifest: Option<PathBuf>,
    /// Name pattern of manifest files
    #[arg(long, default_value = DEFAULT_MANIFEST_PATTERN)]
    pattern: String,
    /// Print the verification report as JSON
    #[arg(long, requires = "verify")]
    json: bool,
    /// Debug logging to stderr
    #[arg(long, default_value_t = false)]
    debug: bool,
    /// Starting directory
    dir: PathBuf,
}

impl Cli {
    fn run_config(&self) -> RunConfig {
        let hash_mode = match self
            .chunk_size
            .and_then(|n| usize::try_from(n).ok())
            .and_then(NonZeroUsize::new) {
            Some(n) => HashMode::Chunked(n),
            None if self.low_memory => HashMode::low_memory(),
            None => HashMode::WholeFile,
        };
        RunConfig {
            hash_mode,
            follow_symlinks: self.follow_symlinks,
            manifest_pattern: self.pattern.clone(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);
    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_env("BITFIT_LOG")
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "error" }));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let cfg = cli.run_config();
    tracing::debug!(?cfg, dir = %cli.dir.display(), "starting");
    if cli.verify {
        verify_mode(cli, &cfg)
    } else {
        calculate_mode(&cli.dir, &cfg)
    }
}

fn calculate_mode(root: &Path, cfg: &RunConfig) -> Result<ExitCode> {
    let scan = scan(root, cfg).context("scan starting directory")?;
    let header = vec![
        format!(
            "bitfit {VERSION} output generated on {} by {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f"),
            current_user()
        ),
        format!("bitfit {}", root.display()),
    ];
    manifest_codec::encode(&scan.manifest, &header, io::stdout().lock())
        .context("write manifest")?;
    report_problems(&scan.problems);
    Ok(if scan.is_clean() { ExitCode::SUCCESS } else { ExitCode::from(EXIT_FAILED) })
}

fn verify_mode(cli: &Cli, cfg: &RunConfig) -> Result<ExitCode> {
    let manifest = match &cli.manifest {
        Some(p) => p.clone(),
        None => discover_manifest(&cli.dir, cfg)?,
    };
    tracing::debug!(manifest = %manifest.display(), "verifying");
    let report = verify(&manifest, &cli.dir, cfg)?;
    report_problems(&report.problems);

    let mut out = io::stdout().lock();
    if cli.json {
        serde_json::to_writer_pretty(&mut out, &JsonReport::from(&report))?;
        writeln!(out)?;
    } else {
        report::write_discrepancies(&report.reconciliation, &mut out)?;
        writeln!(out, "{}", report::verdict_line(report.is_clean()))?;
    }
    out.flush()?;
    Ok(if report.is_clean() { ExitCode::SUCCESS } else { ExitCode::from(EXIT_FAILED) })
}

fn report_problems(problems: &[ScanProblem]) {
    for p in problems {
        eprintln!("{p}");
    }
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    clean: bool,
    discrepancies: Vec<&'a Entry>,
    problems: Vec<String>,
}

impl<'a> From<&'a VerifyReport> for JsonReport<'a> {
    fn from(r: &'a VerifyReport) -> Self {
        Self {
            clean: r.is_clean(),
            discrepancies: r.reconciliation.discrepancies().collect(),
            problems: r.problems.iter().map(|p| p.to_string()).collect(),
        }
    }
}
