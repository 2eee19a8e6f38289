//! Sentinel - recruitment vetting risk engine CLI
//!
//! The `sentinel` command runs one risk analysis against a JSON dataset.
//!
//! ## Commands
//!
//! - `analyze`: Fuse all detectors for one subject and print the report
//! - `weights`: Show and validate the effective fusion weights

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};

use sentinel_core::metrics::METRICS;
use sentinel_core::reporting::summary_line;
use sentinel_core::{
    render_report_md, write_report_artifact, AnalysisReport, SentinelConfig, SentinelEngine,
    SentinelError,
};
use sentinel_data::{Dataset, IdentityId, MemoryDataSource};

#[derive(Parser)]
#[command(name = "sentinel")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Multi-signal risk assessment for recruitment vetting", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one subject from a dataset fixture
    Analyze {
        /// Dataset file (JSON: identities, histories, groups)
        #[arg(short, long, env = "SENTINEL_DATASET")]
        dataset: PathBuf,

        /// Subject identity id
        #[arg(short, long)]
        subject: IdentityId,

        /// Reference time for recency checks (RFC 3339, default: now)
        #[arg(long)]
        now: Option<DateTime<Utc>>,

        /// Engine configuration (TOML)
        #[arg(short, long, env = "SENTINEL_CONFIG")]
        config: Option<PathBuf>,

        /// Report format printed to stdout
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Also write the digest-verified report artifact under this directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Print the effective fusion weights
    Weights {
        /// Engine configuration (TOML)
        #[arg(short, long, env = "SENTINEL_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    sentinel_core::telemetry::init_tracing(cli.json, level);

    let result = match cli.command {
        Commands::Analyze {
            dataset,
            subject,
            now,
            config,
            format,
            output_dir,
        } => {
            let now = now.unwrap_or_else(Utc::now);
            cmd_analyze(
                &dataset,
                subject,
                now,
                config.as_deref(),
                format,
                output_dir.as_deref(),
            )
            .await
            .map(|rendered| println!("{rendered}"))
        }
        Commands::Weights { config } => {
            cmd_weights(config.as_deref()).map(|table| print!("{table}"))
        }
    };

    METRICS.flush();
    result
}

/// Load configuration from `path`, or defaults when absent.
fn load_config(path: Option<&Path>) -> Result<SentinelConfig> {
    match path {
        Some(path) => SentinelConfig::load(path)
            .with_context(|| format!("Failed to load config: {:?}", path)),
        None => Ok(SentinelConfig::default()),
    }
}

/// Run one analysis and return the rendered report.
async fn cmd_analyze(
    dataset_path: &Path,
    subject: IdentityId,
    now: DateTime<Utc>,
    config_path: Option<&Path>,
    format: OutputFormat,
    output_dir: Option<&Path>,
) -> Result<String> {
    let config = load_config(config_path)?;
    let dataset = Dataset::load(dataset_path)
        .with_context(|| format!("Failed to load dataset: {:?}", dataset_path))?;
    let source = Arc::new(MemoryDataSource::from_dataset(dataset));
    let engine = SentinelEngine::new(source, config).context("Invalid engine configuration")?;

    let report = match engine.analyze(subject, now).await {
        Ok(report) => report,
        Err(SentinelError::SubjectNotFound(id)) => {
            anyhow::bail!("Subject {} not found in dataset {:?}", id, dataset_path)
        }
        Err(e) => return Err(e).with_context(|| format!("Analysis of subject {} failed", subject)),
    };
    info!("{}", summary_line(&report));

    if let Some(dir) = output_dir {
        let path = write_report_artifact(&report, dir)
            .with_context(|| format!("Failed to write report artifact under {:?}", dir))?;
        info!(path = %path.display(), "report artifact written");
    }

    render(&report, format)
}

fn render(report: &AnalysisReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Markdown => Ok(render_report_md(report)),
    }
}

/// Validate and tabulate the fusion weights.
fn cmd_weights(config_path: Option<&Path>) -> Result<String> {
    let config = load_config(config_path)?;
    config.validate().context("Fusion weights are invalid")?;

    let mut table = String::from("Fusion weights\n");
    for (name, weight) in config.weights.as_array() {
        table.push_str(&format!("  {:<10} {:.2}\n", name, weight));
    }
    table.push_str(&format!("  {:<10} {:.2}\n", "total", config.weights.sum()));
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clap::CommandFactory;
    use sentinel_core::read_report_artifact;

    const KESTREL: IdentityId = 90_000_001;

    fn fixture() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/sample_dataset.json")
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_analyze_args_parse() {
        let cli = Cli::try_parse_from([
            "sentinel",
            "analyze",
            "--dataset",
            "data.json",
            "--subject",
            "42",
            "--now",
            "2025-06-01T00:00:00Z",
            "--format",
            "markdown",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze {
                subject,
                now: parsed,
                format,
                ..
            } => {
                assert_eq!(subject, 42);
                assert_eq!(parsed, Some(now()));
                assert_eq!(format, OutputFormat::Markdown);
            }
            Commands::Weights { .. } => panic!("expected analyze"),
        }
    }

    #[tokio::test]
    async fn test_analyze_fixture_writes_verified_artifact() {
        let out = tempfile::tempdir().unwrap();
        let rendered = cmd_analyze(
            &fixture(),
            KESTREL,
            now(),
            None,
            OutputFormat::Json,
            Some(out.path()),
        )
        .await
        .unwrap();

        let printed: AnalysisReport = serde_json::from_str(&rendered).unwrap();
        let stored = read_report_artifact(KESTREL, out.path()).unwrap();
        assert_eq!(printed, stored);
        assert_eq!(stored.subject_name, "Kestrel Vane");
        assert!(!stored.definite_flags.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_markdown_output() {
        let rendered = cmd_analyze(&fixture(), KESTREL, now(), None, OutputFormat::Markdown, None)
            .await
            .unwrap();
        assert!(rendered.starts_with("# Risk Report: Kestrel Vane (90000001)"));
    }

    #[tokio::test]
    async fn test_unknown_subject_is_reported_clearly() {
        let err = cmd_analyze(&fixture(), 7, now(), None, OutputFormat::Json, None)
            .await
            .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("Subject 7 not found"), "unexpected error: {msg}");
    }

    #[tokio::test]
    async fn test_missing_dataset_has_context() {
        let err = cmd_analyze(
            Path::new("/nonexistent/dataset.json"),
            KESTREL,
            now(),
            None,
            OutputFormat::Json,
            None,
        )
        .await
        .unwrap_err();
        assert!(format!("{err:#}").contains("Failed to load dataset"));
    }

    #[test]
    fn test_weights_default_table() {
        let table = cmd_weights(None).unwrap();
        assert!(table.contains("history    0.30"));
        assert!(table.contains("contract   0.10"));
        assert!(table.contains("total      1.00"));
    }

    #[test]
    fn test_weights_rejects_unnormalized_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sentinel.toml");
        std::fs::write(&path, "[weights]\nhistory = 0.9\n").unwrap();

        let err = cmd_weights(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("Fusion weights are invalid"));
    }
}
