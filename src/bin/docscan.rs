//! CLI binary for patient-doc-scanner.
//!
//! A thin shim over the library crate: the path argument stands in for the
//! file picker, and the rendered view is printed to stdout.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use patient_doc_scanner::{
    AnalysisError, AnalyzeOutcome, DocumentScanner, HttpAnalysisClient, Phase, ScanObserver,
    ScannerConfig, DEFAULT_ENDPOINT,
};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── Spinner observer using indicatif ─────────────────────────────────────────

/// Shows a spinner while a request is in flight.
struct CliObserver {
    bar: ProgressBar,
}

impl CliObserver {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        Arc::new(Self { bar })
    }
}

impl ScanObserver for CliObserver {
    fn on_file_selected(&self, file_name: &str, byte_len: usize) {
        self.bar.println(format!(
            "{} {}  {}",
            green("◆"),
            bold(file_name),
            dim(&format!("{byte_len} bytes"))
        ));
    }

    fn on_analysis_start(&self, _file_name: &str) {
        self.bar.set_prefix("Analyzing...");
        self.bar.set_message("waiting for the analysis service");
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_analysis_complete(&self, _file_name: &str, field_count: usize) {
        self.bar.finish_and_clear();
        eprintln!("{} {} fields received", green("✔"), bold(&field_count.to_string()));
    }

    fn on_analysis_failed(&self, _file_name: &str, error: &AnalysisError) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", red("✘"), dim(&error.to_string()));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Analyze a scanned intake form
  docscan intake_form.jpg

  # Analyze a PDF against a remote service
  docscan --endpoint http://scanner.local:5006/analyze discharge.pdf

  # Print the raw result object as JSON
  docscan --json lab_report.png > result.json

  # Check the analysis service is up
  docscan --health

ACCEPTED FILES:
  .jpg  .jpeg  .png  .pdf

ENVIRONMENT VARIABLES:
  DOCSCAN_ENDPOINT    Analysis endpoint (default: http://localhost:5006/analyze)
  DOCSCAN_TIMEOUT     Request timeout in seconds (default: none)
  RUST_LOG            Override log filter (e.g. patient_doc_scanner=debug)
"#;

/// Analyze a patient document with the remote analysis service.
#[derive(Parser, Debug)]
#[command(
    name = "docscan",
    version,
    about = "Upload a patient document image or PDF and print the extracted fields",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Document to analyze (.jpg, .jpeg, .png or .pdf).
    #[arg(required_unless_present = "health")]
    input: Option<PathBuf>,

    /// Analysis endpoint URL.
    #[arg(long, env = "DOCSCAN_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Request timeout in seconds. Unset means no timeout.
    #[arg(long, env = "DOCSCAN_TIMEOUT")]
    timeout: Option<u64>,

    /// Print the result object as JSON instead of the rendered view.
    #[arg(long, env = "DOCSCAN_JSON")]
    json: bool,

    /// Probe the service's health endpoint and exit.
    #[arg(long)]
    health: bool,

    /// Disable the spinner.
    #[arg(long, env = "DOCSCAN_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCSCAN_VERBOSE")]
    verbose: bool,

    /// Suppress all output except the result and errors.
    #[arg(short, long, env = "DOCSCAN_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;

    // ── Health probe ─────────────────────────────────────────────────────
    if cli.health {
        return health(&config, cli.json).await;
    }

    // ── Select + analyze ─────────────────────────────────────────────────
    let Some(ref input) = cli.input else {
        anyhow::bail!("no input document given");
    };

    let mut scanner = DocumentScanner::new(config).context("Failed to create scanner")?;
    if show_progress {
        scanner = scanner.with_observer(CliObserver::new());
    }

    scanner
        .select_path(input)
        .await
        .with_context(|| format!("Cannot select {}", input.display()))?;

    let outcome = scanner.analyze().await;

    if cli.json {
        let json = match scanner.result() {
            Some(result) => {
                serde_json::to_string_pretty(&result).context("Failed to serialise result")?
            }
            None => "null".to_string(),
        };
        println!("{json}");
    } else {
        print!("{}", scanner.render());
    }

    Ok(match outcome {
        AnalyzeOutcome::Completed(Phase::Success) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

/// Map CLI args to `ScannerConfig`.
fn build_config(cli: &Cli) -> Result<ScannerConfig> {
    let mut builder = ScannerConfig::builder().endpoint(cli.endpoint.clone());
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    builder.build().context("Invalid configuration")
}

async fn health(config: &ScannerConfig, json: bool) -> Result<ExitCode> {
    let client = HttpAnalysisClient::new(config).context("Failed to create HTTP client")?;
    let status = match client.health().await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{} {} unreachable: {}", red("✘"), config.health_url(), e);
            return Ok(ExitCode::FAILURE);
        }
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&status).context("Failed to serialise health")?
        );
    } else {
        let mark = if status.is_healthy() { green("✔") } else { red("✘") };
        println!("{mark} {}  {}", bold(&status.status), dim(&config.health_url()));
        for (key, value) in &status.details {
            println!("  {:<28} {}", key.replace('_', " "), value);
        }
    }

    Ok(if status.is_healthy() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
