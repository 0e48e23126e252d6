use crate::gateway::{AnalysisBackend, RequestGateway};
use crate::lifecycle::{LifecycleState, QueryLifecycle};
use crate::model::RunConfig;
use crate::presenter::ResultPresenter;
use crate::scenarios::Scenario;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();

        // Lock per line: tracing writes to stderr from other threads while this one waits.
        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(stdout.lock(), "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(stderr.lock(), "{}", msg);
                }
            }
        }

        let _ = stdout.lock().flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "objection",
    version,
    about = "Know your rights: legal situation analysis in the terminal"
)]
pub struct Cli {
    /// Base URL of the analysis backend
    #[arg(long, env = "OBJECTION_BASE_URL", default_value = "http://localhost:8000")]
    pub base_url: String,

    /// How long to wait for an analysis before giving up
    #[arg(long, env = "OBJECTION_TIMEOUT", default_value = "120s")]
    pub timeout: humantime::Duration,

    /// City and state the situation happened in
    #[arg(long, env = "OBJECTION_LOCATION", default_value = "Boston, MA")]
    pub location: String,

    /// Describe your situation
    #[arg(long, conflicts_with = "scenario")]
    pub query: Option<String>,

    /// Use one of the built-in demo scenarios as the query
    #[arg(long, value_enum)]
    pub scenario: Option<Scenario>,

    /// Print the raw result as JSON and exit (no TUI)
    #[arg(long, conflicts_with = "text")]
    pub json: bool,

    /// Print a text summary and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Write the generated document into this directory after a successful analysis
    #[arg(long, value_name = "DIR")]
    pub export_document: Option<PathBuf>,

    /// Log file used while the TUI is running
    #[arg(long, env = "OBJECTION_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Query text from `--scenario` or `--query`, in that order.
    fn query_text(&self) -> String {
        match (self.scenario, self.query.as_deref()) {
            (Some(s), _) => s.query().to_string(),
            (None, Some(q)) => q.to_string(),
            (None, None) => String::new(),
        }
    }
}

pub async fn run(args: Cli) -> Result<()> {
    #[cfg(feature = "tui")]
    {
        if !args.json && !args.text {
            let log_path = match args.log_file.clone() {
                Some(p) => p,
                None => crate::storage::default_log_path()?,
            };
            crate::logging::init_file(&log_path)?;
            return crate::tui::run(args).await;
        }
    }

    // Without the TUI feature every run is one-shot text or JSON.
    crate::logging::init_stderr()?;
    run_once(args).await
}

/// Build a `RunConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> Result<RunConfig> {
    let parsed = url::Url::parse(&args.base_url)
        .with_context(|| format!("invalid --base-url {:?}", args.base_url))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("--base-url must use http or https, got {:?}", parsed.scheme());
    }
    let timeout = Duration::from(args.timeout);
    if timeout.is_zero() {
        anyhow::bail!("--timeout must be greater than zero");
    }
    Ok(RunConfig {
        base_url: args.base_url.clone(),
        timeout,
        user_agent: format!("objection-cli/{}", env!("CARGO_PKG_VERSION")),
    })
}

/// Submit one query, wait for it, and print the outcome.
async fn run_once(args: Cli) -> Result<()> {
    let cfg = build_config(&args)?;
    let mut lifecycle = QueryLifecycle::default();
    let ticket = lifecycle.submit(&args.query_text(), &args.location)?;

    let backend: Arc<dyn AnalysisBackend> = Arc::new(RequestGateway::new(&cfg)?);
    let (out_tx, out_handle) = spawn_output_writer();
    if args.text {
        let _ = out_tx.send(OutputLine::Stderr(
            "Analyzing your situation... This may take 30-60 seconds...".into(),
        ));
    }

    let outcome = backend.send(&ticket.query, cfg.timeout).await;
    lifecycle.resolve(ticket.id, outcome);

    let res = match lifecycle.state() {
        LifecycleState::Succeeded { result } => {
            let presenter = ResultPresenter::new(result.clone(), &ticket.query.location);
            if args.json {
                let out = serde_json::to_string_pretty(presenter.result())?;
                let _ = out_tx.send(OutputLine::Stdout(out));
            } else {
                let summary = crate::text_summary::build_text_summary(&presenter);
                for line in summary.lines {
                    let _ = out_tx.send(OutputLine::Stdout(line));
                }
            }
            let processed = crate::orchestrator::process_result_completion(
                args.export_document.as_deref(),
                &presenter,
            );
            for msg in processed.export_messages {
                let _ = out_tx.send(OutputLine::Stderr(msg));
            }
            Ok(())
        }
        LifecycleState::Failed { kind, message } => {
            Err(anyhow::anyhow!("{message}\n{}", kind.hint()))
        }
        LifecycleState::Idle | LifecycleState::InFlight { .. } => {
            Err(anyhow::anyhow!("request did not complete"))
        }
    };

    drop(out_tx);
    let _ = out_handle.await;
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["objection"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_match_local_backend() {
        let cli = parse(&["--text", "--query", "hi"]);
        let cfg = build_config(&cli).unwrap();
        assert_eq!(cfg.timeout, Duration::from_millis(120_000));
        assert!(cfg.user_agent.starts_with("objection-cli/"));
        assert_eq!(cfg.base_url, "http://localhost:8000");
        assert_eq!(cli.location, "Boston, MA");
    }

    #[tokio::test]
    async fn output_writer_leaves_stderr_free_between_lines() {
        let (tx, handle) = spawn_output_writer();
        let _ = tx.send(OutputLine::Stderr("first".into()));
        tokio::time::sleep(Duration::from_millis(50)).await;

        let other_writer = tokio::task::spawn_blocking(|| {
            let mut err = std::io::stderr().lock();
            let _ = writeln!(err, "from a logger");
        });
        tokio::time::timeout(Duration::from_secs(5), other_writer)
            .await
            .expect("stderr stayed locked by the output writer")
            .unwrap();

        drop(tx);
        handle.await.unwrap();
    }

    #[test]
    fn scenario_supplies_query_text() {
        let cli = parse(&["--json", "--scenario", "landlord-mold"]);
        assert_eq!(cli.query_text(), Scenario::LandlordMold.query());
    }

    #[test]
    fn rejects_conflicting_flags() {
        assert!(Cli::try_parse_from(["objection", "--json", "--text"]).is_err());
        assert!(
            Cli::try_parse_from(["objection", "--query", "x", "--scenario", "ice-encounter"])
                .is_err()
        );
    }

    #[test]
    fn rejects_bad_base_url_and_zero_timeout() {
        let cli = parse(&["--text", "--base-url", "ftp://example.com"]);
        assert!(build_config(&cli).is_err());
        let cli = parse(&["--text", "--base-url", "not a url"]);
        assert!(build_config(&cli).is_err());
        let cli = parse(&["--text", "--timeout", "0s"]);
        assert!(build_config(&cli).is_err());
    }
}
