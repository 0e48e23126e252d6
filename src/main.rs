mod cli;
mod error;
mod gateway;
mod lifecycle;
mod logging;
mod model;
mod orchestrator;
mod presenter;
mod scenarios;
mod storage;
#[cfg(test)]
mod test_support;
mod text_summary;
mod triage;
#[cfg(feature = "tui")]
mod tui;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let is_non_tui = args.json || args.text || cfg!(not(feature = "tui"));

    match cli::run(args).await {
        Ok(()) => {
            // Explicitly exit with code 0 on success, especially for non-TUI modes
            if is_non_tui {
                std::process::exit(0);
            }
            Ok(())
        }
        Err(e) if is_non_tui => {
            // Gateway messages already carry their own prefix.
            eprintln!("{e:#}");
            std::process::exit(1);
        }
        Err(e) => Err(e),
    }
}
