use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use x2md::{Bridge, Config, PageSnapshot, Status};

#[derive(Parser)]
#[command(name = "x2md")]
#[command(about = "Extract a post thread from a captured X/Twitter page", long_about = None)]
struct Cli {
    /// Page snapshot (JSON with html, layout and state)
    snapshot: PathBuf,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the detailed-fetch timeout
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Print the thread on a single line
    #[arg(long)]
    compact: bool,

    /// Debug logging for this crate
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "info,x2md=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<Status> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(timeout_ms) = cli.timeout_ms {
        config.bridge.timeout_ms = timeout_ms;
    }

    let raw = std::fs::read_to_string(&cli.snapshot)
        .with_context(|| format!("Failed to read snapshot {}", cli.snapshot.display()))?;
    let snapshot = PageSnapshot::from_json(&raw).context("Failed to parse snapshot")?;

    let bridge = Bridge::new(&config.bridge);
    let _page = bridge.attach_page(snapshot.clone(), config.clone());

    let extraction = match x2md::extract(&snapshot, &bridge, &config).await {
        Ok(extraction) => extraction,
        Err(err) => return Ok(Status::failure(&err)),
    };

    let json = if cli.compact {
        serde_json::to_string(&extraction.thread)?
    } else {
        serde_json::to_string_pretty(&extraction.thread)?
    };
    println!("{}", json);

    Ok(extraction.status())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(status) if status.success => {
            eprintln!("{}", status.message);
            ExitCode::SUCCESS
        }
        Ok(status) => {
            eprintln!("Error: {}", status.message);
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
