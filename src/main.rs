use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use health_scanner::scanner::{NoCamera, StderrNotifier};
use health_scanner::{
    BarcodeDecoder, Config, HealthApi, LineFeedDecoder, ScanOrchestrator, ScannerAdapter, ViewState,
    session,
};

#[derive(Parser, Debug)]
#[command(
    name = "health-scanner",
    version,
    about = "Check a food product's health score by barcode"
)]
struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    json: bool,
    #[arg(
        long,
        global = true,
        help = "Health API product endpoint (overrides HEALTH_API_BASE_URL)"
    )]
    api_base_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Look up one barcode and print the result
    Check { barcode: String },
    /// Interactive scanning from the terminal and an optional barcode feed
    Scan {
        #[arg(long, help = "Device or file the barcode scanner writes decoded codes to")]
        feed: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct JsonOut<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Serialize)]
struct ErrorOut<'a> {
    error: &'a str,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(url) = cli.api_base_url {
        config.api_base_url = url;
    }
    info!("Using health API at {}", config.api_base_url);

    let api = HealthApi::new(&config.api_base_url, config.timeout)
        .context("Failed to build HTTP client")?;

    match cli.command {
        Commands::Check { barcode } => check(api, &barcode, cli.json).await,
        Commands::Scan { feed } => scan(api, feed.or(config.feed)).await,
    }
}

async fn check(api: HealthApi, barcode: &str, json: bool) -> Result<()> {
    let (sink, _detections) = mpsc::unbounded_channel();
    let scanner = ScannerAdapter::new(Box::new(NoCamera), sink);
    let mut app = ScanOrchestrator::new(api, scanner, Box::new(StderrNotifier));

    app.type_input(barcode);
    app.handle_scan(None).await;

    match app.state() {
        ViewState::Result(view) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&JsonOut { ok: true, data: view })?);
            } else {
                print!("{view}");
            }
            Ok(())
        }
        ViewState::Error(message) => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&JsonOut {
                        ok: false,
                        data: ErrorOut { error: message },
                    })?
                );
            }
            bail!("{message}")
        }
        ViewState::Input => bail!("Lookup did not complete"),
    }
}

async fn scan(api: HealthApi, feed: Option<PathBuf>) -> Result<()> {
    let (sink, detections) = mpsc::unbounded_channel();
    let decoder: Box<dyn BarcodeDecoder> = match feed {
        Some(path) => {
            info!("Reading barcodes from {}", path.display());
            Box::new(LineFeedDecoder::new(path))
        }
        None => Box::new(NoCamera),
    };
    let scanner = ScannerAdapter::new(decoder, sink);
    let mut app = ScanOrchestrator::new(api, scanner, Box::new(StderrNotifier));

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    session::run(&mut app, stdin, detections, &mut stdout)
        .await
        .context("Terminal session failed")?;
    Ok(())
}
