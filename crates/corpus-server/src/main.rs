mod dispatch;
mod error;
mod retry;
mod service;
mod transport;

use clap::Parser;
use corpus_config::ServiceConfig;
use tokio_util::sync::CancellationToken;

use service::Service;

/// Line-delimited JSON-over-stdio tool server (§6).
#[derive(Debug, Parser)]
#[command(name = "corpus-server", version, about)]
struct Args {
    /// Quiet mode (suppress non-essential logging).
    #[arg(short, long)]
    quiet: bool,

    /// Verbose mode (debug logging).
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("corpus-server error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.quiet, args.verbose)?;
    let _ = dotenvy::dotenv();

    let config = ServiceConfig::load()?;
    let service = Service::bootstrap(config).await?;
    tracing::info!(
        documents_collection = service.documents_collection(),
        code_collection = service.code_collection(),
        dimensions = service.dimensions(),
        "corpus-server ready"
    );

    let shutdown = CancellationToken::new();
    let ctrl_c_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_shutdown.cancel();
        }
    });

    transport::stdio::run(&service, shutdown).await;
    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("CORPUS_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
