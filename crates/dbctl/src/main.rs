use clap::Parser;
use tracing::{debug, error, info, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod connection;
mod error;
mod output;

use cli::Cli;
use error::DbCtlError;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and succeed; usage errors exit 1
            let code = if e.use_stderr() { 1 } else { 0 };
            if e.print().is_err() {
                eprint!("{}", e.render());
            }
            std::process::exit(code);
        }
    };

    // Initialize tracing based on verbosity level
    init_tracing(cli.verbose);

    if let Err(e) = execute(&cli).await {
        e.print_diagnostic();
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    // Check for RUST_LOG env var first, then fall back to verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "dbctl=warn,dbctl_core=warn",
            1 => "dbctl=info,dbctl_core=info",
            2 => "dbctl=debug,dbctl_core=debug",
            _ => "dbctl=trace,dbctl_core=trace,reqwest=debug",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

async fn execute(cli: &Cli) -> Result<(), DbCtlError> {
    trace!("Parsed arguments: {:?}", cli.wait);
    info!(
        "Creating database {} in home {}",
        cli.database.db_name, cli.database.db_home_id
    );

    let start = std::time::Instant::now();
    let result = commands::create::handle_create(cli, tokio::signal::ctrl_c()).await;

    let duration = start.elapsed();
    match &result {
        Ok(_) => info!("Command completed successfully in {:?}", duration),
        Err(e) => error!("Command failed after {:?}: {}", duration, e),
    }

    result
}
