//! Flu Radar - Intake service entry point

use clap::Parser;
use fluradar_form::cli::{extract_file, Cli, Command};
use fluradar_form::config::FormConfig;
use fluradar_form::{start_server, FormError};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize tracing (log to stderr, RUST_LOG overrides)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), FormError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => {
            let mut config = match args.config {
                Some(path) => FormConfig::from_file(&path)?,
                None => {
                    warn!("No configuration file given, using defaults");
                    FormConfig::default()
                }
            };

            if let Some(bind) = args.bind {
                config.bind_address = bind.ip().to_string();
                config.bind_port = bind.port();
            }

            start_server(config).await
        }
        Command::Extract(args) => {
            let fields = extract_file(&args.path, args.duplicates)?;
            println!("{}", serde_json::to_string_pretty(&fields)?);
            Ok(())
        }
    }
}
