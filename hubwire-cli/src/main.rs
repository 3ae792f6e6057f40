use std::io;

use clap::Parser;
use hubwire_cli::settings::Settings;
use hubwire_cli::{Cli, run};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let settings = Settings::new(cli.config.as_deref()).expect("Failed to load settings.");

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let app_name = env!("CARGO_PKG_NAME").replace('-', "_");
            let level = settings.logger.level.as_str();

            format!("{app_name}={level}").into()
        }))
        .init();

    if let Err(e) = run(cli, &settings, &mut io::stdout()).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}
