use clap::Parser;

use inkpress::api::{ApiServer, AppState};
use inkpress::config::AppConfig;
use inkpress::mailer::{LogTransport, Mailer};

#[derive(Parser)]
#[command(name = "inkpress", about = "Identity and follow-graph API server")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = "inkpress.toml")]
    config: String,

    /// Override the configured listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load_or_default(&cli.config);
    let port = cli.port.unwrap_or(config.server.port);

    let mailer = Mailer::spawn(LogTransport);
    let state = AppState::new(&config, mailer);

    if let Err(e) = ApiServer::new(state, port).start().await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
