use std::process;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use insight_chat::commands;
use insight_chat::config::Cli;
use insight_chat::controller::Controller;
use insight_chat::services::backend::HttpBackend;
use insight_chat::services::persistence::LocalStore;
use insight_chat::state::AppState;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    if let Err(error) = run().await {
        tracing::error!(error = %error, "insight-chat terminated with error");
        eprintln!("Error: {error:#}");
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let state_dir = cli
        .state_dir()
        .context("no local data directory on this platform, pass --state-dir")?;
    let backend = HttpBackend::new(cli.api_url.clone(), cli.request_timeout())
        .context("failed to build HTTP client")?;

    tracing::info!(
        api_url = %backend.base_url(),
        state_dir = %state_dir.display(),
        "starting insight-chat"
    );

    let state = Arc::new(AppState::new(
        Arc::new(backend),
        LocalStore::new(state_dir),
        cli.progress(),
    ));
    let mut controller = Controller::new(state, cli.initial_query());

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    commands::run(&mut controller, stdin, &mut stdout)
        .await
        .context("terminal I/O failed")?;

    Ok(())
}

// Logs go to stderr so they stay out of the transcript.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
