mod action;
mod app;
mod app_state;
mod component;
mod components;
mod theme;
mod widgets;
mod workspace;

use anyhow::Context;

use tvh_proto::client::TvhClient;
use tvh_proto::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = tvh_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating {}", data_dir.display()))?;

    let log_path = data_dir.join("tvhc.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening {}", log_path.display()))?;

    // Allow RUST_LOG override; default to debug for app code but suppress noisy
    // connection-level DEBUG from HTTP client internals (hyper_util, reqwest).
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("tvhc log: {}", log_path.display());

    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("config load failed, using defaults: {:#}", e);
        Config::default()
    });
    config.apply_env();
    tracing::info!("tvhc starting against {}", config.server.base_url);

    let client = TvhClient::new(&config.server).context("building HTTP client")?;

    app::App::new(config, client).run().await
}
