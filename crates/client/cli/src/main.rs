//! Headless duel simulator entry point.
mod config;
mod sim;

use std::path::Path;

use anyhow::Result;
use config::SimConfig;
use duel_runtime::RuntimeConfig;
use sim::Simulator;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = SimConfig::from_env();
    let _guard = setup_logging(config.log_dir.as_deref())?;
    let runtime = RuntimeConfig::from_env()?;

    let summary = Simulator::new(config, runtime).run().await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Logs to stderr, and to `duel-sim.log` under `log_dir` when given.
///
/// stdout is reserved for the JSON summary.
fn setup_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = tracing_appender::rolling::never(dir, "duel-sim.log");
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(dir) = log_dir {
        tracing::info!("Log file: {}/duel-sim.log", dir.display());
    }

    Ok(guard)
}
