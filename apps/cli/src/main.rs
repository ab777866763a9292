mod cli;
mod config;
mod replay;

use std::sync::Arc;

use clap::Parser;
use sideline_acquisition::{
    AccuWeatherProvider, AcquisitionCoordinator, OpenWeatherProvider, ProviderAdapter,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::Cli;
use config::ApiKeys;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;
    let mode = cli.mode.unwrap_or(config.validation_mode);

    let mut adapters: Vec<Arc<dyn ProviderAdapter>> = Vec::new();
    if let Some(path) = &cli.replay {
        adapters.push(replay::load(path)?);
    }
    let keys = ApiKeys::from_lookup(|name| std::env::var(name).ok());
    if let Some(key) = keys.accuweather {
        adapters.push(Arc::new(AccuWeatherProvider::new(key)));
    }
    if let Some(key) = keys.openweather {
        adapters.push(Arc::new(OpenWeatherProvider::new(key)));
    }

    let coordinator = AcquisitionCoordinator::new(config, adapters)?;
    let request = cli.command.request();
    tracing::info!("Acquiring {} in {} mode", request, mode);

    let result = coordinator.acquire_with_mode(&request, mode).await?;
    let output = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", output);
    Ok(())
}

/// Text logs by default; `SIDELINE_LOG_FORMAT=json` for structured output.
/// Level comes from `RUST_LOG` (default info). Logs go to stderr so stdout
/// carries only the result.
fn init_tracing() {
    let log_format = std::env::var("SIDELINE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
