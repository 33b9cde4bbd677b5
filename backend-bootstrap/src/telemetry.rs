use anyhow::{anyhow, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use backend_infrastructure::AppConfig;

/// Installs the global subscriber: stdout (plain or JSON) plus an optional
/// daily-rolling file under `log_dir`. Keep the returned guard alive until
/// shutdown so buffered file output is flushed.
pub fn init(config: &AppConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "tradepost-backend.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(config.log_json.then(|| fmt::layer().json()))
        .with((!config.log_json).then(|| fmt::layer()))
        .with(file_layer)
        .try_init()
        .map_err(|err| anyhow!("installing tracing subscriber: {}", err))?;
    Ok(guard)
}
