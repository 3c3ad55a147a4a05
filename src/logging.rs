//! Tracing setup: journald when available, a rolling log file otherwise.

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. The `LANKATOURS_LOG` environment variable
/// selects the level filter; unset means `info`.
pub fn init(log_dir: Option<PathBuf>) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_env("LANKATOURS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    #[cfg(target_os = "linux")]
    if let Ok(journald) = tracing_journald::layer() {
        tracing_subscriber::registry().with(env_filter).with(journald).init();
        tracing::info!("logging to journald");
        return Ok(());
    }

    let log_dir = log_dir.unwrap_or_else(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lankatours")
            .join("logs")
    });
    std::fs::create_dir_all(&log_dir)?;

    let appender = tracing_appender::rolling::daily(&log_dir, "lankatours.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    // The worker guard has to outlive the process's logging, or buffered
    // lines are dropped on exit. init() runs once, so parking it in a
    // static is enough.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    tracing::info!("logging to {}", log_dir.display());
    Ok(())
}
