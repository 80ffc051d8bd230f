use std::path::PathBuf;
use std::sync::Mutex;

use color_eyre::Result;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

lazy_static::lazy_static! {
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

/// Where log records go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Append to a file; `None` uses `LOG_FILE` in the current directory.
    File(Option<PathBuf>),
}

/// Initialize stderr logging at WARN unless `RUST_LOG` says otherwise.
pub fn init() -> Result<()> {
    init_with(LogTarget::Stderr, None)
}

/// Initialize logging to `target`. An explicit `level` is the default directive;
/// `RUST_LOG` directives still refine it.
pub fn init_with(target: LogTarget, level: Option<tracing::Level>) -> Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.unwrap_or(tracing::Level::WARN).into())
        .from_env_lossy();

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match target {
        LogTarget::Stderr => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(env_filter)
            .boxed(),
        LogTarget::File(custom_log_path) => {
            let log_path = match custom_log_path {
                Some(path) => {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent)?;
                    }
                    path
                }
                None => std::env::current_dir()?.join(LOG_FILE.as_str()),
            };
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)?;
            fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_writer(Mutex::new(file))
                .with_target(false)
                .with_ansi(false)
                .with_filter(env_filter)
                .boxed()
        }
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(ErrorLayer::default())
        .try_init()?;

    Ok(())
}
