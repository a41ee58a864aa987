use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{PainelError, Result};

/// Environment variable that overrides the configured filter.
pub const LOG_ENV: &str = "PAINEL_LOG";

pub enum LogTarget {
    Stderr,
    /// Used while the dashboard owns the terminal.
    File(PathBuf),
}

/// `PAINEL_LOG` when set and valid, else `default_level`.
pub fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// True when `directives` parses as a tracing filter.
pub fn is_valid_filter(directives: &str) -> bool {
    EnvFilter::try_new(directives).is_ok()
}

pub fn init(target: LogTarget, default_level: &str) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(default_level))
        .with_target(false)
        .compact();

    let installed = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };
    installed.map_err(|e| PainelError::Other(format!("could not start logging: {e}")))
}
