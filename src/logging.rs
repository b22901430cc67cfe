//! Tracing configuration and log routing.
//!
//! Every event goes to stdout in compact form. A second copy goes to disk through a
//! non-blocking writer: `REVIEWSCOPE_LOG_FILE` names an append-only file, otherwise a daily
//! rolling file is written under `REVIEWSCOPE_LOG_DIR` (default `logs/`). Setting
//! `REVIEWSCOPE_LOG_FILE=off` disables the file copy.
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const DEFAULT_LOG_DIR: &str = "logs";
const LOG_FILE_PREFIX: &str = "reviewscope.log";

/// Where the file copy of the log stream goes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FileTarget {
    Disabled,
    Append(PathBuf),
    Rolling(PathBuf),
}

impl FileTarget {
    fn resolve(file: Option<String>, dir: Option<String>) -> Self {
        match file.as_deref().map(str::trim) {
            Some("off") => FileTarget::Disabled,
            Some(path) if !path.is_empty() => FileTarget::Append(PathBuf::from(path)),
            _ => FileTarget::Rolling(PathBuf::from(
                dir.filter(|dir| !dir.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_LOG_DIR.to_string()),
            )),
        }
    }

    fn from_env() -> Self {
        Self::resolve(
            std::env::var("REVIEWSCOPE_LOG_FILE").ok(),
            std::env::var("REVIEWSCOPE_LOG_DIR").ok(),
        )
    }
}

/// Install the global subscriber. `RUST_LOG` controls filtering and defaults to `info`.
///
/// Calling this twice is harmless; the second call leaves the first subscriber in place.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();
    let file_layer = file_writer(FileTarget::from_env()).map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact()
    });

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init();
    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

fn file_writer(target: FileTarget) -> Option<NonBlocking> {
    let (writer, guard) = match target {
        FileTarget::Disabled => return None,
        FileTarget::Append(path) => {
            match std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
            {
                Ok(file) => tracing_appender::non_blocking(file),
                Err(err) => {
                    eprintln!("Failed to open log file {}: {err}", path.display());
                    return None;
                }
            }
        }
        FileTarget::Rolling(dir) => {
            if let Err(err) = std::fs::create_dir_all(&dir) {
                eprintln!("Failed to create log directory {}: {err}", dir.display());
                return None;
            }
            tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX))
        }
    };
    let _ = LOG_GUARD.set(guard);
    Some(writer)
}
