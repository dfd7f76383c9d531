use crate::config::Config;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    Discard,
}

impl LogSink {
    /// Where logs go when the log file cannot be opened. The TUI owns the
    /// terminal, so stderr output would draw over it.
    pub fn fallback(tui: bool) -> Self {
        if tui {
            LogSink::Discard
        } else {
            LogSink::Stderr
        }
    }
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn subscriber<W>(filter: EnvFilter, writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish()
}

pub fn init_sink(sink: LogSink, default_level: &str) {
    let filter = env_filter(default_level);
    let result = match sink {
        LogSink::Stderr => tracing::subscriber::set_global_default(subscriber(filter, std::io::stderr)),
        LogSink::Discard => tracing::subscriber::set_global_default(subscriber(filter, std::io::sink)),
    };
    if let Err(e) = result {
        eprintln!("Failed to install log subscriber: {}", e);
    }
}

pub fn log_file_path() -> PathBuf {
    match Config::project_dirs() {
        Some(dirs) => dirs.data_dir().join("poster-lookup.log"),
        None => PathBuf::from("poster-lookup.log"),
    }
}

pub fn init_file() -> Result<PathBuf> {
    let path = log_file_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create log directory")?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {:?}", path))?;

    FmtSubscriber::builder()
        .with_env_filter(env_filter("info"))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))?;

    Ok(path)
}
