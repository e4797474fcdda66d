//! Tracing setup for the `tutor` binary.
//!
//! Events go to `tutor.log` in the XDG state directory. The binary falls back
//! to [`init_logging_stderr`] when that file cannot be opened.

use anyhow::{anyhow, Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset or unparseable.
const DEFAULT_FILTER: &str = "info,tutor=debug,tutor_core=debug";

const LOG_FILE_NAME: &str = "tutor.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Directory holding `tutor.log`.
pub fn log_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("tutor")?;
    Ok(xdg_dirs.get_state_home().join("tutor"))
}

/// Appends to the log file; each event gets its own handle to the shared file.
struct LogFile(File);

/// Handle for one event. Degrades to stderr if the file handle cannot be duplicated.
enum LogSink {
    File(File),
    Stderr(io::Stderr),
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogSink::File(f) => f.write(buf),
            LogSink::Stderr(e) => e.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogSink::File(f) => f.flush(),
            LogSink::Stderr(e) => e.flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        match self.0.try_clone() {
            Ok(f) => LogSink::File(f),
            Err(_) => LogSink::Stderr(io::stderr()),
        }
    }
}

fn open_log_file(dir: &Path) -> Result<(File, PathBuf)> {
    fs::create_dir_all(dir).with_context(|| format!("create log dir {}", dir.display()))?;
    let path = dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;
    Ok((file, path))
}

/// Install the global subscriber writing to `$XDG_STATE_HOME/tutor/tutor.log`.
///
/// Errors if the file cannot be opened or a subscriber is already installed.
pub fn init_logging() -> Result<()> {
    let (file, path) = open_log_file(&log_dir()?)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(LogFile(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("install subscriber: {}", e))?;

    tracing::info!(path = %path.display(), "logging started");
    Ok(())
}

/// Install a stderr-only subscriber. Keeps any subscriber already installed.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}
