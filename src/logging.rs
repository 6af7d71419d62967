//! Log file setup
//!
//! The terminal UI owns stdout, so tracing output goes to a file: either the
//! one given on the command line or `weathernow.log` in the platform's local
//! data directory.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "weathernow.log";

/// Default log file location (`~/.local/share/weathernow/weathernow.log` on Linux)
pub fn default_log_path() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "weathernow")?;
    Some(project_dirs.data_local_dir().join(LOG_FILE_NAME))
}

/// Opens `path` for appending, creating missing parent directories.
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("weathernow=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Installs the global tracing subscriber.
///
/// Returns the path being logged to, or `None` when no log location could be
/// determined.
pub fn init(log_file: Option<&Path>, verbose: bool) -> io::Result<Option<PathBuf>> {
    let Some(path) = log_file.map(Path::to_path_buf).or_else(default_log_path) else {
        return Ok(None);
    };
    let file = open_log_file(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    tracing::info!(path = %path.display(), "logging initialised");
    Ok(Some(path))
}
