//! Platform-specific data directory paths.
//!
//!   Windows: %APPDATA%/neurorave/data
//!   macOS:   ~/Library/Application Support/neurorave/data
//!   Linux:   $XDG_CONFIG_HOME/neurorave/data (default ~/.config)

use std::path::PathBuf;

/// Get the NeuroRAVE data directory (cross-platform).
pub fn get_data_dir() -> PathBuf {
    get_config_base().join("neurorave").join("data")
}

/// Rolling log files.
pub fn get_log_dir() -> PathBuf {
    get_data_dir().join("logs")
}

/// Artifacts waiting to be downloaded.
pub fn get_staging_dir() -> PathBuf {
    get_data_dir().join("staging")
}

/// Default download destination: the user's downloads folder, or a
/// `recordings` folder in the data dir when the platform has none.
pub fn default_downloads_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| get_data_dir().join("recordings"))
}

/// Platform config directory, or the working directory when the platform
/// reports none.
fn get_config_base() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from("."))
}
