//! Configuration reading and data directory paths.

pub mod paths;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::capture::ArtifactNaming;
use crate::randomness::RandomnessMode;

use paths::{default_downloads_dir, get_data_dir};

/// session_config.json shape. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    pub filename_prefix: String,
    pub file_extension: String,
    pub artifact_mime_type: String,
    /// Recorder encodings, most preferred first.
    pub mime_preferences: Vec<String>,
    pub downloads_dir: Option<PathBuf>,
    pub share_base_url: String,
    pub randomness: RandomnessMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let naming = ArtifactNaming::default();
        Self {
            filename_prefix: naming.prefix,
            file_extension: naming.extension,
            artifact_mime_type: naming.mime_type,
            mime_preferences: vec!["audio/webm;codecs=opus".to_string(), "audio/webm".to_string()],
            downloads_dir: None,
            share_base_url: "https://neurorave.app/".to_string(),
            randomness: RandomnessMode::default(),
        }
    }
}

impl SessionConfig {
    pub fn artifact_naming(&self) -> ArtifactNaming {
        ArtifactNaming {
            prefix: self.filename_prefix.clone(),
            extension: self.file_extension.clone(),
            mime_type: self.artifact_mime_type.clone(),
        }
    }

    pub fn resolved_downloads_dir(&self) -> PathBuf {
        self.downloads_dir
            .clone()
            .unwrap_or_else(default_downloads_dir)
    }
}

/// Read session_config.json from the data directory.
pub fn read_session_config() -> SessionConfig {
    read_json_file(&get_config_path()).unwrap_or_default()
}

/// Path to session_config.json.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("session_config.json")
}

/// Generic helper: read a JSON file and deserialize it.
pub fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(val) => Some(val),
            Err(e) => {
                warn!("Failed to parse {}: {}", path.display(), e);
                None
            }
        },
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to read {}: {}", path.display(), e);
            }
            None
        }
    }
}
