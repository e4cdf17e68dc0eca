//! Handing finished artifacts to the user.
//!
//! A finalized artifact is addressed through an [`ArtifactHandle`], the
//! equivalent of a browser object URL. Every handle must be released once
//! the download has been initiated, whether or not that succeeded.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::capture::Artifact;
use crate::randomness::IdSource;

/// Temporary reference to a finalized artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactHandle(pub String);

/// Where finished recordings go.
pub trait DownloadTarget {
    fn finalize_artifact(&mut self, artifact: &Artifact) -> anyhow::Result<ArtifactHandle>;

    /// Deliver the artifact behind `handle` as `filename`; returns its final location.
    fn download(&mut self, handle: &ArtifactHandle, filename: &str) -> anyhow::Result<PathBuf>;

    fn release_handle(&mut self, handle: &ArtifactHandle);
}

/// Stages artifacts as files and copies them into a downloads directory.
pub struct FileDownloads {
    staging_dir: PathBuf,
    downloads_dir: PathBuf,
    extension: String,
    ids: IdSource,
}

impl FileDownloads {
    pub fn new(
        staging_dir: impl Into<PathBuf>,
        downloads_dir: impl Into<PathBuf>,
        extension: &str,
        ids: IdSource,
    ) -> Self {
        Self {
            staging_dir: staging_dir.into(),
            downloads_dir: downloads_dir.into(),
            extension: extension.to_string(),
            ids,
        }
    }

    pub fn downloads_dir(&self) -> &Path {
        &self.downloads_dir
    }
}

/// `dir/filename`, or the first free `stem (n).ext` when that name is taken.
fn unique_target(dir: &Path, filename: &str) -> PathBuf {
    let target = dir.join(filename);
    if !target.exists() {
        return target;
    }
    let name = Path::new(filename);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = name.extension().map(|e| e.to_string_lossy().into_owned());
    let mut n = 1u32;
    loop {
        let candidate = match &ext {
            Some(ext) => dir.join(format!("{} ({}).{}", stem, n, ext)),
            None => dir.join(format!("{} ({})", stem, n)),
        };
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

impl DownloadTarget for FileDownloads {
    fn finalize_artifact(&mut self, artifact: &Artifact) -> anyhow::Result<ArtifactHandle> {
        fs::create_dir_all(&self.staging_dir).with_context(|| {
            format!("Failed to create staging dir {}", self.staging_dir.display())
        })?;
        let staged = self
            .staging_dir
            .join(format!("{}.{}", self.ids.next_id(), self.extension));
        fs::write(&staged, &artifact.bytes)
            .with_context(|| format!("Failed to stage artifact at {}", staged.display()))?;
        debug!(path = %staged.display(), bytes = artifact.bytes.len(), "Artifact staged");
        Ok(ArtifactHandle(staged.to_string_lossy().into_owned()))
    }

    fn download(&mut self, handle: &ArtifactHandle, filename: &str) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(&self.downloads_dir).with_context(|| {
            format!(
                "Failed to create downloads dir {}",
                self.downloads_dir.display()
            )
        })?;
        let target = unique_target(&self.downloads_dir, filename);
        fs::copy(&handle.0, &target)
            .with_context(|| format!("Failed to save recording to {}", target.display()))?;
        info!(path = %target.display(), "Recording saved");
        Ok(target)
    }

    fn release_handle(&mut self, handle: &ArtifactHandle) {
        match fs::remove_file(&handle.0) {
            Ok(()) => debug!(handle = %handle.0, "Artifact handle released"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to release artifact {}: {}", handle.0, e),
        }
    }
}
