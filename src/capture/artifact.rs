//! Assembling captured chunks into a downloadable artifact.

use chrono::{DateTime, SecondsFormat, Utc};

/// The finished recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub filename: String,
}

/// Filename and MIME settings for produced artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNaming {
    pub prefix: String,
    pub extension: String,
    pub mime_type: String,
}

impl Default for ArtifactNaming {
    fn default() -> Self {
        Self {
            prefix: "neurorave-recording".to_string(),
            extension: "webm".to_string(),
            mime_type: "audio/webm".to_string(),
        }
    }
}

impl ArtifactNaming {
    /// `<prefix>-<timestamp>.<ext>`
    pub fn filename(&self, at: DateTime<Utc>) -> String {
        format!("{}-{}.{}", self.prefix, timestamp_slug(at), self.extension)
    }

    /// Concatenate `chunks` in arrival order.
    pub fn assemble(&self, chunks: Vec<Vec<u8>>, at: DateTime<Utc>) -> Artifact {
        Artifact {
            bytes: chunks.concat(),
            mime_type: self.mime_type.clone(),
            filename: self.filename(at),
        }
    }
}

/// ISO-8601 UTC timestamp with millisecond precision, with `:` and `.`
/// replaced by `-` so it is safe in filenames.
pub fn timestamp_slug(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 34, 56).unwrap() + chrono::Duration::milliseconds(789)
    }

    #[test]
    fn slug_replaces_unsafe_characters() {
        assert_eq!(timestamp_slug(instant()), "2025-03-01T12-34-56-789Z");
    }

    #[test]
    fn filename_has_only_the_extension_dot() {
        let name = ArtifactNaming::default().filename(instant());
        assert_eq!(name, "neurorave-recording-2025-03-01T12-34-56-789Z.webm");
        assert!(!name.contains(':'));
        assert_eq!(name.matches('.').count(), 1);
        assert!(name.ends_with(".webm"));
    }

    #[test]
    fn assemble_keeps_arrival_order() {
        let naming = ArtifactNaming::default();
        let artifact = naming.assemble(
            vec![b"c1".to_vec(), b"c2".to_vec(), b"c3".to_vec()],
            instant(),
        );
        assert_eq!(artifact.bytes, b"c1c2c3");
        assert_eq!(artifact.mime_type, "audio/webm");
    }

    #[test]
    fn assemble_without_chunks_is_empty() {
        let artifact = ArtifactNaming::default().assemble(Vec::new(), instant());
        assert!(artifact.bytes.is_empty());
    }
}
