// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for the sound registry and grid files.

use std::path::PathBuf;
use thiserror::Error;

/// The playback engine could not make sense of some audio data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct DecodeError(pub String);

/// Errors raised by [`crate::models::registry::SoundRegistry`] mutators.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The source key is already on the grid (or is being added).
    #[error("You've already added {0}.")]
    Duplicate(String),

    /// The playback engine rejected the audio.
    #[error("{key} is not of a supported format.")]
    UnsupportedFormat { key: String, reason: DecodeError },

    /// No entry with this key exists.
    #[error("No sound named {0} is on the grid.")]
    NotFound(String),

    /// The grid was replaced while this sound was still being checked.
    #[error("{0} was discarded because the grid was reloaded.")]
    Stale(String),
}

impl RegistryError {
    /// Why the sound was refused, without repeating its key.
    pub fn reason(&self) -> String {
        match self {
            RegistryError::Duplicate(_) => "already on the grid".to_string(),
            RegistryError::UnsupportedFormat { reason, .. } => {
                format!("not of a supported format ({})", reason)
            }
            RegistryError::NotFound(_) => "not on the grid".to_string(),
            RegistryError::Stale(_) => "discarded by a reload".to_string(),
        }
    }
}

/// Errors raised while reading a grid file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error while loading grid: {0}")]
    Io(#[from] std::io::Error),

    /// Neither a share archive nor a definition file.
    #[error("unreadable grid file: {0}")]
    Unreadable(String),
}

/// Errors raised while writing a definition file or share archive.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("io error while saving {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("failed to encode manifest: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("embedded audio for {0} is corrupt")]
    CorruptEmbedded(String),

    /// A sound name that would be written outside the grid's directory.
    #[error("{0:?} is not a usable file name")]
    UnsafeName(String),

    /// Two embedded sounds would be written to the same sibling file.
    #[error("more than one sound would be saved as {0:?}")]
    NameCollision(PathBuf),
}

impl SaveError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SaveError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised while reading or writing settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_message_names_the_file() {
        let err = RegistryError::Duplicate("/tmp/a.mp3".into());
        assert_eq!(err.to_string(), "You've already added /tmp/a.mp3.");
    }

    #[test]
    fn unsupported_message_names_the_file() {
        let err = RegistryError::UnsupportedFormat {
            key: "/tmp/a.txt".into(),
            reason: DecodeError("no reader".into()),
        };
        assert_eq!(err.to_string(), "/tmp/a.txt is not of a supported format.");
    }

    #[test]
    fn reason_leaves_out_the_key() {
        let err = RegistryError::UnsupportedFormat {
            key: "/tmp/a.txt".into(),
            reason: DecodeError("no reader".into()),
        };
        assert_eq!(err.reason(), "not of a supported format (no reader)");
        assert!(!RegistryError::Duplicate("/a.mp3".into()).reason().contains("/a.mp3"));
    }

    #[test]
    fn save_io_error_keeps_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = SaveError::io("/grid.chgd", io_err);
        assert!(err.to_string().contains("access denied"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
