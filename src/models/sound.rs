// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Sound data structures.
//!
//! This module defines a grid entry, the candidate a new entry is built
//! from, and the audio source handed to the playback engine.

use crate::util::paths::split_file_name;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::PathBuf;
use std::sync::Arc;

/// Audio bytes carried in memory, held base64-encoded.
///
/// Cloning is cheap; the encoded text is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedAudio(Arc<str>);

impl EmbeddedAudio {
    /// Encode raw audio bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(STANDARD.encode(bytes).into())
    }

    /// Wrap text that is already base64.
    pub fn from_base64(encoded: impl Into<Arc<str>>) -> Self {
        Self(encoded.into())
    }

    pub fn as_base64(&self) -> &str {
        &self.0
    }

    /// Decode back to raw audio bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.0.as_bytes())
    }
}

/// Where the playback engine should read audio from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSource {
    File(PathBuf),
    Embedded(EmbeddedAudio),
}

impl AudioSource {
    /// Read the full audio content.
    pub fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        match self {
            AudioSource::File(path) => std::fs::read(path),
            AudioSource::Embedded(audio) => audio
                .to_bytes()
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
        }
    }
}

/// Everything needed to try adding a sound to the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundCandidate {
    pub source_key: String,
    pub mime_type: String,
    pub embedded: Option<EmbeddedAudio>,
    pub display_name: Option<String>,
}

impl SoundCandidate {
    /// A sound referencing a file on disk.
    pub fn from_file(path: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            source_key: path.into(),
            mime_type: mime_type.into(),
            embedded: None,
            display_name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_embedded(mut self, audio: EmbeddedAudio) -> Self {
        self.embedded = Some(audio);
        self
    }

    pub fn audio_source(&self) -> AudioSource {
        match &self.embedded {
            Some(audio) => AudioSource::Embedded(audio.clone()),
            None => AudioSource::File(PathBuf::from(&self.source_key)),
        }
    }
}

/// One sound on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundEntry {
    pub source_key: String,
    pub display_name: String,
    pub extension: String,
    pub mime_type: String,
    pub embedded: Option<EmbeddedAudio>,
}

impl SoundEntry {
    /// Build an entry, defaulting the name to the file stem.
    pub fn from_candidate(candidate: SoundCandidate) -> Self {
        let parts = split_file_name(&candidate.source_key);
        Self {
            display_name: candidate.display_name.unwrap_or(parts.stem),
            extension: parts.extension,
            source_key: candidate.source_key,
            mime_type: candidate.mime_type,
            embedded: candidate.embedded,
        }
    }

    pub fn audio_source(&self) -> AudioSource {
        match &self.embedded {
            Some(audio) => AudioSource::Embedded(audio.clone()),
            None => AudioSource::File(PathBuf::from(&self.source_key)),
        }
    }
}

/// Read-only view of a sound for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundView {
    pub source_key: String,
    pub display_name: String,
    pub mime_type: String,
    pub is_playing: bool,
}
