// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Audio file checks.
//!
//! This module decides whether audio data can be played before it is put
//! on the grid, and guesses MIME types for files that arrive without one.

use crate::error::DecodeError;
use crate::models::sound::AudioSource;
use std::fs::File;
use std::io::Cursor;
use std::panic::{self, AssertUnwindSafe};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};

/// Audio extensions offered when picking sounds by hand.
pub const DEFAULT_AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "m4a", "aac"];

/// Something that can tell whether audio data is playable.
///
/// `probe` answers exactly once: `Ok` when the audio decodes, otherwise
/// the reason it does not.
pub trait PlaybackEngine: Send + Sync {
    fn probe(&self, source: &AudioSource) -> Result<(), DecodeError>;
}

/// Ask `engine` about `source`, turning a panic inside the decoder into a
/// decode error so the caller always gets an answer.
pub fn check_decodes(engine: &dyn PlaybackEngine, source: &AudioSource) -> Result<(), DecodeError> {
    panic::catch_unwind(AssertUnwindSafe(|| engine.probe(source)))
        .unwrap_or_else(|_| Err(DecodeError("decoder crashed while reading the audio".to_string())))
}

/// Checks audio by opening it with symphonia and building a decoder for
/// its default track.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaEngine;

impl PlaybackEngine for SymphoniaEngine {
    fn probe(&self, source: &AudioSource) -> Result<(), DecodeError> {
        let mut hint = Hint::new();

        let media: Box<dyn MediaSource> = match source {
            AudioSource::File(path) => {
                if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
                    hint.with_extension(ext);
                }
                Box::new(File::open(path).map_err(|e| DecodeError(e.to_string()))?)
            }
            AudioSource::Embedded(_) => {
                let bytes = source.read_bytes().map_err(|e| DecodeError(e.to_string()))?;
                Box::new(Cursor::new(bytes))
            }
        };

        let mss = MediaSourceStream::new(media, Default::default());
        let probed = get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| DecodeError(e.to_string()))?;

        let track = probed
            .format
            .default_track()
            .ok_or_else(|| DecodeError("no default audio track".to_string()))?;

        get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| DecodeError(e.to_string()))?;

        Ok(())
    }
}

/// Guess a MIME type from a file extension.
pub fn guess_mime_type(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "mp3" => "audio/mpeg",
        "wav" | "wave" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        "m4a" | "mp4" => "audio/mp4",
        "aac" => "audio/aac",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Accepts everything except `.txt` files and embedded audio that
    /// starts with `NOPE`. Never touches the disk.
    pub struct ScriptedEngine;

    impl PlaybackEngine for ScriptedEngine {
        fn probe(&self, source: &AudioSource) -> Result<(), DecodeError> {
            match source {
                AudioSource::File(path) => {
                    if path.extension().and_then(|s| s.to_str()) == Some("txt") {
                        Err(DecodeError("not audio".into()))
                    } else {
                        Ok(())
                    }
                }
                AudioSource::Embedded(audio) => match audio.to_bytes() {
                    Ok(bytes) if bytes.starts_with(b"NOPE") => Err(DecodeError("not audio".into())),
                    Ok(_) => Ok(()),
                    Err(e) => Err(DecodeError(e.to_string())),
                },
            }
        }
    }
}
