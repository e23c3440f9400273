// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Sound playback for grid tiles.
//!
//! Each sound gets a voice the first time it is played. Voices are owned
//! here, never by the registry, and are never persisted. Audio output uses
//! rodio when the `playback` feature is enabled; otherwise play state is
//! tracked without producing sound.

use crate::error::DecodeError;
use crate::models::sound::SoundEntry;
use std::collections::HashMap;
use std::sync::Arc;

/// Plays, pauses and stops grid sounds by source key.
pub struct Player {
    output: output::Output,
    voices: HashMap<String, output::Voice>,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            output: output::Output::open(),
            voices: HashMap::new(),
        }
    }

    /// Start or resume a sound.
    pub fn play(&mut self, entry: &SoundEntry) -> Result<(), DecodeError> {
        if !self.voices.contains_key(&entry.source_key) {
            let bytes: Arc<[u8]> = entry
                .audio_source()
                .read_bytes()
                .map_err(|e| DecodeError(e.to_string()))?
                .into();
            self.voices
                .insert(entry.source_key.clone(), output::Voice::new(bytes));
        }

        match self.voices.get_mut(&entry.source_key) {
            Some(voice) => voice.play(&self.output),
            None => Ok(()),
        }
    }

    pub fn pause(&mut self, key: &str) {
        if let Some(voice) = self.voices.get_mut(key) {
            voice.pause();
        }
    }

    /// Stop a sound and rewind it to the start.
    pub fn stop(&mut self, key: &str) {
        if let Some(voice) = self.voices.get_mut(key) {
            voice.stop();
        }
    }

    pub fn is_playing(&self, key: &str) -> bool {
        self.voices.get(key).map_or(false, |v| v.is_playing())
    }

    pub fn any_playing(&self) -> bool {
        self.voices.values().any(|v| v.is_playing())
    }

    /// Drop the voice of a removed sound.
    pub fn forget(&mut self, key: &str) {
        self.voices.remove(key);
    }

    /// Move a voice to a sound's new source key.
    pub fn rekey(&mut self, old_key: &str, new_key: &str) {
        if let Some(voice) = self.voices.remove(old_key) {
            self.voices.insert(new_key.to_string(), voice);
        }
    }

    pub fn clear(&mut self) {
        self.voices.clear();
    }
}

#[cfg(feature = "playback")]
mod output {
    use crate::error::DecodeError;
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
    use std::io::Cursor;
    use std::sync::Arc;

    /// Audio output stream (must be kept alive while sounds play).
    pub struct Output {
        _stream: Option<OutputStream>,
        handle: Option<OutputStreamHandle>,
    }

    impl Output {
        pub fn open() -> Self {
            match OutputStream::try_default() {
                Ok((stream, handle)) => Self {
                    _stream: Some(stream),
                    handle: Some(handle),
                },
                Err(e) => {
                    log::error!("No audio output device: {}", e);
                    Self {
                        _stream: None,
                        handle: None,
                    }
                }
            }
        }
    }

    pub struct Voice {
        bytes: Arc<[u8]>,
        sink: Option<Sink>,
    }

    impl Voice {
        pub fn new(bytes: Arc<[u8]>) -> Self {
            Self { bytes, sink: None }
        }

        pub fn play(&mut self, output: &Output) -> Result<(), DecodeError> {
            if let Some(sink) = self.sink.as_ref().filter(|s| !s.empty()) {
                sink.play();
                return Ok(());
            }

            let handle = output
                .handle
                .as_ref()
                .ok_or_else(|| DecodeError("no audio output device".to_string()))?;
            let sink = Sink::try_new(handle).map_err(|e| DecodeError(e.to_string()))?;
            let source =
                Decoder::new(Cursor::new(self.bytes.clone())).map_err(|e| DecodeError(e.to_string()))?;
            sink.append(source);
            sink.play();
            self.sink = Some(sink);
            Ok(())
        }

        pub fn pause(&mut self) {
            if let Some(sink) = &self.sink {
                sink.pause();
            }
        }

        pub fn stop(&mut self) {
            // Dropping the sink stops it; the next play starts from the top.
            self.sink = None;
        }

        pub fn is_playing(&self) -> bool {
            self.sink
                .as_ref()
                .map_or(false, |s| !s.is_paused() && !s.empty())
        }
    }
}

#[cfg(not(feature = "playback"))]
mod output {
    use crate::error::DecodeError;
    use std::sync::Arc;

    /// Stand-in output used when the crate is built without `playback`.
    pub struct Output;

    impl Output {
        pub fn open() -> Self {
            log::warn!("Built without the `playback` feature, sounds will not be audible");
            Output
        }
    }

    pub struct Voice {
        _bytes: Arc<[u8]>,
        playing: bool,
    }

    impl Voice {
        pub fn new(bytes: Arc<[u8]>) -> Self {
            Self {
                _bytes: bytes,
                playing: false,
            }
        }

        pub fn play(&mut self, _output: &Output) -> Result<(), DecodeError> {
            self.playing = true;
            Ok(())
        }

        pub fn pause(&mut self) {
            self.playing = false;
        }

        pub fn stop(&mut self) {
            self.playing = false;
        }

        pub fn is_playing(&self) -> bool {
            self.playing
        }
    }
}
