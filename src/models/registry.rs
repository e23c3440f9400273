// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The set of sounds currently on the grid.
//!
//! Source keys are unique. Adding a sound takes two steps so the slow
//! decode check can run off the UI thread: [`SoundRegistry::reserve`]
//! claims the key immediately, and [`SoundRegistry::commit`] settles the
//! reservation once the playback engine has answered. A key stays claimed
//! in between, so a second add of the same file is rejected even while
//! the first is still being checked.

use crate::error::{DecodeError, RegistryError};
use crate::io::grid::SaveReport;
use crate::io::media::{check_decodes, PlaybackEngine};
use crate::models::sound::{SoundCandidate, SoundEntry, SoundView};
use std::collections::HashSet;

/// A claimed source key waiting for its decode check.
#[derive(Debug)]
pub struct Reservation {
    candidate: SoundCandidate,
    epoch: u64,
}

/// A sound read from a grid file together with its decode outcome.
#[derive(Debug, Clone)]
pub struct ProbedCandidate {
    pub index: usize,
    pub candidate: SoundCandidate,
    pub outcome: Result<(), DecodeError>,
}

/// A sound from a grid file that could not be put on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub index: usize,
    pub source_key: String,
    pub reason: String,
}

/// Per-entry outcome of loading a grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub failures: Vec<LoadFailure>,
}

impl LoadSummary {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Ordered sounds on the grid plus the unsaved-changes flag.
#[derive(Debug, Default)]
pub struct SoundRegistry {
    entries: Vec<SoundEntry>,
    reserved: HashSet<String>,
    dirty: bool,
    /// Bumped whenever the grid is replaced; older reservations are stale.
    epoch: u64,
}

impl SoundRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[SoundEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of sounds still waiting for a decode check.
    pub fn pending(&self) -> usize {
        self.reserved.len()
    }

    pub fn get(&self, key: &str) -> Option<&SoundEntry> {
        self.entries.iter().find(|e| e.source_key == key)
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.source_key == key)
    }

    fn is_taken(&self, key: &str) -> bool {
        self.reserved.contains(key) || self.position(key).is_some()
    }

    /// Snapshot for rendering. `is_playing` is asked per source key.
    pub fn views(&self, is_playing: impl Fn(&str) -> bool) -> Vec<SoundView> {
        self.entries
            .iter()
            .map(|e| SoundView {
                source_key: e.source_key.clone(),
                display_name: e.display_name.clone(),
                mime_type: e.mime_type.clone(),
                is_playing: is_playing(&e.source_key),
            })
            .collect()
    }

    /// Claim the candidate's source key before its audio is checked.
    pub fn reserve(&mut self, candidate: SoundCandidate) -> Result<Reservation, RegistryError> {
        if self.is_taken(&candidate.source_key) {
            return Err(RegistryError::Duplicate(candidate.source_key));
        }

        self.reserved.insert(candidate.source_key.clone());
        Ok(Reservation {
            candidate,
            epoch: self.epoch,
        })
    }

    /// Settle a reservation with the playback engine's answer.
    ///
    /// On success the sound is appended and its index returned. On decode
    /// failure the key is released and nothing is inserted.
    pub fn commit(
        &mut self,
        reservation: Reservation,
        outcome: Result<(), DecodeError>,
        from_load: bool,
    ) -> Result<usize, RegistryError> {
        let key = reservation.candidate.source_key.clone();

        if reservation.epoch != self.epoch {
            return Err(RegistryError::Stale(key));
        }

        self.reserved.remove(&key);

        if let Err(reason) = outcome {
            return Err(RegistryError::UnsupportedFormat { key, reason });
        }

        self.entries.push(SoundEntry::from_candidate(reservation.candidate));
        if !from_load {
            self.dirty = true;
        }

        log::info!("Added sound {}, total: {}", key, self.entries.len());
        Ok(self.entries.len() - 1)
    }

    /// Reserve, probe and commit in one go.
    pub fn add(
        &mut self,
        candidate: SoundCandidate,
        from_load: bool,
        engine: &dyn PlaybackEngine,
    ) -> Result<(), RegistryError> {
        let source = candidate.audio_source();
        let reservation = self.reserve(candidate)?;
        let outcome = check_decodes(engine, &source);
        self.commit(reservation, outcome, from_load).map(|_| ())
    }

    pub fn rename(&mut self, key: &str, new_name: impl Into<String>) -> Result<(), RegistryError> {
        let idx = self
            .position(key)
            .ok_or_else(|| RegistryError::NotFound(key.to_string()))?;

        self.entries[idx].display_name = new_name.into();
        self.dirty = true;
        Ok(())
    }

    /// Remove a sound, freeing its source key.
    pub fn remove(&mut self, key: &str) -> Result<SoundEntry, RegistryError> {
        let idx = self
            .position(key)
            .ok_or_else(|| RegistryError::NotFound(key.to_string()))?;

        let entry = self.entries.remove(idx);
        self.dirty = true;
        log::info!("Removed sound {}, total: {}", key, self.entries.len());
        Ok(entry)
    }

    /// Replace the whole grid with sounds read from a grid file.
    ///
    /// Each sound is committed on its own; one bad sound does not keep
    /// the others off the grid. `unread` carries sounds that already failed
    /// before probing (for example a missing archive member).
    pub fn replace_all(
        &mut self,
        probed: Vec<ProbedCandidate>,
        unread: Vec<LoadFailure>,
    ) -> LoadSummary {
        self.entries.clear();
        self.reserved.clear();
        self.epoch += 1;

        let mut summary = LoadSummary {
            loaded: 0,
            failures: unread,
        };

        let mut probed = probed;
        probed.sort_by_key(|p| p.index);

        for item in probed {
            let key = item.candidate.source_key.clone();
            let result = self
                .reserve(item.candidate)
                .and_then(|reservation| self.commit(reservation, item.outcome, true));

            match result {
                Ok(_) => summary.loaded += 1,
                Err(e) => {
                    log::warn!("Skipped sound {} while loading grid: {}", key, e);
                    summary.failures.push(LoadFailure {
                        index: item.index,
                        source_key: key,
                        reason: e.reason(),
                    });
                }
            }
        }

        summary.failures.sort_by_key(|f| f.index);
        self.dirty = false;
        summary
    }

    /// Apply a successful definition save: embedded sounds now live on disk.
    pub fn apply_saved(&mut self, report: &SaveReport) {
        for (old_key, new_key) in &report.materialized {
            if let Some(idx) = self.position(old_key) {
                let entry = &mut self.entries[idx];
                entry.source_key = new_key.clone();
                entry.embedded = None;
            }
        }
        self.dirty = false;
    }

    /// Forget unsaved changes after a successful share.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}
