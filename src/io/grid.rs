// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Loading, saving and sharing whole grids.
//!
//! Two file formats are supported. A definition file (`.chgd`) lists
//! sounds by path; a share archive (`.chgs`) embeds the audio so the grid
//! can be opened on another machine. The format of a file being loaded is
//! decided from its leading bytes, not from its extension.

use crate::error::{DecodeError, LoadError, SaveError};
use crate::io::archive;
use crate::io::media::{check_decodes, PlaybackEngine};
use crate::io::serialization;
use crate::models::manifest::{DefinitionRecord, ShareRecord};
use crate::models::registry::{LoadFailure, ProbedCandidate};
use crate::models::sound::{AudioSource, EmbeddedAudio, SoundCandidate, SoundEntry};
use crate::util::paths::{file_name_with_extension, is_plain_file_name};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A named set of extensions for file dialogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFilter {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
}

pub const FILTER_ALL_GRIDS: FileFilter = FileFilter {
    name: "All ChatterGrid files",
    extensions: &["chgd", "chgs"],
};

pub const FILTER_DEFINITION: FileFilter = FileFilter {
    name: "ChatterGrid grid definition",
    extensions: &["chgd"],
};

pub const FILTER_SHARE: FileFilter = FileFilter {
    name: "ChatterGrid sounds",
    extensions: &["chgs"],
};

/// The prompts and pickers a grid flow needs from the host.
pub trait DialogService {
    /// Ask whether unsaved changes may be thrown away.
    fn confirm_discard(&self) -> bool;
    fn pick_open_path(&self, title: &str, filters: &[FileFilter]) -> Option<PathBuf>;
    fn pick_save_path(&self, title: &str, filters: &[FileFilter]) -> Option<PathBuf>;
    fn pick_audio_files(&self, extensions: &[String]) -> Vec<PathBuf>;
    fn notify(&self, message: &str);
}

/// Which format a grid file is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridFormat {
    Share,
    Definition,
}

impl GridFormat {
    pub fn detect(bytes: &[u8]) -> Self {
        if archive::looks_like_archive(bytes) {
            GridFormat::Share
        } else {
            GridFormat::Definition
        }
    }
}

/// Sounds read from a grid file, before their audio has been checked.
#[derive(Debug)]
pub struct LoadedGrid {
    pub format: GridFormat,
    pub candidates: Vec<(usize, SoundCandidate)>,
    /// Sounds whose data could not even be read.
    pub unread: Vec<LoadFailure>,
}

/// What a definition save did to the sounds it wrote out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// `(old source key, new source key)` for each embedded sound written
    /// next to the definition file.
    pub materialized: Vec<(String, String)>,
}

/// Interpret raw grid file bytes.
pub fn load_grid(bytes: &[u8]) -> Result<LoadedGrid, LoadError> {
    let format = GridFormat::detect(bytes);
    let mut loaded = LoadedGrid {
        format,
        candidates: Vec::new(),
        unread: Vec::new(),
    };

    match format {
        GridFormat::Share => {
            let unpacked = archive::unpack(bytes)?;
            let mut keys = HashSet::new();
            for (position, (record, audio)) in unpacked.sounds.into_iter().enumerate() {
                match audio {
                    Ok(bytes) => {
                        let key = unique_embedded_key(&mut keys, &record.file, position);
                        let candidate = SoundCandidate::from_file(key, record.mime_type)
                            .with_name(record.name)
                            .with_embedded(EmbeddedAudio::from_bytes(&bytes));
                        loaded.candidates.push((position, candidate));
                    }
                    Err(reason) => {
                        log::warn!("Could not read sound {} from archive: {}", record.file, reason);
                        loaded.unread.push(LoadFailure {
                            index: position,
                            source_key: record.file,
                            reason,
                        });
                    }
                }
            }
        }
        GridFormat::Definition => {
            let records = serialization::decode_definition(bytes)?;
            loaded.candidates = records
                .into_iter()
                .map(|r| SoundCandidate::from_file(r.file, r.mime_type).with_name(r.name))
                .enumerate()
                .collect();
        }
    }

    Ok(loaded)
}

/// Source key for an embedded sound. Archive paths are only names, so two
/// sounds called the same are told apart by their position:
/// `/a.mp3` then `/1/a.mp3`.
fn unique_embedded_key(keys: &mut HashSet<String>, file: &str, position: usize) -> String {
    let mut key = file.to_string();
    let mut prefix = position;
    while !keys.insert(key.clone()) {
        key = format!("/{}/{}", prefix, file.trim_start_matches(['/', '\\']));
        prefix += 1;
    }
    key
}

/// Read and interpret a grid file from disk.
pub fn read_grid_file(path: &Path) -> Result<LoadedGrid, LoadError> {
    let bytes = std::fs::read(path)?;
    load_grid(&bytes)
}

/// Check every loaded sound with the playback engine.
pub fn probe_grid(
    loaded: LoadedGrid,
    engine: &dyn PlaybackEngine,
) -> (Vec<ProbedCandidate>, Vec<LoadFailure>) {
    let probed = loaded
        .candidates
        .into_iter()
        .map(|(index, candidate)| {
            let outcome: Result<(), DecodeError> = check_decodes(engine, &candidate.audio_source());
            ProbedCandidate {
                index,
                candidate,
                outcome,
            }
        })
        .collect();

    (probed, loaded.unread)
}

/// Ask to discard unsaved changes if needed, then pick a grid file.
///
/// Returns `None` when the user backs out at either step.
pub fn load_grid_guarded(is_dirty: bool, dialogs: &dyn DialogService) -> Option<PathBuf> {
    if is_dirty && !dialogs.confirm_discard() {
        log::info!("Load cancelled, unsaved changes kept");
        return None;
    }

    dialogs.pick_open_path(
        "Load Grid",
        &[FILTER_ALL_GRIDS, FILTER_DEFINITION, FILTER_SHARE],
    )
}

/// Archive-relative path a sound is stored under in a share archive.
pub fn share_path(entry: &SoundEntry) -> String {
    format!(
        "/{}",
        file_name_with_extension(&entry.display_name, &entry.extension)
    )
}

/// Write a definition file.
///
/// Embedded sounds are first written next to `target` as
/// `<name>.<extension>`; the returned report lists their new keys. Sibling
/// files already written are left in place if a later write fails.
pub fn save_grid_definition(entries: &[SoundEntry], target: &Path) -> Result<SaveReport, SaveError> {
    let dir = target.parent().unwrap_or_else(|| Path::new(""));
    let mut report = SaveReport::default();
    let mut records = Vec::with_capacity(entries.len());

    let planned = plan_siblings(entries, dir)?;

    for (entry, sibling) in entries.iter().zip(planned) {
        let file = match (&entry.embedded, sibling) {
            (Some(audio), Some(sibling)) => {
                let bytes = audio
                    .to_bytes()
                    .map_err(|_| SaveError::CorruptEmbedded(entry.source_key.clone()))?;
                std::fs::write(&sibling, bytes).map_err(|e| SaveError::io(&sibling, e))?;

                let key = sibling.to_string_lossy().into_owned();
                report.materialized.push((entry.source_key.clone(), key.clone()));
                key
            }
            _ => entry.source_key.clone(),
        };

        records.push(DefinitionRecord {
            file,
            mime_type: entry.mime_type.clone(),
            name: entry.display_name.clone(),
        });
    }

    serialization::export_definition(&records, target)?;
    log::info!(
        "Saved grid definition with {} sounds to {}",
        records.len(),
        target.display()
    );
    Ok(report)
}

/// Work out where each embedded sound will be written, refusing to let two
/// sounds share a file, to overwrite a file another sound points at, or to
/// leave the target directory.
fn plan_siblings(entries: &[SoundEntry], dir: &Path) -> Result<Vec<Option<PathBuf>>, SaveError> {
    let referenced: HashSet<&str> = entries
        .iter()
        .filter(|e| e.embedded.is_none())
        .map(|e| e.source_key.as_str())
        .collect();
    let mut claimed = HashSet::new();

    entries
        .iter()
        .map(|entry| {
            if entry.embedded.is_none() {
                return Ok(None);
            }
            let file_name = file_name_with_extension(&entry.display_name, &entry.extension);
            if !is_plain_file_name(&file_name) {
                return Err(SaveError::UnsafeName(file_name));
            }
            let sibling = dir.join(file_name);
            let key = sibling.to_string_lossy().into_owned();
            if referenced.contains(key.as_str()) || !claimed.insert(key) {
                return Err(SaveError::NameCollision(sibling));
            }
            Ok(Some(sibling))
        })
        .collect()
}

/// Write a self-contained share archive.
pub fn share_grid_archive(entries: &[SoundEntry], target: &Path) -> Result<(), SaveError> {
    let mut records = Vec::with_capacity(entries.len());
    let mut audio = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let bytes = match entry.audio_source() {
            AudioSource::File(path) => std::fs::read(&path).map_err(|e| SaveError::io(path, e))?,
            AudioSource::Embedded(data) => data
                .to_bytes()
                .map_err(|_| SaveError::CorruptEmbedded(entry.source_key.clone()))?,
        };

        records.push(ShareRecord {
            file: share_path(entry),
            mime_type: entry.mime_type.clone(),
            name: entry.display_name.clone(),
            index,
        });
        audio.push(bytes);
    }

    let packed = archive::pack(&records, &audio)?;
    std::fs::write(target, packed).map_err(|e| SaveError::io(target, e))?;
    log::info!(
        "Shared grid with {} sounds to {}",
        records.len(),
        target.display()
    );
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedDialogs;
    use super::*;
    use crate::io::media::testing::ScriptedEngine;
    use crate::models::registry::SoundRegistry;
    use tempfile::TempDir;

    fn write_audio(dir: &TempDir, name: &str, bytes: &[u8]) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn load_into(registry: &mut SoundRegistry, bytes: &[u8]) -> crate::models::registry::LoadSummary {
        let loaded = load_grid(bytes).unwrap();
        let (probed, unread) = probe_grid(loaded, &ScriptedEngine);
        registry.replace_all(probed, unread)
    }

    #[test]
    fn test_share_example_layout() {
        let dir = TempDir::new().unwrap();
        let source = write_audio(&dir, "a.mp3", b"ID3 alarm");
        let mut registry = SoundRegistry::new();
        registry
            .add(
                SoundCandidate::from_file(source, "audio/mpeg").with_name("Alarm"),
                false,
                &ScriptedEngine,
            )
            .unwrap();

        let target = dir.path().join("out.chgs");
        share_grid_archive(registry.entries(), &target).unwrap();

        let bytes = std::fs::read(&target).unwrap();
        let mut zip = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let mut manifest = String::new();
        std::io::Read::read_to_string(&mut zip.by_name("json").unwrap(), &mut manifest).unwrap();
        assert_eq!(
            manifest,
            r#"[{"file":"/Alarm.mp3","type":"audio/mpeg","name":"Alarm","index":0}]"#
        );
        let mut audio = Vec::new();
        std::io::Read::read_to_end(&mut zip.by_name("0").unwrap(), &mut audio).unwrap();
        assert_eq!(audio, b"ID3 alarm");
    }

    #[test]
    fn test_share_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let a = write_audio(&dir, "a.mp3", b"first sound");
        let b = write_audio(&dir, "b.ogg", b"second sound");
        let mut registry = SoundRegistry::new();
        registry
            .add(SoundCandidate::from_file(a, "audio/mpeg"), false, &ScriptedEngine)
            .unwrap();
        registry
            .add(
                SoundCandidate::from_file(b, "audio/ogg").with_name("Horn"),
                false,
                &ScriptedEngine,
            )
            .unwrap();

        let target = dir.path().join("grid.chgs");
        share_grid_archive(registry.entries(), &target).unwrap();
        let original: Vec<SoundEntry> = registry.entries().to_vec();

        let mut reloaded = SoundRegistry::new();
        let summary = load_into(&mut reloaded, &std::fs::read(&target).unwrap());

        assert!(summary.is_complete());
        assert_eq!(reloaded.len(), 2);
        for (before, after) in original.iter().zip(reloaded.entries()) {
            assert_eq!(before.display_name, after.display_name);
            assert_eq!(before.mime_type, after.mime_type);
            assert_eq!(before.extension, after.extension);
            assert_eq!(
                before.audio_source().read_bytes().unwrap(),
                after.audio_source().read_bytes().unwrap()
            );
        }
        assert_eq!(reloaded.entries()[1].source_key, "/Horn.ogg");
        assert!(reloaded.entries()[1].embedded.is_some());
    }

    #[test]
    fn test_same_named_sounds_survive_share_and_reload() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("x")).unwrap();
        std::fs::create_dir(dir.path().join("y")).unwrap();
        let a = write_audio(&dir, "x/a.mp3", b"from x");
        let b = write_audio(&dir, "y/a.mp3", b"from y");
        let mut registry = SoundRegistry::new();
        for key in [a, b] {
            registry
                .add(SoundCandidate::from_file(key, "audio/mpeg"), false, &ScriptedEngine)
                .unwrap();
        }

        let target = dir.path().join("grid.chgs");
        share_grid_archive(registry.entries(), &target).unwrap();
        let bytes = std::fs::read(&target).unwrap();

        let loaded = load_grid(&bytes).unwrap();
        assert_eq!(loaded.format, GridFormat::Share);
        let keys: Vec<&str> = loaded
            .candidates
            .iter()
            .map(|(_, c)| c.source_key.as_str())
            .collect();
        assert_eq!(keys, vec!["/a.mp3", "/1/a.mp3"]);

        let mut reloaded = SoundRegistry::new();
        let summary = load_into(&mut reloaded, &bytes);
        assert!(summary.is_complete());
        assert_eq!(reloaded.len(), 2);
        for (before, after) in registry.entries().iter().zip(reloaded.entries()) {
            assert_eq!(before.display_name, after.display_name);
            assert_eq!(before.extension, after.extension);
            assert_eq!(
                before.audio_source().read_bytes().unwrap(),
                after.audio_source().read_bytes().unwrap()
            );
        }

        // The archive text itself is untouched.
        let mut zip = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let mut manifest = String::new();
        std::io::Read::read_to_string(&mut zip.by_name("json").unwrap(), &mut manifest).unwrap();
        assert_eq!(manifest.matches(r#""file":"/a.mp3""#).count(), 2);
    }

    #[test]
    fn test_missing_member_loads_the_rest() {
        let records = vec![
            ShareRecord {
                file: "/a.mp3".into(),
                mime_type: "audio/mpeg".into(),
                name: "a".into(),
                index: 0,
            },
            ShareRecord {
                file: "/b.mp3".into(),
                mime_type: "audio/mpeg".into(),
                name: "b".into(),
                index: 1,
            },
        ];
        let bytes = archive::pack(&records, &[b"only one".to_vec()]).unwrap();

        let mut registry = SoundRegistry::new();
        let summary = load_into(&mut registry, &bytes);

        assert_eq!(summary.loaded, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].index, 1);
        assert_eq!(summary.failures[0].source_key, "/b.mp3");
        assert_eq!(registry.entries()[0].source_key, "/a.mp3");
    }

    #[test]
    fn test_undecodable_archive_sound_is_skipped() {
        let records = vec![
            ShareRecord {
                file: "/bad.mp3".into(),
                mime_type: "audio/mpeg".into(),
                name: "bad".into(),
                index: 0,
            },
            ShareRecord {
                file: "/good.mp3".into(),
                mime_type: "audio/mpeg".into(),
                name: "good".into(),
                index: 1,
            },
        ];
        let bytes = archive::pack(&records, &[b"NOPE".to_vec(), b"fine".to_vec()]).unwrap();

        let mut registry = SoundRegistry::new();
        let summary = load_into(&mut registry, &bytes);

        assert_eq!(summary.loaded, 1);
        assert_eq!(summary.failures[0].source_key, "/bad.mp3");
        assert_eq!(registry.entries()[0].display_name, "good");
    }

    #[test]
    fn test_manifest_order_wins_over_member_order() {
        let records = vec![
            ShareRecord {
                file: "/second.mp3".into(),
                mime_type: "audio/mpeg".into(),
                name: "second".into(),
                index: 1,
            },
            ShareRecord {
                file: "/first.mp3".into(),
                mime_type: "audio/mpeg".into(),
                name: "first".into(),
                index: 0,
            },
        ];
        // pack writes member "1" before member "0" here.
        let bytes = archive::pack(&records, &[b"two".to_vec(), b"one".to_vec()]).unwrap();

        let mut registry = SoundRegistry::new();
        load_into(&mut registry, &bytes);

        let names: Vec<&str> = registry.entries().iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, vec!["second", "first"]);
        assert_eq!(
            registry.entries()[0].audio_source().read_bytes().unwrap(),
            b"two"
        );
    }

    #[test]
    fn test_garbage_is_unreadable() {
        assert!(matches!(load_grid(b"not json"), Err(LoadError::Unreadable(_))));
        assert!(matches!(load_grid(b"PK\x03\x04junk"), Err(LoadError::Unreadable(_))));
        assert_eq!(GridFormat::detect(b"PK\x03\x04junk"), GridFormat::Share);
        assert_eq!(GridFormat::detect(b"[]"), GridFormat::Definition);
    }

    #[test]
    fn test_save_definition_then_reload_from_disk() {
        let dir = TempDir::new().unwrap();
        let a = write_audio(&dir, "a.mp3", b"first");
        let mut registry = SoundRegistry::new();
        registry
            .add(
                SoundCandidate::from_file(a.clone(), "audio/mpeg").with_name("Alarm"),
                false,
                &ScriptedEngine,
            )
            .unwrap();
        registry
            .add(
                SoundCandidate::from_file("/Horn.ogg", "audio/ogg")
                    .with_name("Horn")
                    .with_embedded(EmbeddedAudio::from_bytes(b"embedded horn")),
                false,
                &ScriptedEngine,
            )
            .unwrap();

        let target = dir.path().join("grid.chgd");
        let report = save_grid_definition(registry.entries(), &target).unwrap();
        registry.apply_saved(&report);
        assert!(!registry.is_dirty());

        let sibling = dir.path().join("Horn.ogg");
        assert_eq!(std::fs::read(&sibling).unwrap(), b"embedded horn");
        assert_eq!(registry.entries()[0].source_key, a);
        assert_eq!(
            registry.entries()[1].source_key,
            sibling.to_string_lossy().into_owned()
        );

        let mut reloaded = SoundRegistry::new();
        let summary = load_into(&mut reloaded, &std::fs::read(&target).unwrap());
        assert!(summary.is_complete());
        for (before, after) in registry.entries().iter().zip(reloaded.entries()) {
            assert_eq!(before.display_name, after.display_name);
            assert_eq!(before.mime_type, after.mime_type);
            assert_eq!(before.extension, after.extension);
            assert!(after.embedded.is_none());
        }
    }

    #[test]
    fn test_save_refuses_colliding_siblings() {
        let dir = TempDir::new().unwrap();
        let entries: Vec<SoundEntry> = ["/x/Horn.ogg", "/y/Horn.ogg"]
            .iter()
            .map(|key| {
                SoundEntry::from_candidate(
                    SoundCandidate::from_file(*key, "audio/ogg")
                        .with_embedded(EmbeddedAudio::from_bytes(b"horn")),
                )
            })
            .collect();

        let target = dir.path().join("grid.chgd");
        assert!(matches!(
            save_grid_definition(&entries, &target),
            Err(SaveError::NameCollision(_))
        ));
        assert!(!target.exists());
    }

    #[test]
    fn test_save_refuses_names_that_leave_the_directory() {
        let dir = TempDir::new().unwrap();
        let grids = dir.path().join("grids");
        std::fs::create_dir(&grids).unwrap();
        let target = grids.join("g.chgd");

        for name in ["../escaped", "/abs/escaped", "sub\\escaped"] {
            let entries = vec![SoundEntry::from_candidate(
                SoundCandidate::from_file("/escaped.mp3", "audio/mpeg")
                    .with_name(name)
                    .with_embedded(EmbeddedAudio::from_bytes(b"ID3")),
            )];
            assert!(matches!(
                save_grid_definition(&entries, &target),
                Err(SaveError::UnsafeName(_))
            ));
        }

        assert!(!dir.path().join("escaped.mp3").exists());
        assert!(!target.exists());
    }

    #[test]
    fn test_share_fails_when_source_is_gone() {
        let dir = TempDir::new().unwrap();
        let entries = vec![SoundEntry::from_candidate(SoundCandidate::from_file(
            dir.path().join("gone.mp3").to_string_lossy().into_owned(),
            "audio/mpeg",
        ))];

        let target = dir.path().join("grid.chgs");
        assert!(matches!(
            share_grid_archive(&entries, &target),
            Err(SaveError::Io { .. })
        ));
        assert!(!target.exists());
    }

    #[test]
    fn test_guarded_load_declined_keeps_grid() {
        let mut registry = SoundRegistry::new();
        registry
            .add(SoundCandidate::from_file("/tmp/a.mp3", "audio/mpeg"), false, &ScriptedEngine)
            .unwrap();
        let dialogs = ScriptedDialogs {
            discard: false,
            open_path: Some(PathBuf::from("/tmp/grid.chgd")),
            ..Default::default()
        };

        assert_eq!(load_grid_guarded(registry.is_dirty(), &dialogs), None);
        assert_eq!(dialogs.confirm_calls.get(), 1);
        assert_eq!(dialogs.open_calls.get(), 0);
        assert_eq!(registry.len(), 1);
        assert!(registry.is_dirty());
    }

    #[test]
    fn test_guarded_load_skips_prompt_when_clean() {
        let dialogs = ScriptedDialogs {
            open_path: Some(PathBuf::from("/tmp/grid.chgs")),
            ..Default::default()
        };

        assert_eq!(
            load_grid_guarded(false, &dialogs),
            Some(PathBuf::from("/tmp/grid.chgs"))
        );
        assert_eq!(dialogs.confirm_calls.get(), 0);
    }

    #[test]
    fn test_guarded_load_cancelled_picker() {
        let dialogs = ScriptedDialogs {
            discard: true,
            open_path: None,
            ..Default::default()
        };

        assert_eq!(load_grid_guarded(true, &dialogs), None);
        assert_eq!(dialogs.open_calls.get(), 1);
    }
}
