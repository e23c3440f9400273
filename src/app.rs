// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module owns the sound registry and the player, turns UI events
//! into registry commands and grid file operations, and collects the
//! results of background work once per frame.

use crate::config::Settings;
use crate::error::{DecodeError, LoadError, RegistryError};
use crate::io::grid::{self, DialogService, FILTER_DEFINITION, FILTER_SHARE};
use crate::io::media::{check_decodes, guess_mime_type, PlaybackEngine, SymphoniaEngine};
use crate::io::playback::Player;
use crate::models::registry::{LoadFailure, LoadSummary, ProbedCandidate, Reservation, SoundRegistry};
use crate::models::sound::SoundCandidate;
use crate::ui::dialogs::RfdDialogs;
use crate::ui::grid::{GridAction, NameEdit};
use crate::ui::{grid as grid_view, toolbar};
use crate::util::paths::split_file_name;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;

/// Answer from a background decode check of a single added sound.
type ProbeResult = (Reservation, Result<(), DecodeError>);

/// Result of background grid loading.
type GridLoadResult = Result<(Vec<ProbedCandidate>, Vec<LoadFailure>), LoadError>;

const LOAD_FAILED: &str = "There was a problem loading the file.";
const SAVE_FAILED: &str = "There was a problem saving the file.";
const SAVED: &str = "Grid saved!";

/// Main application state.
pub struct ChatterGridApp {
    registry: SoundRegistry,
    player: Player,
    engine: Arc<dyn PlaybackEngine>,

    settings: Settings,
    settings_path: PathBuf,

    /// Decode checks for added sounds report here
    probe_sender: Sender<ProbeResult>,
    probe_receiver: Receiver<ProbeResult>,

    /// Receiver for background grid loading
    grid_loader: Option<Receiver<GridLoadResult>>,

    /// Loading state message
    loading_message: Option<String>,

    /// Tile whose name is being edited
    editing: Option<NameEdit>,
}

impl ChatterGridApp {
    /// Create a new ChatterGrid application instance.
    pub fn new(settings: Settings, settings_path: PathBuf) -> Self {
        let (probe_sender, probe_receiver) = channel();
        Self {
            registry: SoundRegistry::new(),
            player: Player::new(),
            engine: Arc::new(SymphoniaEngine),
            settings,
            settings_path,
            probe_sender,
            probe_receiver,
            grid_loader: None,
            loading_message: None,
            editing: None,
        }
    }

    fn dialogs(&self) -> RfdDialogs {
        RfdDialogs::new(self.settings.last_directory.clone())
    }

    fn remember_directory(&mut self, file: &Path) {
        self.settings.remember_directory(file);
        if let Err(e) = self.settings.save_to_file(&self.settings_path) {
            log::warn!("Could not save settings: {}", e);
        }
    }

    /// Claim the sound's key now and check its audio in the background.
    fn add_sound(&mut self, candidate: SoundCandidate, ctx: &egui::Context) {
        let source = candidate.audio_source();
        let reservation = match self.registry.reserve(candidate) {
            Ok(reservation) => reservation,
            Err(e) => {
                log::warn!("{}", e);
                self.dialogs().notify(&e.to_string());
                return;
            }
        };

        let engine = Arc::clone(&self.engine);
        let sender = self.probe_sender.clone();
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let outcome = check_decodes(engine.as_ref(), &source);
            let _ = sender.send((reservation, outcome));
            ctx.request_repaint();
        });
    }

    fn add_file(&mut self, path: &Path, mime_type: Option<&str>, ctx: &egui::Context) {
        let key = path.to_string_lossy().into_owned();
        let mime_type = match mime_type.filter(|m| !m.is_empty()) {
            Some(mime) => mime.to_string(),
            None => guess_mime_type(&split_file_name(&key).extension).to_string(),
        };
        self.add_sound(SoundCandidate::from_file(key, mime_type), ctx);
    }

    fn pick_sounds(&mut self, ctx: &egui::Context) {
        let paths = self.dialogs().pick_audio_files(&self.settings.audio_extensions);
        if let Some(first) = paths.first() {
            self.remember_directory(first);
        }
        for path in paths {
            self.add_file(&path, None, ctx);
        }
    }

    /// Commit every decode check that has finished.
    fn collect_probes(&mut self) {
        while let Ok((reservation, outcome)) = self.probe_receiver.try_recv() {
            match self.registry.commit(reservation, outcome, false) {
                Ok(_) => {}
                Err(RegistryError::Stale(key)) => {
                    log::info!("Dropped {} added before the grid was reloaded", key);
                }
                Err(e) => {
                    log::warn!("{}", e);
                    self.dialogs().notify(&e.to_string());
                }
            }
        }
    }

    /// Read a grid file and check its sounds in the background.
    fn load_grid(&mut self, ctx: &egui::Context) {
        let dialogs = self.dialogs();
        let Some(path) = grid::load_grid_guarded(self.registry.is_dirty(), &dialogs) else {
            return;
        };
        self.remember_directory(&path);

        let (sender, receiver) = channel();
        self.grid_loader = Some(receiver);
        self.loading_message = Some("Loading grid...".to_string());

        let engine = Arc::clone(&self.engine);
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let result = grid::read_grid_file(&path).map(|loaded| {
                log::info!(
                    "Read {:?} grid with {} sounds from {}",
                    loaded.format,
                    loaded.candidates.len() + loaded.unread.len(),
                    path.display()
                );
                grid::probe_grid(loaded, engine.as_ref())
            });
            let _ = sender.send(result);
            ctx.request_repaint();
        });
    }

    fn collect_grid_load(&mut self) {
        let Some(receiver) = &self.grid_loader else {
            return;
        };
        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(LoadError::Unreadable(
                "grid loader stopped without an answer".to_string(),
            )),
        };

        self.grid_loader = None;
        self.loading_message = None;

        match result {
            Ok((probed, unread)) => {
                self.player.clear();
                self.editing = None;
                let summary = self.registry.replace_all(probed, unread);
                log::info!(
                    "Loaded grid: {} sounds, {} skipped",
                    summary.loaded,
                    summary.failures.len()
                );
                if !summary.is_complete() {
                    self.dialogs().notify(&describe_failures(&summary));
                }
            }
            Err(e) => {
                log::error!("Failed to load grid: {}", e);
                self.dialogs().notify(LOAD_FAILED);
            }
        }
    }

    fn save_grid(&mut self) {
        let Some(path) = self
            .dialogs()
            .pick_save_path("Save Current Grid", &[FILTER_DEFINITION])
        else {
            return;
        };
        self.remember_directory(&path);

        match grid::save_grid_definition(self.registry.entries(), &path) {
            Ok(report) => {
                for (old_key, new_key) in &report.materialized {
                    self.player.rekey(old_key, new_key);
                }
                self.registry.apply_saved(&report);
                self.dialogs().notify(SAVED);
            }
            Err(e) => {
                log::error!("Failed to save grid: {}", e);
                self.dialogs().notify(SAVE_FAILED);
            }
        }
    }

    fn share_grid(&mut self) {
        let Some(path) = self
            .dialogs()
            .pick_save_path("Share Current Grid", &[FILTER_SHARE])
        else {
            return;
        };
        self.remember_directory(&path);

        match grid::share_grid_archive(self.registry.entries(), &path) {
            Ok(()) => {
                self.registry.mark_clean();
                self.dialogs().notify(SAVED);
            }
            Err(e) => {
                log::error!("Failed to share grid: {}", e);
                self.dialogs().notify(SAVE_FAILED);
            }
        }
    }

    fn handle_grid_action(&mut self, action: GridAction) {
        match action {
            GridAction::Play(key) => {
                if let Some(entry) = self.registry.get(&key) {
                    if let Err(e) = self.player.play(entry) {
                        log::error!("Could not play {}: {}", key, e);
                    }
                }
            }
            GridAction::Pause(key) => self.player.pause(&key),
            GridAction::Stop(key) => self.player.stop(&key),
            GridAction::StartRename(key) => {
                self.editing = self.registry.get(&key).map(|entry| NameEdit {
                    source_key: key.clone(),
                    text: entry.display_name.clone(),
                });
            }
            GridAction::Rename(key, name) => {
                self.editing = None;
                if let Err(e) = self.registry.rename(&key, name) {
                    log::warn!("{}", e);
                }
            }
            GridAction::CancelRename => self.editing = None,
            GridAction::Delete(key) => {
                self.player.forget(&key);
                if let Err(e) = self.registry.remove(&key) {
                    log::warn!("{}", e);
                }
            }
            GridAction::None => {}
        }
    }

    fn handle_toolbar_action(&mut self, action: toolbar::ToolbarAction, ctx: &egui::Context) {
        match action {
            toolbar::ToolbarAction::AddSounds => self.pick_sounds(ctx),
            toolbar::ToolbarAction::LoadGrid => self.load_grid(ctx),
            toolbar::ToolbarAction::SaveGrid => self.save_grid(),
            toolbar::ToolbarAction::ShareGrid => self.share_grid(),
            toolbar::ToolbarAction::None => {}
        }
    }
}

/// One message covering every sound a load had to skip.
fn describe_failures(summary: &LoadSummary) -> String {
    let mut message = format!(
        "Loaded {} sounds. These could not be loaded:",
        summary.loaded
    );
    for failure in &summary.failures {
        message.push_str(&format!("\n{}: {}", failure.source_key, failure.reason));
    }
    message
}

impl eframe::App for ChatterGridApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.collect_probes();
        self.collect_grid_load();

        // Keep the play buttons in step with sounds that finish on their own
        if self.player.any_playing() {
            ctx.request_repaint_after(std::time::Duration::from_millis(200));
        }

        // Files dropped onto the window, in drop order
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            if let Some(path) = &file.path {
                self.add_file(path, Some(&file.mime), ctx);
            }
        }

        let mut toolbar_action = toolbar::ToolbarAction::None;

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Add Sounds...").clicked() {
                        toolbar_action = toolbar::ToolbarAction::AddSounds;
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Load Grid...").clicked() {
                        toolbar_action = toolbar::ToolbarAction::LoadGrid;
                        ui.close_menu();
                    }
                    if ui.button("Save Grid...").clicked() {
                        toolbar_action = toolbar::ToolbarAction::SaveGrid;
                        ui.close_menu();
                    }
                    if ui.button("Share Grid...").clicked() {
                        toolbar_action = toolbar::ToolbarAction::ShareGrid;
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        // Toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            let action = toolbar::show(
                ui,
                self.registry.len(),
                self.registry.pending(),
                self.registry.is_dirty(),
            );
            if action != toolbar::ToolbarAction::None {
                toolbar_action = action;
            }
        });

        if self.loading_message.is_none() {
            self.handle_toolbar_action(toolbar_action, ctx);
        }

        let player = &self.player;
        let sounds = self.registry.views(|key| player.is_playing(key));

        // Sound grid (center)
        let grid_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(ref message) = self.loading_message {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new(message)
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    GridAction::None
                } else {
                    grid_view::show(ui, &sounds, &mut self.editing)
                }
            })
            .inner;

        self.handle_grid_action(grid_action);
    }
}
