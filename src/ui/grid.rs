// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Sound grid.
//!
//! This module lays out one tile per sound with play, pause, stop, rename
//! and delete controls, and reports what the user clicked.

use crate::models::sound::SoundView;

const TILE_WIDTH: f32 = 180.0;

/// Result of grid interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridAction {
    None,
    Play(String),
    Pause(String),
    Stop(String),
    StartRename(String),
    Rename(String, String),
    CancelRename,
    Delete(String),
}

/// A tile whose name is being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameEdit {
    pub source_key: String,
    pub text: String,
}

/// Display the grid of sounds.
pub fn show(ui: &mut egui::Ui, sounds: &[SoundView], editing: &mut Option<NameEdit>) -> GridAction {
    let mut action = GridAction::None;

    if sounds.is_empty() {
        ui.centered_and_justified(|ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(20.0);
                ui.heading(
                    egui::RichText::new("ChatterGrid")
                        .size(32.0)
                        .color(egui::Color32::from_gray(200)),
                );
                ui.add_space(20.0);
                ui.label(
                    egui::RichText::new("Drop audio files here to add them to the grid")
                        .color(egui::Color32::from_gray(180)),
                );
                ui.add_space(10.0);
                ui.label(
                    egui::RichText::new("File → Add Sounds... or File → Load Grid...")
                        .weak()
                        .color(egui::Color32::from_gray(130)),
                );
            });
        });
        return action;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing = egui::vec2(12.0, 12.0);
            for sound in sounds {
                let tile_action = tile(ui, sound, editing);
                if tile_action != GridAction::None {
                    action = tile_action;
                }
            }
        });
    });

    action
}

fn tile(ui: &mut egui::Ui, sound: &SoundView, editing: &mut Option<NameEdit>) -> GridAction {
    let mut action = GridAction::None;
    let fill = if sound.is_playing {
        egui::Color32::from_rgb(40, 70, 50)
    } else {
        ui.style().visuals.faint_bg_color
    };

    egui::Frame::group(ui.style()).fill(fill).show(ui, |ui| {
        ui.set_width(TILE_WIDTH);
        ui.vertical(|ui| {
            match editing.as_mut().filter(|e| e.source_key == sound.source_key) {
                Some(edit) => {
                    let response = ui.text_edit_singleline(&mut edit.text);
                    let submitted =
                        response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    ui.horizontal(|ui| {
                        if ui.button("✔").on_hover_text("Rename").clicked() || submitted {
                            action = GridAction::Rename(edit.source_key.clone(), edit.text.clone());
                        }
                        if ui.button("✖").on_hover_text("Cancel").clicked() {
                            action = GridAction::CancelRename;
                        }
                    });
                }
                None => {
                    ui.label(egui::RichText::new(&sound.display_name).strong());
                    ui.label(egui::RichText::new(&sound.mime_type).small().weak());
                }
            }

            ui.separator();

            ui.horizontal(|ui| {
                let key = &sound.source_key;
                if ui.add_enabled(!sound.is_playing, egui::Button::new("▶")).clicked() {
                    action = GridAction::Play(key.clone());
                }
                if ui.add_enabled(sound.is_playing, egui::Button::new("⏸")).clicked() {
                    action = GridAction::Pause(key.clone());
                }
                if ui.button("⏹").clicked() {
                    action = GridAction::Stop(key.clone());
                }
                if ui.button("✏").on_hover_text("Rename").clicked() {
                    action = GridAction::StartRename(key.clone());
                }
                if ui.button("🗑").on_hover_text("Delete").clicked() {
                    action = GridAction::Delete(key.clone());
                }
            });
        });
    });

    action
}
