// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with grid file operations and a status line.

/// Result of toolbar interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    AddSounds,
    LoadGrid,
    SaveGrid,
    ShareGrid,
}

/// Display the toolbar.
pub fn show(ui: &mut egui::Ui, sound_count: usize, pending: usize, dirty: bool) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.button("➕ Add Sounds").clicked() {
            action = ToolbarAction::AddSounds;
        }

        ui.separator();

        if ui.button("📂 Load Grid").clicked() {
            action = ToolbarAction::LoadGrid;
        }
        if ui.button("💾 Save Grid").clicked() {
            action = ToolbarAction::SaveGrid;
        }
        if ui.button("📦 Share Grid").clicked() {
            action = ToolbarAction::ShareGrid;
        }

        ui.separator();

        let mut status = format!("{} sounds", sound_count);
        if pending > 0 {
            status.push_str(&format!(", checking {}", pending));
        }
        if dirty {
            status.push_str(" (unsaved changes)");
        }
        ui.label(egui::RichText::new(status).italics().weak());
    });

    action
}
