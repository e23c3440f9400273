// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Native dialogs backed by rfd.

use crate::io::grid::{DialogService, FileFilter};
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use std::path::PathBuf;

const DISCARD_LABEL: &str = "Yes, discard";
const CANCEL_LABEL: &str = "No, cancel";

/// Native open/save pickers and message boxes.
#[derive(Debug, Default, Clone)]
pub struct RfdDialogs {
    /// Directory the pickers open in.
    pub start_dir: Option<PathBuf>,
}

impl RfdDialogs {
    pub fn new(start_dir: Option<PathBuf>) -> Self {
        Self { start_dir }
    }

    fn file_dialog(&self, title: &str) -> FileDialog {
        let dialog = FileDialog::new().set_title(title);
        match &self.start_dir {
            Some(dir) => dialog.set_directory(dir),
            None => dialog,
        }
    }
}

impl DialogService for RfdDialogs {
    fn confirm_discard(&self) -> bool {
        let result = MessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title("Load Grid")
            .set_description(
                "You have unsaved changes to the current grid.  Discard the changes?",
            )
            .set_buttons(MessageButtons::OkCancelCustom(
                DISCARD_LABEL.to_string(),
                CANCEL_LABEL.to_string(),
            ))
            .show();

        match result {
            MessageDialogResult::Custom(label) => label == DISCARD_LABEL,
            MessageDialogResult::Ok | MessageDialogResult::Yes => true,
            _ => false,
        }
    }

    fn pick_open_path(&self, title: &str, filters: &[FileFilter]) -> Option<PathBuf> {
        filters
            .iter()
            .fold(self.file_dialog(title), |d, f| d.add_filter(f.name, f.extensions))
            .pick_file()
    }

    fn pick_save_path(&self, title: &str, filters: &[FileFilter]) -> Option<PathBuf> {
        filters
            .iter()
            .fold(self.file_dialog(title), |d, f| d.add_filter(f.name, f.extensions))
            .save_file()
    }

    fn pick_audio_files(&self, extensions: &[String]) -> Vec<PathBuf> {
        self.file_dialog("Add Sounds")
            .add_filter("Audio", extensions)
            .pick_files()
            .unwrap_or_default()
    }

    fn notify(&self, message: &str) {
        MessageDialog::new()
            .set_level(MessageLevel::Info)
            .set_title("ChatterGrid")
            .set_description(message)
            .set_buttons(MessageButtons::Ok)
            .show();
    }
}
