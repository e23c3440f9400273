// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application settings.
//!
//! Settings are read from the YAML file named by `CHATTERGRID_CONFIG`, or
//! `chattergrid.yaml` in the working directory. A missing file means
//! defaults; a broken one is logged and replaced by defaults.

use crate::error::ConfigError;
use crate::io::media::DEFAULT_AUDIO_EXTENSIONS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the settings file location.
pub const CONFIG_ENV: &str = "CHATTERGRID_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "chattergrid.yaml";

/// Main window geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: f32,
    pub height: f32,
    pub min_width: f32,
    pub min_height: f32,
    pub maximized: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            min_width: 800.0,
            min_height: 600.0,
            maximized: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    /// Extensions offered by the "Add Sounds" picker.
    pub audio_extensions: Vec<String>,
    /// Where file dialogs start.
    pub last_directory: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            audio_extensions: DEFAULT_AUDIO_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            last_directory: None,
        }
    }
}

impl Settings {
    /// Location of the settings file.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&yaml)?)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Load settings, falling back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from_file(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                log::warn!("Ignoring settings in {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Remember the directory of a file the user just picked.
    pub fn remember_directory(&mut self, file: &Path) {
        if let Some(parent) = file.parent() {
            self.last_directory = Some(parent.to_path_buf());
        }
    }
}
