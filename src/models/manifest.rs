// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Manifest records written to grid files.
//!
//! A definition file is a JSON array of [`DefinitionRecord`]; a share
//! archive carries a JSON array of [`ShareRecord`] in its `json` member.

use serde::{Deserialize, Serialize};

/// One sound in a definition file, referencing audio on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionRecord {
    pub file: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub name: String,
}

/// One sound in a share archive. `index` names the archive member that
/// holds the audio bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRecord {
    pub file: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub name: String,
    pub index: usize,
}
