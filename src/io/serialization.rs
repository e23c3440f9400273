// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Definition file serialization and deserialization.
//!
//! A definition file (`.chgd`) is a JSON array of sounds that reference
//! audio files on disk by path.

use crate::error::{LoadError, SaveError};
use crate::models::manifest::DefinitionRecord;
use std::path::Path;

/// Encode definition records as JSON.
pub fn encode_definition(records: &[DefinitionRecord]) -> Result<Vec<u8>, SaveError> {
    Ok(serde_json::to_vec(records)?)
}

/// Decode definition records from UTF-8 JSON.
pub fn decode_definition(bytes: &[u8]) -> Result<Vec<DefinitionRecord>, LoadError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| LoadError::Unreadable(format!("definition is not UTF-8: {}", e)))?;
    serde_json::from_str(text)
        .map_err(|e| LoadError::Unreadable(format!("definition is not a sound list: {}", e)))
}

/// Export definition records to a file.
pub fn export_definition(records: &[DefinitionRecord], path: &Path) -> Result<(), SaveError> {
    let json = encode_definition(records)?;
    std::fs::write(path, json).map_err(|e| SaveError::io(path, e))
}
