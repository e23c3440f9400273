// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Share archive packing and unpacking.
//!
//! A share archive (`.chgs`) is a DEFLATE zip. Member `json` holds the
//! manifest; every other member is named by a sound's index and holds its
//! raw audio bytes.

use crate::error::{LoadError, SaveError};
use crate::models::manifest::ShareRecord;
use std::io::{Cursor, Read, Write};
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Name of the manifest member.
pub const MANIFEST_MEMBER: &str = "json";

const LOCAL_FILE_SIGNATURE: &[u8] = b"PK\x03\x04";
const EMPTY_ARCHIVE_SIGNATURE: &[u8] = b"PK\x05\x06";

/// Whether `bytes` start like a zip archive.
pub fn looks_like_archive(bytes: &[u8]) -> bool {
    bytes.starts_with(LOCAL_FILE_SIGNATURE) || bytes.starts_with(EMPTY_ARCHIVE_SIGNATURE)
}

/// Manifest plus the outcome of reading each sound's member, in manifest
/// order.
#[derive(Debug)]
pub struct UnpackedArchive {
    pub sounds: Vec<(ShareRecord, Result<Vec<u8>, String>)>,
}

/// Build a compressed archive. `audio[i]` is stored under `records[i].index`.
pub fn pack(records: &[ShareRecord], audio: &[Vec<u8>]) -> Result<Vec<u8>, SaveError> {
    let manifest = serde_json::to_vec(records)?;
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    zip.start_file(MANIFEST_MEMBER, options)?;
    zip.write_all(&manifest).map_err(ZipError::from)?;

    for (record, bytes) in records.iter().zip(audio) {
        zip.start_file(record.index.to_string(), options)?;
        zip.write_all(bytes).map_err(ZipError::from)?;
    }

    Ok(zip.finish()?.into_inner())
}

/// Open an archive and read its manifest and sound members.
///
/// A broken archive or manifest fails the whole read. A missing or
/// unreadable sound member only fails that sound.
pub fn unpack(bytes: &[u8]) -> Result<UnpackedArchive, LoadError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| LoadError::Unreadable(format!("not a share archive: {}", e)))?;

    let manifest = {
        let mut member = archive
            .by_name(MANIFEST_MEMBER)
            .map_err(|e| LoadError::Unreadable(format!("no manifest in archive: {}", e)))?;
        let mut text = String::new();
        member
            .read_to_string(&mut text)
            .map_err(|e| LoadError::Unreadable(format!("manifest is not UTF-8 text: {}", e)))?;
        text
    };

    let records: Vec<ShareRecord> = serde_json::from_str(&manifest)
        .map_err(|e| LoadError::Unreadable(format!("manifest is not a sound list: {}", e)))?;

    let sounds = records
        .into_iter()
        .map(|record| {
            let audio = read_member(&mut archive, &record.index.to_string());
            (record, audio)
        })
        .collect();

    Ok(UnpackedArchive { sounds })
}

fn read_member(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<Vec<u8>, String> {
    let mut member = archive
        .by_name(name)
        .map_err(|e| format!("archive member {} is missing: {}", name, e))?;
    let mut bytes = Vec::new();
    member
        .read_to_end(&mut bytes)
        .map_err(|e| format!("archive member {} is unreadable: {}", name, e))?;
    Ok(bytes)
}
