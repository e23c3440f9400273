// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! File name utilities.
//!
//! Source keys are plain strings that may use either `/` or `\` as a
//! separator, so these helpers work on the string rather than on
//! [`std::path::Path`], which only understands the host separator.

/// Name and extension parsed from the last component of a source key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileParts {
    pub stem: String,
    pub extension: String,
}

/// Split the last path component of `key` into stem and extension.
///
/// The extension is whatever follows the last `.`; a leading dot does not
/// start an extension.
pub fn split_file_name(key: &str) -> FileParts {
    let file_name = key.rsplit(['/', '\\']).next().unwrap_or(key);

    match file_name.rfind('.') {
        Some(dot) if dot > 0 => FileParts {
            stem: file_name[..dot].to_string(),
            extension: file_name[dot + 1..].to_string(),
        },
        _ => FileParts {
            stem: file_name.to_string(),
            extension: String::new(),
        },
    }
}

/// Join a name and extension the way grid files spell sibling audio files.
pub fn file_name_with_extension(name: &str, extension: &str) -> String {
    if extension.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", name, extension)
    }
}

/// Whether `name` is a single file name that stays inside whatever
/// directory it is joined to.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', '\0'])
}
