// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for audio and grid files.

pub mod archive;
pub mod grid;
pub mod media;
pub mod playback;
pub mod serialization;
