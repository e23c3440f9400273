// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: sounds, the grid registry and persisted manifests.

pub mod manifest;
pub mod registry;
pub mod sound;
