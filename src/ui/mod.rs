// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the ChatterGrid application.

pub mod dialogs;
pub mod grid;
pub mod toolbar;
