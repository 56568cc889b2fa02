// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI command modules.

pub mod cluster;
pub mod configure;
pub mod list_tracks;
pub mod race;
