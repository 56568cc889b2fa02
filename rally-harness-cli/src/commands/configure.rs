// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `rally-harness configure|delete-config` - Rally config file lifecycle.

use rally_harness_core::{HarnessSettings, RaceController};

pub fn execute(settings: HarnessSettings) -> Result<(), Box<dyn std::error::Error>> {
    let mut rally = RaceController::new(settings.race);
    rally.configure()?;

    println!("✓ Rally config written");
    println!("  Location: {}", rally.config_location().display());
    if let Some(revision) = rally.revision() {
        println!("  Rally:    {}", revision);
    }
    Ok(())
}

pub fn delete(settings: HarnessSettings) -> Result<(), Box<dyn std::error::Error>> {
    let rally = RaceController::new(settings.race);
    rally.delete_config_file()?;

    println!("✓ Removed {}", rally.config_location().display());
    Ok(())
}
