// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `rally-harness list-tracks` - List tracks and their challenges.

use rally_harness_core::{HarnessSettings, RaceController};

pub fn execute(settings: HarnessSettings) -> Result<(), Box<dyn std::error::Error>> {
    let rally = RaceController::new(settings.race);
    let tracks = rally.all_tracks_and_challenges()?;

    if tracks.is_empty() {
        println!("No tracks found.");
        return Ok(());
    }

    for track in &tracks {
        println!("{:<24} {}", track.name, track.challenges.join(", "));
    }
    println!();
    println!("Total: {} track(s)", tracks.len());

    Ok(())
}
