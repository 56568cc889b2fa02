// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `rally-harness install|start|stop|up` - Cluster lifecycle commands.
//!
//! Each invocation is a separate process, so `start` and `stop` adopt the
//! installation id printed by `install`.

use rally_harness_core::{ClusterController, HarnessSettings, InstallationId};

pub fn install(settings: HarnessSettings) -> Result<(), Box<dyn std::error::Error>> {
    let mut cluster = ClusterController::new(settings.cluster)?;
    cluster.install()?;
    print_installation(&cluster);
    Ok(())
}

pub fn start(
    settings: HarnessSettings,
    installation_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut cluster = ClusterController::new(settings.cluster)?;
    cluster.attach(InstallationId::new(installation_id)?)?;
    let race_id = cluster.start()?;

    println!("✓ Started {} (race id: {})", cluster, race_id);
    Ok(())
}

pub fn stop(
    settings: HarnessSettings,
    installation_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut cluster = ClusterController::new(settings.cluster)?;
    cluster.attach(InstallationId::new(installation_id)?)?;
    cluster.stop()?;

    println!("✓ Stopped {}", cluster);
    Ok(())
}

pub fn up(settings: HarnessSettings) -> Result<(), Box<dyn std::error::Error>> {
    let mut cluster = ClusterController::new(settings.cluster)?;
    cluster.install()?;
    let race_id = cluster.start()?;

    tracing::info!(race_id = %race_id, "Cluster is up");
    print_installation(&cluster);
    println!();
    println!("To stop the cluster, run:");
    println!();
    match cluster.installation_id() {
        Some(id) => println!("  rally-harness stop --installation-id {}", id),
        None => println!("  (debug mode: nothing was installed)"),
    }
    Ok(())
}

fn print_installation(cluster: &ClusterController) {
    match cluster.installation_id() {
        Some(id) => {
            println!("✓ Installed Elasticsearch on port {}", cluster.http_port());
            println!("{}", id);
        }
        None => println!("✓ Debug mode: install skipped"),
    }
}
