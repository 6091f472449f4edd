// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! `kp clusterstore` handlers

use super::printer::Printer;
use crate::error::{KpError, Result};
use crate::factory::ClusterStoreFactory;
use crate::kubernetes::ResourceClient;
use crate::types::ClusterStore;
use kube::ResourceExt;
use std::io::Write;
use tracing::debug;

pub async fn create<W: Write>(
    name: &str,
    buildpackages: &[String],
    factory: &ClusterStoreFactory,
    stores: &dyn ResourceClient<ClusterStore>,
    printer: &mut Printer<W>,
) -> Result<()> {
    printer.status("Creating ClusterStore...")?;

    let mut store = factory.make_store(name, buildpackages).await?;

    if !printer.is_dry_run() {
        store = stores.create(&store).await?;
    }

    printer.print_obj(&store)?;
    printer.result(&format!("ClusterStore \"{}\" created", name))
}

/// Merge buildpackages into an existing ClusterStore
pub async fn add<W: Write>(
    name: &str,
    buildpackages: &[String],
    factory: &ClusterStoreFactory,
    stores: &dyn ResourceClient<ClusterStore>,
    printer: &mut Printer<W>,
) -> Result<()> {
    let store = stores.get(name).await?;
    update(store, buildpackages, factory, stores, printer).await
}

/// Create the ClusterStore, or merge into it when it already exists
pub async fn save<W: Write>(
    name: &str,
    buildpackages: &[String],
    factory: &ClusterStoreFactory,
    stores: &dyn ResourceClient<ClusterStore>,
    printer: &mut Printer<W>,
) -> Result<()> {
    match stores.get(name).await {
        Ok(store) => update(store, buildpackages, factory, stores, printer).await,
        Err(KpError::NotFound { .. }) => {
            debug!("ClusterStore {} not found, creating it", name);
            create(name, buildpackages, factory, stores, printer).await
        }
        Err(e) => Err(e),
    }
}

pub async fn delete<W: Write>(
    name: &str,
    stores: &dyn ResourceClient<ClusterStore>,
    printer: &mut Printer<W>,
) -> Result<()> {
    stores.delete(name).await?;
    printer.result(&format!("ClusterStore \"{}\" deleted", name))
}

async fn update<W: Write>(
    store: ClusterStore,
    buildpackages: &[String],
    factory: &ClusterStoreFactory,
    stores: &dyn ResourceClient<ClusterStore>,
    printer: &mut Printer<W>,
) -> Result<()> {
    printer.status("Adding to ClusterStore...")?;

    let update = factory.add_to_store(&store, buildpackages).await?;

    for added in &update.added {
        printer.status(&format!(
            "\tAdded Buildpackage {}@{}",
            added.metadata.id, added.metadata.version
        ))?;
    }
    for skipped in &update.skipped {
        printer.status(&format!("\tBuildpackage {} already exists in the store", skipped))?;
    }

    let changed = update.changed();
    let mut result = update.store;
    if changed && !printer.is_dry_run() {
        result = stores.update(&result).await?;
    }

    printer.print_obj(&result)?;
    printer.change_result(changed, &format!("ClusterStore \"{}\" updated", result.name_any()))
}
