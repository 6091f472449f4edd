// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! `kp clusterstack` handlers

use super::printer::Printer;
use crate::error::Result;
use crate::factory::ClusterStackFactory;
use crate::kubernetes::ResourceClient;
use crate::types::ClusterStack;
use std::io::Write;

/// Relocate the images and create the ClusterStack unless this is a dry run
pub async fn create<W: Write>(
    name: &str,
    build_image: &str,
    run_image: &str,
    factory: &ClusterStackFactory,
    stacks: &dyn ResourceClient<ClusterStack>,
    printer: &mut Printer<W>,
) -> Result<()> {
    printer.status("Creating ClusterStack...")?;

    let mut stack = factory.make_stack(name, build_image, run_image).await?;

    if !printer.is_dry_run() {
        stack = stacks.create(&stack).await?;
    }

    printer.print_obj(&stack)?;
    printer.result(&format!("ClusterStack \"{}\" created", name))
}

pub async fn delete<W: Write>(
    name: &str,
    stacks: &dyn ResourceClient<ClusterStack>,
    printer: &mut Printer<W>,
) -> Result<()> {
    stacks.delete(name).await?;
    printer.result(&format!("ClusterStack \"{}\" deleted", name))
}
