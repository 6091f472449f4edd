// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Command-line interface

use crate::commands::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kp")]
#[command(about = "Manage kpack cluster stacks and stores", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the kubeconfig file
    #[arg(long, global = true)]
    pub kubeconfig: Option<PathBuf>,
    /// Kubeconfig context to use
    #[arg(long, global = true)]
    pub context: Option<String>,
    /// Talk to registries over plain HTTP
    #[arg(long, global = true, env = "KP_INSECURE_REGISTRY")]
    pub insecure_registry: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Cluster Stack commands
    #[command(subcommand)]
    #[command(name = "clusterstack")]
    ClusterStack(ClusterStackCommand),
    /// Cluster Store commands
    #[command(subcommand)]
    #[command(name = "clusterstore")]
    ClusterStore(ClusterStoreCommand),
}

#[derive(Subcommand, Debug)]
pub enum ClusterStackCommand {
    /// Create a cluster stack from a build and a run image
    Create {
        name: String,
        /// Build image reference or local OCI archive
        #[arg(short, long)]
        build_image: String,
        /// Run image reference or local OCI archive
        #[arg(short, long)]
        run_image: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Delete a cluster stack
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
pub enum ClusterStoreCommand {
    /// Create a cluster store
    Create {
        name: String,
        #[command(flatten)]
        buildpackages: BuildpackageArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Add buildpackages to an existing cluster store
    Add {
        name: String,
        #[command(flatten)]
        buildpackages: BuildpackageArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Create a cluster store, or add to it if it exists
    Save {
        name: String,
        #[command(flatten)]
        buildpackages: BuildpackageArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Delete a cluster store
    Delete { name: String },
}

#[derive(Args, Debug, Clone)]
pub struct BuildpackageArgs {
    /// Buildpackage image reference or local OCI archive (repeatable)
    #[arg(short = 'b', long = "buildpackage", required = true)]
    pub references: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Compute the resource without uploading images or persisting it
    #[arg(long, conflicts_with = "dry_run_with_image_upload")]
    pub dry_run: bool,
    /// Upload images but do not persist the resource
    #[arg(long)]
    pub dry_run_with_image_upload: bool,
    /// Print the resulting resource instead of status lines
    #[arg(long, value_enum)]
    pub output: Option<OutputFormat>,
}

impl OutputArgs {
    /// Whether the resource must not be persisted
    pub fn is_dry_run(&self) -> bool {
        self.dry_run || self.dry_run_with_image_upload
    }

    /// Whether images are written to the canonical repository
    pub fn uploads_images(&self) -> bool {
        !self.dry_run
    }
}
