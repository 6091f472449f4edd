// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Command execution: wires configuration, registry and cluster access into
//! the factories and dispatches to the handlers.

pub mod clusterstack;
pub mod clusterstore;
pub mod printer;

pub use printer::{OutputFormat, Printer};

use crate::cli::{Cli, ClusterStackCommand, ClusterStoreCommand, Command, OutputArgs};
use crate::config::{Config, ConfigProvider, StaticConfig};
use crate::error::Result;
use crate::factory::{ClusterStackFactory, ClusterStoreFactory};
use crate::image::{
    DiscardRelocator, ImageFetcher, ImageRelocator, LocalOrRemoteFetcher, RegistryAuth,
    RegistryClient,
};
use crate::kubernetes::{create_client, ConfigMapProvider, KubeResources};
use crate::types::{ClusterStack, ClusterStore};
use std::io::{stdout, Stdout};
use std::sync::Arc;
use tracing::debug;

/// Shared dependencies for one invocation
struct Context {
    client: kube::Client,
    settings: Box<dyn ConfigProvider>,
    registry: Arc<RegistryClient>,
    fetcher: Arc<dyn ImageFetcher>,
}

impl Context {
    async fn new(cli: &Cli, config: &Config) -> Result<Self> {
        let client = create_client(cli.kubeconfig.as_deref(), cli.context.as_deref()).await?;

        let settings: Box<dyn ConfigProvider> = match &config.canonical_repository {
            Some(repository) => {
                debug!("Using canonical repository override {}", repository);
                Box::new(StaticConfig::new(repository.clone()))
            }
            None => Box::new(ConfigMapProvider::new(client.clone(), config)),
        };

        let auth = RegistryAuth::from_config(config);
        let registry = Arc::new(if cli.insecure_registry {
            RegistryClient::insecure(auth)
        } else {
            RegistryClient::new(auth)
        });
        let fetcher: Arc<dyn ImageFetcher> = Arc::new(LocalOrRemoteFetcher::new(registry.clone()));

        Ok(Self {
            client,
            settings,
            registry,
            fetcher,
        })
    }

    /// `--dry-run` computes references without touching the registry
    fn relocator(&self, output: &OutputArgs) -> Arc<dyn ImageRelocator> {
        if output.uploads_images() {
            self.registry.clone()
        } else {
            Arc::new(DiscardRelocator)
        }
    }

    async fn stack_factory(&self, output: &OutputArgs) -> Result<ClusterStackFactory> {
        ClusterStackFactory::new(
            self.fetcher.clone(),
            self.relocator(output),
            self.settings.as_ref(),
        )
        .await
    }

    async fn store_factory(&self, output: &OutputArgs) -> Result<ClusterStoreFactory> {
        ClusterStoreFactory::new(
            self.fetcher.clone(),
            self.relocator(output),
            self.settings.as_ref(),
        )
        .await
    }
}

fn printer(output: &OutputArgs) -> Printer<Stdout> {
    Printer::new(stdout(), output.output, output.is_dry_run())
}

/// Run the parsed command line
pub async fn execute(cli: Cli, config: Config) -> Result<()> {
    let ctx = Context::new(&cli, &config).await?;

    match cli.command {
        Command::ClusterStack(command) => {
            let stacks = KubeResources::<ClusterStack>::new(ctx.client.clone());
            match command {
                ClusterStackCommand::Create {
                    name,
                    build_image,
                    run_image,
                    output,
                } => {
                    let factory = ctx.stack_factory(&output).await?;
                    clusterstack::create(
                        &name,
                        &build_image,
                        &run_image,
                        &factory,
                        &stacks,
                        &mut printer(&output),
                    )
                    .await
                }
                ClusterStackCommand::Delete { name } => {
                    clusterstack::delete(&name, &stacks, &mut printer(&OutputArgs::default()))
                        .await
                }
            }
        }
        Command::ClusterStore(command) => {
            let stores = KubeResources::<ClusterStore>::new(ctx.client.clone());
            match command {
                ClusterStoreCommand::Create {
                    name,
                    buildpackages,
                    output,
                } => {
                    let factory = ctx.store_factory(&output).await?;
                    clusterstore::create(
                        &name,
                        &buildpackages.references,
                        &factory,
                        &stores,
                        &mut printer(&output),
                    )
                    .await
                }
                ClusterStoreCommand::Add {
                    name,
                    buildpackages,
                    output,
                } => {
                    let factory = ctx.store_factory(&output).await?;
                    clusterstore::add(
                        &name,
                        &buildpackages.references,
                        &factory,
                        &stores,
                        &mut printer(&output),
                    )
                    .await
                }
                ClusterStoreCommand::Save {
                    name,
                    buildpackages,
                    output,
                } => {
                    let factory = ctx.store_factory(&output).await?;
                    clusterstore::save(
                        &name,
                        &buildpackages.references,
                        &factory,
                        &stores,
                        &mut printer(&output),
                    )
                    .await
                }
                ClusterStoreCommand::Delete { name } => {
                    clusterstore::delete(&name, &stores, &mut printer(&OutputArgs::default()))
                        .await
                }
            }
        }
    }
}
