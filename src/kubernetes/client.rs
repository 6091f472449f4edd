// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes client creation

use crate::error::{KpError, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Client;
use std::path::Path;
use tracing::{debug, instrument};

/// Create a client from an explicit kubeconfig file, or infer one from the
/// environment (`KUBECONFIG`, `~/.kube/config`, in-cluster).
#[instrument]
pub async fn create_client(kubeconfig: Option<&Path>, context: Option<&str>) -> Result<Client> {
    let options = KubeConfigOptions {
        context: context.map(str::to_string),
        ..Default::default()
    };

    let config = match kubeconfig {
        Some(path) => {
            debug!("Loading kubeconfig from {}", path.display());
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                KpError::Config(format!("Failed to read kubeconfig {}: {}", path.display(), e))
            })?;
            kube::Config::from_custom_kubeconfig(kubeconfig, &options).await
        }
        None if context.is_some() => kube::Config::from_kubeconfig(&options).await,
        None => {
            return Client::try_default().await.map_err(|e| {
                KpError::Config(format!("Failed to infer Kubernetes configuration: {}", e))
            })
        }
    }
    .map_err(|e| KpError::Config(format!("Failed to create Kubernetes config: {}", e)))?;

    Client::try_from(config)
        .map_err(|e| KpError::Config(format!("Failed to create Kubernetes client: {}", e)))
}
