// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster settings read from the kp ConfigMap

use crate::config::{Config, ConfigProvider};
use crate::constants::settings;
use crate::error::{KpError, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{Api, Client};
use tracing::{info, instrument};

/// Reads `canonical.repository` from the `kp-config` ConfigMap.
pub struct ConfigMapProvider {
    client: Client,
    namespace: String,
    name: String,
}

impl ConfigMapProvider {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            namespace: config.config_namespace.clone(),
            name: config.config_map.clone(),
        }
    }
}

#[async_trait]
impl ConfigProvider for ConfigMapProvider {
    #[instrument(skip(self), fields(config_map = %format!("{}/{}", self.namespace, self.name)))]
    async fn canonical_repository(&self) -> Result<String> {
        let config_maps: Api<ConfigMap> = Api::namespaced(self.client.clone(), &self.namespace);

        let config_map = match config_maps.get(&self.name).await {
            Ok(cm) => cm,
            Err(kube::Error::Api(err)) if err.code == 404 => {
                return Err(KpError::Config(format!(
                    "ConfigMap '{}/{}' not found, has kp been configured for this cluster?",
                    self.namespace, self.name
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let Some(repository) = config_map
            .data
            .as_ref()
            .and_then(|d| d.get(settings::CANONICAL_REPOSITORY_KEY))
            .filter(|r| !r.trim().is_empty())
        else {
            return Err(KpError::Config(format!(
                "ConfigMap '{}/{}' does not contain '{}' key",
                self.namespace,
                self.name,
                settings::CANONICAL_REPOSITORY_KEY
            )));
        };

        info!("Canonical repository is {}", repository);
        Ok(repository.clone())
    }
}
