// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::settings;
use crate::error::{KpError, Result};
use crate::image::ImageReference;
use anyhow::{bail, Context};
use async_trait::async_trait;
use std::env;

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace holding the kp ConfigMap
    pub config_namespace: String,
    /// Name of the kp ConfigMap
    pub config_map: String,
    /// Overrides the canonical repository stored in the cluster
    pub canonical_repository: Option<String>,
    pub registry_username: Option<String>,
    pub registry_password: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_namespace: settings::NAMESPACE.to_string(),
            config_map: settings::CONFIG_MAP.to_string(),
            canonical_repository: None,
            registry_username: None,
            registry_password: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let config_namespace =
            env::var("KP_CONFIG_NAMESPACE").unwrap_or_else(|_| settings::NAMESPACE.to_string());
        let config_map =
            env::var("KP_CONFIG_MAP").unwrap_or_else(|_| settings::CONFIG_MAP.to_string());
        let canonical_repository = env::var("KP_CANONICAL_REPOSITORY")
            .ok()
            .filter(|s| !s.trim().is_empty());

        if let Some(repository) = &canonical_repository {
            ImageReference::parse_repository(repository)
                .context("KP_CANONICAL_REPOSITORY is not a valid repository")?;
        }

        let registry_username = env::var("REGISTRY_USERNAME").ok();
        let registry_password = env::var("REGISTRY_PASSWORD").ok();
        if registry_username.is_some() != registry_password.is_some() {
            bail!("REGISTRY_USERNAME and REGISTRY_PASSWORD must be set together");
        }

        Ok(Config {
            config_namespace,
            config_map,
            canonical_repository,
            registry_username,
            registry_password,
        })
    }
}

/// Read-only source of cluster-wide settings, injected into each factory.
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Root repository that every managed image is relocated into
    async fn canonical_repository(&self) -> Result<String>;
}

/// A fixed canonical repository, used for overrides and tests
#[derive(Debug, Clone)]
pub struct StaticConfig {
    canonical_repository: String,
}

impl StaticConfig {
    pub fn new(canonical_repository: impl Into<String>) -> Self {
        Self {
            canonical_repository: canonical_repository.into(),
        }
    }
}

#[async_trait]
impl ConfigProvider for StaticConfig {
    async fn canonical_repository(&self) -> Result<String> {
        if self.canonical_repository.trim().is_empty() {
            return Err(KpError::Config(
                "canonical repository is empty".to_string(),
            ));
        }
        Ok(self.canonical_repository.clone())
    }
}
