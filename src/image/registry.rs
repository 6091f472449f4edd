// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Registry transport backed by the `oci-distribution` client.

use super::reference::RelocatedReference;
use super::{ImageFetcher, ImageHandle, ImageRelocator};
use crate::config::Config;
use crate::error::{KpError, Result};
use async_trait::async_trait;
use oci_distribution::client::{ClientConfig, ClientProtocol, Config as BlobConfig, ImageLayer};
use oci_distribution::secrets::RegistryAuth as OciRegistryAuth;
use oci_distribution::{Client, Reference};
use tracing::{debug, info, instrument};

/// Credentials for the registries kp talks to.
#[derive(Debug, Clone, Default)]
pub struct RegistryAuth {
    username: Option<String>,
    password: Option<String>,
}

impl RegistryAuth {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    /// Basic credentials when both are configured, anonymous otherwise
    pub fn from_config(config: &Config) -> Self {
        match (&config.registry_username, &config.registry_password) {
            (Some(u), Some(p)) => Self::basic(u.clone(), p.clone()),
            _ => Self::anonymous(),
        }
    }

    fn to_oci_auth(&self) -> OciRegistryAuth {
        match (&self.username, &self.password) {
            (Some(u), Some(p)) => OciRegistryAuth::Basic(u.clone(), p.clone()),
            _ => OciRegistryAuth::Anonymous,
        }
    }
}

/// Pulls images from and pushes images to container registries.
pub struct RegistryClient {
    client: Client,
    auth: RegistryAuth,
}

impl RegistryClient {
    pub fn new(auth: RegistryAuth) -> Self {
        Self::with_protocol(auth, ClientProtocol::Https)
    }

    /// Plain HTTP, for local development registries
    pub fn insecure(auth: RegistryAuth) -> Self {
        Self::with_protocol(auth, ClientProtocol::Http)
    }

    fn with_protocol(auth: RegistryAuth, protocol: ClientProtocol) -> Self {
        let config = ClientConfig {
            protocol,
            ..Default::default()
        };
        Self {
            client: Client::new(config),
            auth,
        }
    }
}

/// Registry references are parsed by the transport itself; it applies the
/// docker.io, `library/` and `latest` defaults.
fn to_oci_reference(reference: &str) -> Result<Reference> {
    reference
        .trim()
        .parse::<Reference>()
        .map_err(|e| KpError::InvalidReference {
            reference: reference.to_string(),
            reason: e.to_string(),
        })
}

/// The digest-pinned destination a push of `image` is written to
fn push_target(
    image: &ImageHandle,
    destination: &str,
) -> Result<(RelocatedReference, Reference)> {
    let relocated = RelocatedReference::new(destination, image.digest())?;
    let oci_ref = to_oci_reference(relocated.as_str())?;
    Ok((relocated, oci_ref))
}

#[async_trait]
impl ImageFetcher for RegistryClient {
    #[instrument(skip(self))]
    async fn fetch(&self, reference: &str) -> Result<ImageHandle> {
        let oci_ref = to_oci_reference(reference)?;
        let auth = self.auth.to_oci_auth();
        let failed = |reason: String| KpError::FetchFailed {
            reference: reference.to_string(),
            reason,
        };

        info!("Fetching image {}", reference);

        let (manifest, _) = self
            .client
            .pull_image_manifest(&oci_ref, &auth)
            .await
            .map_err(|e| failed(format!("failed to pull manifest: {}", e)))?;

        let mut config_data: Vec<u8> = Vec::new();
        self.client
            .pull_blob(&oci_ref, &manifest.config, &mut config_data)
            .await
            .map_err(|e| failed(format!("failed to pull config blob: {}", e)))?;
        let config = BlobConfig::new(config_data, manifest.config.media_type.clone(), None);

        let mut layers = Vec::with_capacity(manifest.layers.len());
        for descriptor in &manifest.layers {
            debug!(digest = %descriptor.digest, size = descriptor.size, "Pulling layer");

            let mut data: Vec<u8> = Vec::new();
            self.client
                .pull_blob(&oci_ref, descriptor, &mut data)
                .await
                .map_err(|e| failed(format!("failed to pull layer {}: {}", descriptor.digest, e)))?;
            layers.push(ImageLayer::new(data, descriptor.media_type.clone(), None));
        }

        ImageHandle::new(reference, manifest, config, layers)
    }
}

#[async_trait]
impl ImageRelocator for RegistryClient {
    #[instrument(skip(self, image), fields(image = %image.source()))]
    async fn relocate(
        &self,
        image: &ImageHandle,
        destination: &str,
    ) -> Result<RelocatedReference> {
        let (relocated, oci_ref) = push_target(image, destination)?;
        let auth = self.auth.to_oci_auth();

        info!("Uploading {} to {}", image.source(), relocated);

        let response = self
            .client
            .push(
                &oci_ref,
                image.layers(),
                image.config().clone(),
                &auth,
                Some(image.manifest().clone()),
            )
            .await
            .map_err(|e| KpError::RelocationFailed {
                image: image.source().to_string(),
                destination: destination.to_string(),
                reason: e.to_string(),
            })?;
        debug!("Manifest written to {}", response.manifest_url);

        Ok(relocated)
    }
}
