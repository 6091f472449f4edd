// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Image fetching and content-addressed relocation.

pub mod archive;
pub mod reference;
pub mod registry;

pub use archive::ArchiveFetcher;
pub use reference::{ImageReference, RelocatedReference};
pub use registry::{RegistryAuth, RegistryClient};

use crate::error::{KpError, Result};
use async_trait::async_trait;
use oci_distribution::client::{Config as BlobConfig, ImageLayer};
use oci_distribution::manifest::{OciImageManifest, OciManifest};
use olpc_cjson::CanonicalFormatter;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// A fetched image: manifest, config blob and layer blobs.
///
/// The digest is the sha256 of the manifest as it is written to a registry,
/// so relocating the same handle always lands on the same reference.
#[derive(Clone)]
pub struct ImageHandle {
    source: String,
    digest: String,
    manifest: OciImageManifest,
    config: BlobConfig,
    layers: Vec<ImageLayer>,
}

#[derive(Deserialize, Default)]
struct ImageConfigFile {
    #[serde(default)]
    config: Option<ContainerConfig>,
}

#[derive(Deserialize, Default)]
struct ContainerConfig {
    #[serde(rename = "Labels", default)]
    labels: Option<HashMap<String, String>>,
}

impl ImageHandle {
    pub fn new(
        source: impl Into<String>,
        manifest: OciImageManifest,
        config: BlobConfig,
        layers: Vec<ImageLayer>,
    ) -> Result<Self> {
        let digest = format!(
            "sha256:{}",
            hex::encode(Sha256::digest(manifest_bytes(&manifest)?))
        );
        Ok(Self {
            source: source.into(),
            digest,
            manifest,
            config,
            layers,
        })
    }

    /// The reference or path this image was fetched from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn manifest(&self) -> &OciImageManifest {
        &self.manifest
    }

    pub fn config(&self) -> &BlobConfig {
        &self.config
    }

    pub fn layers(&self) -> &[ImageLayer] {
        &self.layers
    }

    /// Labels from the image configuration; an image without labels yields an empty map.
    pub fn labels(&self) -> Result<HashMap<String, String>> {
        let file: ImageConfigFile =
            serde_json::from_slice(&self.config.data).map_err(|e| KpError::FetchFailed {
                reference: self.source.clone(),
                reason: format!("unreadable image config: {}", e),
            })?;

        Ok(file
            .config
            .and_then(|c| c.labels)
            .unwrap_or_default())
    }

    /// Label lookup that treats a missing config section like a missing label
    pub fn label(&self, key: &str) -> Result<Option<String>> {
        Ok(self.labels()?.remove(key))
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageHandle")
            .field("source", &self.source)
            .field("digest", &self.digest)
            .finish_non_exhaustive()
    }
}

/// The manifest body as the registry client uploads it: canonical JSON of the
/// untagged `OciManifest`, keys sorted and no whitespace.
pub(crate) fn manifest_bytes(manifest: &OciImageManifest) -> Result<Vec<u8>> {
    let manifest = OciManifest::Image(manifest.clone());
    let mut body = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut body, CanonicalFormatter::new());
    manifest.serialize(&mut ser)?;
    Ok(body)
}

/// Fetches an image by registry reference or local archive path.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, reference: &str) -> Result<ImageHandle>;
}

/// Copies an image into a destination repository, pinned by digest.
#[async_trait]
pub trait ImageRelocator: Send + Sync {
    async fn relocate(&self, image: &ImageHandle, destination: &str)
        -> Result<RelocatedReference>;
}

/// Reads existing paths as archives and everything else from a registry.
pub struct LocalOrRemoteFetcher {
    archive: ArchiveFetcher,
    remote: Arc<dyn ImageFetcher>,
}

impl LocalOrRemoteFetcher {
    pub fn new(remote: Arc<dyn ImageFetcher>) -> Self {
        Self {
            archive: ArchiveFetcher,
            remote,
        }
    }
}

#[async_trait]
impl ImageFetcher for LocalOrRemoteFetcher {
    async fn fetch(&self, reference: &str) -> Result<ImageHandle> {
        if Path::new(reference).exists() {
            debug!("Reading {} as a local archive", reference);
            self.archive.fetch(reference).await
        } else {
            self.remote.fetch(reference).await
        }
    }
}

/// Computes the relocated reference without writing anything to the registry.
#[derive(Debug, Clone, Default)]
pub struct DiscardRelocator;

#[async_trait]
impl ImageRelocator for DiscardRelocator {
    async fn relocate(
        &self,
        image: &ImageHandle,
        destination: &str,
    ) -> Result<RelocatedReference> {
        debug!(
            "Skipping upload of {} to {} (dry run)",
            image.source(),
            destination
        );
        RelocatedReference::new(destination, image.digest())
    }
}
