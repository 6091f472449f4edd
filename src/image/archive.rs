// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Local OCI image layout archives (`.cnb` buildpackages, saved images).
//!
//! The archive must be a tarball of an OCI image layout:
//! - `index.json` pointing at a single image manifest
//! - `blobs/sha256/...` holding manifest, config and layers

use super::{ImageFetcher, ImageHandle};
use crate::constants::OCI_IMAGE_INDEX_MEDIA_TYPE;
use crate::error::{KpError, Result};
use async_trait::async_trait;
use oci_distribution::client::{Config as BlobConfig, ImageLayer};
use oci_distribution::manifest::OciImageManifest;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, instrument};

#[derive(Deserialize)]
struct LayoutIndex {
    manifests: Vec<LayoutEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutEntry {
    digest: String,
    #[serde(default)]
    media_type: Option<String>,
}

/// Reads images from OCI layout tarballs on the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct ArchiveFetcher;

#[async_trait]
impl ImageFetcher for ArchiveFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, reference: &str) -> Result<ImageHandle> {
        let failed = |reason: String| KpError::FetchFailed {
            reference: reference.to_string(),
            reason,
        };

        let entries = read_entries(Path::new(reference))
            .map_err(|e| failed(format!("unreadable archive: {}", e)))?;
        debug!("Read {} entries from {}", entries.len(), reference);

        let index: LayoutIndex = entries
            .get("index.json")
            .ok_or_else(|| failed("archive has no index.json".to_string()))
            .and_then(|data| {
                serde_json::from_slice(data)
                    .map_err(|e| failed(format!("malformed index.json: {}", e)))
            })?;

        let entry = match index.manifests.as_slice() {
            [entry] => entry,
            [] => return Err(failed("index.json lists no manifests".to_string())),
            _ => return Err(failed("index.json lists more than one manifest".to_string())),
        };
        if entry.media_type.as_deref() == Some(OCI_IMAGE_INDEX_MEDIA_TYPE) {
            return Err(failed("nested image indexes are not supported".to_string()));
        }

        let manifest_data = blob(&entries, &entry.digest).map_err(&failed)?;
        let manifest: OciImageManifest = serde_json::from_slice(manifest_data)
            .map_err(|e| failed(format!("malformed manifest: {}", e)))?;

        let config = BlobConfig::new(
            blob(&entries, &manifest.config.digest).map_err(&failed)?.to_vec(),
            manifest.config.media_type.clone(),
            None,
        );

        let layers = manifest
            .layers
            .iter()
            .map(|descriptor| {
                blob(&entries, &descriptor.digest)
                    .map(|data| ImageLayer::new(data.to_vec(), descriptor.media_type.clone(), None))
                    .map_err(&failed)
            })
            .collect::<Result<Vec<_>>>()?;

        ImageHandle::new(reference, manifest, config, layers)
    }
}

fn read_entries(path: &Path) -> std::io::Result<HashMap<String, Vec<u8>>> {
    let mut archive = tar::Archive::new(File::open(path)?);
    let mut entries = HashMap::new();

    for entry in archive.entries()? {
        let mut entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let name = entry.path()?.to_string_lossy().trim_start_matches("./").to_string();
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        entries.insert(name, data);
    }

    Ok(entries)
}

fn blob<'a>(
    entries: &'a HashMap<String, Vec<u8>>,
    digest: &str,
) -> std::result::Result<&'a [u8], String> {
    let (algorithm, hex) = digest
        .split_once(':')
        .ok_or_else(|| format!("malformed digest '{}'", digest))?;
    entries
        .get(&format!("blobs/{}/{}", algorithm, hex))
        .map(Vec::as_slice)
        .ok_or_else(|| format!("blob {} is missing from the archive", digest))
}
