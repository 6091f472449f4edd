// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Builds ClusterStore resources and merges buildpackages into existing ones.
//!
//! Creation keeps every input as given, duplicates included: the caller is
//! trusted to pass a unique list for an initial load. Merging is where
//! uniqueness by `(id, version)` is enforced.

use super::buildpackage::{inspect, BuildpackRef, BuildpackageMetadata};
use super::{canonical_repository, join_repository};
use crate::config::ConfigProvider;
use crate::error::{KpError, Result};
use crate::image::{ImageFetcher, ImageRelocator, RelocatedReference};
use crate::types::{ClusterStore, ClusterStoreSpec, StoreImage};
use kube::ResourceExt;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// A buildpackage copied into the canonical repository
#[derive(Debug, Clone)]
pub struct UploadedBuildpackage {
    pub image: RelocatedReference,
    pub metadata: BuildpackageMetadata,
}

/// Outcome of merging buildpackages into an existing store.
#[derive(Debug, Clone)]
pub struct StoreUpdate {
    pub store: ClusterStore,
    /// Appended sources, in input order
    pub added: Vec<UploadedBuildpackage>,
    /// Input references whose `(id, version)` was already in the store
    pub skipped: Vec<String>,
}

impl StoreUpdate {
    /// True iff at least one source was appended
    pub fn changed(&self) -> bool {
        !self.added.is_empty()
    }
}

pub struct ClusterStoreFactory {
    fetcher: Arc<dyn ImageFetcher>,
    relocator: Arc<dyn ImageRelocator>,
    repository: String,
}

impl ClusterStoreFactory {
    /// Create a factory relocating into the configured canonical repository
    pub async fn new(
        fetcher: Arc<dyn ImageFetcher>,
        relocator: Arc<dyn ImageRelocator>,
        config: &dyn ConfigProvider,
    ) -> Result<Self> {
        Ok(Self {
            fetcher,
            relocator,
            repository: canonical_repository(config).await?,
        })
    }

    /// Relocate every buildpackage under `{canonical}/{name}` and list them
    /// as sources in input order.
    #[instrument(skip(self))]
    pub async fn make_store(&self, name: &str, buildpackages: &[String]) -> Result<ClusterStore> {
        if buildpackages.is_empty() {
            return Err(KpError::InvalidArgument(
                "at least one buildpackage is required".to_string(),
            ));
        }

        let mut sources = Vec::with_capacity(buildpackages.len());
        for reference in buildpackages {
            let uploaded = self.upload(name, reference).await?;
            sources.push(StoreImage::from(uploaded.image));
        }

        Ok(ClusterStore::new(name, ClusterStoreSpec { sources }))
    }

    /// Append the buildpackages whose `(id, version)` the store does not hold yet.
    ///
    /// Existing sources are inspected to learn their identities. Duplicates,
    /// including repeats within `buildpackages`, are skipped without error.
    #[instrument(skip(self, store), fields(store = %store.name_any()))]
    pub async fn add_to_store(
        &self,
        store: &ClusterStore,
        buildpackages: &[String],
    ) -> Result<StoreUpdate> {
        let name = store.name_any();
        let mut present = self.identities(store).await?;

        let mut updated = store.clone();
        let mut added = Vec::new();
        let mut skipped = Vec::new();

        for reference in buildpackages {
            let uploaded = self.upload(&name, reference).await?;
            if !present.insert(uploaded.metadata.identity()) {
                info!(
                    "Buildpackage {}@{} from {} already exists in the store",
                    uploaded.metadata.id, uploaded.metadata.version, reference
                );
                skipped.push(reference.clone());
                continue;
            }

            updated
                .spec
                .sources
                .push(StoreImage::from(uploaded.image.clone()));
            added.push(uploaded);
        }

        Ok(StoreUpdate {
            store: updated,
            added,
            skipped,
        })
    }

    /// Fetch, relocate and inspect a single buildpackage
    async fn upload(&self, store_name: &str, reference: &str) -> Result<UploadedBuildpackage> {
        let image = self.fetcher.fetch(reference).await?;
        let image_ref = self
            .relocator
            .relocate(&image, &join_repository(&self.repository, store_name))
            .await?;
        let metadata = inspect(&image)?;

        debug!(
            "Uploaded buildpackage {}@{} to {}",
            metadata.id, metadata.version, image_ref
        );

        Ok(UploadedBuildpackage {
            image: image_ref,
            metadata,
        })
    }

    async fn identities(&self, store: &ClusterStore) -> Result<HashSet<BuildpackRef>> {
        let mut identities = HashSet::new();
        for source in store.source_images() {
            let image = self.fetcher.fetch(source).await?;
            identities.insert(inspect(&image)?.identity());
        }
        Ok(identities)
    }
}
