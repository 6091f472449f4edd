// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Builds ClusterStack resources from a build image and a run image.

use super::{canonical_repository, join_repository};
use crate::config::ConfigProvider;
use crate::constants::{labels, repositories};
use crate::error::{KpError, Result};
use crate::image::{ImageFetcher, ImageHandle, ImageRelocator};
use crate::types::{ClusterStack, ClusterStackSpec};
use std::sync::Arc;
use tracing::{info, instrument};

/// Read the stack id label of an image
pub fn stack_id(image: &ImageHandle) -> Result<String> {
    let invalid = |reason: &str| KpError::InvalidStackMetadata {
        reference: image.source().to_string(),
        reason: reason.to_string(),
    };

    let id = image
        .label(labels::STACK_ID)
        .map_err(|e| invalid(&e.to_string()))?
        .ok_or_else(|| invalid(&format!("missing label '{}'", labels::STACK_ID)))?;

    if id.trim().is_empty() || id.trim() != id {
        return Err(invalid(&format!("label '{}' has a blank or padded value", labels::STACK_ID)));
    }
    Ok(id)
}

pub struct ClusterStackFactory {
    fetcher: Arc<dyn ImageFetcher>,
    relocator: Arc<dyn ImageRelocator>,
    repository: String,
}

impl ClusterStackFactory {
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

    /// Fetch both images, require a shared stack id, then relocate them under
    /// `{canonical}/build` and `{canonical}/run`.
    ///
    /// The ids are compared before anything is uploaded, so a mismatched pair
    /// never touches the registry.
    #[instrument(skip(self))]
    pub async fn make_stack(
        &self,
        name: &str,
        build_image_ref: &str,
        run_image_ref: &str,
    ) -> Result<ClusterStack> {
        let build_image = self.fetcher.fetch(build_image_ref).await?;
        let build_stack_id = stack_id(&build_image)?;

        let run_image = self.fetcher.fetch(run_image_ref).await?;
        let run_stack_id = stack_id(&run_image)?;

        if build_stack_id != run_stack_id {
            return Err(KpError::StackMismatch {
                build: build_stack_id,
                run: run_stack_id,
            });
        }

        let build = self
            .relocator
            .relocate(&build_image, &join_repository(&self.repository, repositories::BUILD_IMAGE))
            .await?;
        let run = self
            .relocator
            .relocate(&run_image, &join_repository(&self.repository, repositories::RUN_IMAGE))
            .await?;

        info!("Stack {} uses build image {} and run image {}", build_stack_id, build, run);

        Ok(ClusterStack::new(
            name,
            ClusterStackSpec {
                id: build_stack_id,
                build_image: build.into(),
                run_image: run.into(),
            },
        ))
    }
}
