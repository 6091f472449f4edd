// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Factories that turn image references into kpack resources.

pub mod buildpackage;
pub mod stack;
pub mod store;

pub use buildpackage::{inspect, BuildpackRef, BuildpackageMetadata};
pub use stack::{stack_id, ClusterStackFactory};
pub use store::{ClusterStoreFactory, StoreUpdate};

use crate::config::ConfigProvider;
use crate::error::Result;
use crate::image::ImageReference;
use tracing::debug;

/// Resolve the canonical repository and check that it names a repository.
pub(crate) async fn canonical_repository(provider: &dyn ConfigProvider) -> Result<String> {
    let configured = provider.canonical_repository().await?;
    let repository = configured.trim().trim_end_matches('/');
    let parsed = ImageReference::parse_repository(repository)?;
    debug!("Using canonical repository {}", parsed.name());
    Ok(repository.to_string())
}

/// `{repository}/{child}`
pub(crate) fn join_repository(repository: &str, child: &str) -> String {
    format!("{}/{}", repository.trim_end_matches('/'), child)
}
