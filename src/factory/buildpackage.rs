// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Buildpackage label inspection.
//!
//! A buildpackage carries two labels:
//!
//! - `io.buildpacks.buildpackage.metadata`: identity of the top-level buildpack
//!   (`{"id": "...", "version": "...", "homepage": "...", "stacks": [{"id": "..."}]}`)
//! - `io.buildpacks.buildpack.layers`: every buildpack in the package, keyed by
//!   id then version, including the `order` groups of meta-buildpacks
//!
//! Only the declared composition is reported: nested buildpacks are read one
//! level deep from the top-level entry's order, never fetched.

use crate::constants::labels;
use crate::error::{KpError, Result};
use crate::image::ImageHandle;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BuildpackRef {
    pub id: String,
    #[serde(default)]
    pub version: String,
}

/// Identity and declared composition of a buildpackage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildpackageMetadata {
    pub id: String,
    pub version: String,
    pub homepage: Option<String>,
    /// Stack ids the top-level buildpack supports
    pub stacks: Vec<String>,
    /// Buildpacks aggregated by a meta-buildpackage, in declared order
    pub buildpacks: Vec<BuildpackRef>,
}

impl BuildpackageMetadata {
    /// The `(id, version)` pair stores deduplicate on
    pub fn identity(&self) -> BuildpackRef {
        BuildpackRef {
            id: self.id.clone(),
            version: self.version.clone(),
        }
    }

    pub fn is_meta(&self) -> bool {
        !self.buildpacks.is_empty()
    }
}

#[derive(Deserialize)]
struct PackageLabel {
    id: String,
    version: String,
    #[serde(default)]
    homepage: Option<String>,
    #[serde(default)]
    stacks: Vec<StackLabel>,
}

#[derive(Deserialize)]
struct StackLabel {
    id: String,
}

#[derive(Deserialize)]
struct LayerEntry {
    #[serde(default)]
    order: Vec<OrderEntry>,
}

#[derive(Deserialize)]
struct OrderEntry {
    #[serde(default)]
    group: Vec<BuildpackRef>,
}

type LayersLabel = BTreeMap<String, BTreeMap<String, LayerEntry>>;

/// Read buildpackage metadata from an image's labels
pub fn inspect(image: &ImageHandle) -> Result<BuildpackageMetadata> {
    let not_a_buildpackage = |reason: String| KpError::NotABuildpackage {
        reference: image.source().to_string(),
        reason,
    };

    let image_labels = image.labels()?;

    let package: PackageLabel = image_labels
        .get(labels::BUILDPACKAGE_METADATA)
        .ok_or_else(|| not_a_buildpackage(format!("missing label '{}'", labels::BUILDPACKAGE_METADATA)))
        .and_then(|raw| {
            serde_json::from_str(raw).map_err(|e| {
                not_a_buildpackage(format!("malformed label '{}': {}", labels::BUILDPACKAGE_METADATA, e))
            })
        })?;

    if package.id.trim().is_empty() || package.version.trim().is_empty() {
        return Err(not_a_buildpackage(
            "buildpackage id and version must not be empty".to_string(),
        ));
    }

    let buildpacks = match image_labels.get(labels::BUILDPACK_LAYERS) {
        Some(raw) => {
            let layers: LayersLabel = serde_json::from_str(raw).map_err(|e| {
                not_a_buildpackage(format!("malformed label '{}': {}", labels::BUILDPACK_LAYERS, e))
            })?;
            nested_buildpacks(&layers, &package.id, &package.version)
        }
        None => Vec::new(),
    };

    Ok(BuildpackageMetadata {
        id: package.id,
        version: package.version,
        homepage: package.homepage,
        stacks: package.stacks.into_iter().map(|s| s.id).collect(),
        buildpacks,
    })
}

/// Buildpacks named in the order groups of `id@version`, first occurrence wins
fn nested_buildpacks(layers: &LayersLabel, id: &str, version: &str) -> Vec<BuildpackRef> {
    let Some(entry) = layers.get(id).and_then(|versions| versions.get(version)) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    entry
        .order
        .iter()
        .flat_map(|o| o.group.iter())
        .filter(|bp| seen.insert((bp.id.clone(), bp.version.clone())))
        .cloned()
        .collect()
}
