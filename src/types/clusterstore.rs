// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::Condition;
use crate::image::RelocatedReference;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// An ordered set of buildpackage images. Sources are only ever appended.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[kube(group = "kpack.io", version = "v1alpha1", kind = "ClusterStore")]
#[kube(status = "ClusterStoreStatus")]
#[kube(derive = "PartialEq")]
#[serde(rename_all = "camelCase")]
pub struct ClusterStoreSpec {
    #[serde(default)]
    pub sources: Vec<StoreImage>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
pub struct StoreImage {
    pub image: String,
}

impl From<RelocatedReference> for StoreImage {
    fn from(reference: RelocatedReference) -> Self {
        Self {
            image: reference.into(),
        }
    }
}

/// Written by the build service once it has read the store's buildpackages
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStoreStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buildpacks: Vec<StoreBuildpack>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreBuildpack {
    pub id: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    pub store_image: StoreImage,
}

impl ClusterStore {
    /// Source images in order
    pub fn source_images(&self) -> impl Iterator<Item = &str> {
        self.spec.sources.iter().map(|s| s.image.as_str())
    }
}
