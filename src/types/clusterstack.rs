// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::Condition;
use crate::image::RelocatedReference;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// A build/run image pair sharing one stack id. There is no update; a stack is
/// deleted and created again.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[kube(group = "kpack.io", version = "v1alpha1", kind = "ClusterStack")]
#[kube(status = "ClusterStackStatus")]
#[kube(derive = "PartialEq")]
#[serde(rename_all = "camelCase")]
pub struct ClusterStackSpec {
    pub id: String,
    pub build_image: ClusterStackSpecImage,
    pub run_image: ClusterStackSpecImage,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
pub struct ClusterStackSpecImage {
    pub image: String,
}

impl From<RelocatedReference> for ClusterStackSpecImage {
    fn from(reference: RelocatedReference) -> Self {
        Self {
            image: reference.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStackStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
}
