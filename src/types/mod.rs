// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! kpack custom resources managed by kp.

pub mod clusterstack;
pub mod clusterstore;

pub use clusterstack::{ClusterStack, ClusterStackSpec, ClusterStackSpecImage};
pub use clusterstore::{ClusterStore, ClusterStoreSpec, StoreImage};

use serde::{Deserialize, Serialize};

/// Status condition reported by the build service, shown as-is in `--output`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
