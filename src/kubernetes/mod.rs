// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for client creation, settings lookup, and resource persistence.

pub mod client;
pub mod config_map;
pub mod resources;

pub use client::create_client;
pub use config_map::ConfigMapProvider;
pub use resources::{KubeResources, ResourceClient};
