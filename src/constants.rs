// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// OCI image labels written by the buildpacks tooling
pub mod labels {
    /// Identifies the stack lineage of a build or run image
    pub const STACK_ID: &str = "io.buildpacks.stack.id";
    /// JSON identity of the top-level buildpack in a buildpackage
    pub const BUILDPACKAGE_METADATA: &str = "io.buildpacks.buildpackage.metadata";
    /// JSON map of every buildpack layer contained in a buildpackage
    pub const BUILDPACK_LAYERS: &str = "io.buildpacks.buildpack.layers";
}

/// Settings stored in the cluster
pub mod settings {
    /// Namespace holding the kp ConfigMap
    pub const NAMESPACE: &str = "kpack";
    /// Name of the kp ConfigMap
    pub const CONFIG_MAP: &str = "kp-config";
    /// Key of the canonical repository inside the ConfigMap
    pub const CANONICAL_REPOSITORY_KEY: &str = "canonical.repository";
}

/// Repository suffixes under the canonical repository
pub mod repositories {
    pub const BUILD_IMAGE: &str = "build";
    pub const RUN_IMAGE: &str = "run";
}

/// Media type of an OCI image index, which the archive reader does not descend into
pub const OCI_IMAGE_INDEX_MEDIA_TYPE: &str = "application/vnd.oci.image.index.v1+json";
