// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Image reference parsing.
//!
//! Parses references like `registry.example/team/build:v1` or
//! `registry.example/team/build@sha256:...` into their components.

use crate::error::{KpError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Registry assumed when a reference names none.
const DEFAULT_REGISTRY: &str = "docker.io";

/// Parsed image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Registry hostname, optionally with port (e.g. "gcr.io", "localhost:5000")
    pub registry: String,
    /// Repository path (e.g. "library/ubuntu", "team/build")
    pub repository: String,
    pub tag: Option<String>,
    /// Digest (e.g. "sha256:abc123...")
    pub digest: Option<String>,
}

impl ImageReference {
    /// Parse an image reference string.
    ///
    /// - `ubuntu` → docker.io/library/ubuntu
    /// - `team/build:v1` → docker.io/team/build:v1
    /// - `registry.example/team/build@sha256:...` → pinned reference
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(invalid(reference, "empty image reference"));
        }

        let (name_tag, digest) = match reference.rsplit_once('@') {
            Some((name, digest)) => {
                validate_digest(digest).map_err(|reason| invalid(reference, reason))?;
                (name, Some(digest.to_string()))
            }
            None => (reference, None),
        };

        let (name, tag) = split_tag(name_tag);
        if let Some(tag) = tag {
            if !is_valid_tag(tag) {
                return Err(invalid(reference, format!("invalid tag '{}'", tag)));
            }
        }

        let (registry, repository) = split_registry_repository(name)
            .map_err(|reason| invalid(reference, reason))?;

        Ok(ImageReference {
            registry,
            repository,
            tag: tag.map(str::to_string),
            digest,
        })
    }

    /// Parse a bare repository, rejecting tags and digests.
    pub fn parse_repository(repository: &str) -> Result<Self> {
        let parsed = Self::parse(repository)?;
        if parsed.tag.is_some() || parsed.digest.is_some() {
            return Err(invalid(
                repository,
                "a repository must not carry a tag or digest",
            ));
        }
        Ok(parsed)
    }

    /// `registry/repository`, without tag or digest
    pub fn name(&self) -> String {
        format!("{}/{}", self.registry, self.repository)
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        if let Some(tag) = &self.tag {
            write!(f, ":{}", tag)?;
        }
        if let Some(digest) = &self.digest {
            write!(f, "@{}", digest)?;
        }
        Ok(())
    }
}

/// A `registry/repository@sha256:<hex>` reference inside the canonical repository.
///
/// Only constructible with a digest, so persisted resources never point at a
/// mutable tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelocatedReference(String);

impl RelocatedReference {
    pub fn new(repository: &str, digest: &str) -> Result<Self> {
        let repository = ImageReference::parse_repository(repository)?;
        validate_digest(digest).map_err(|reason| invalid(digest, reason))?;
        Ok(Self(format!("{}@{}", repository.name(), digest)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn digest(&self) -> &str {
        self.0.rsplit_once('@').map(|(_, d)| d).unwrap_or_default()
    }
}

impl fmt::Display for RelocatedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<RelocatedReference> for String {
    fn from(reference: RelocatedReference) -> Self {
        reference.0
    }
}

fn invalid(reference: &str, reason: impl Into<String>) -> KpError {
    KpError::InvalidReference {
        reference: reference.to_string(),
        reason: reason.into(),
    }
}

/// Split `name[:tag]`, only looking for the colon after the last slash so
/// registry ports are left alone.
fn split_tag(name: &str) -> (&str, Option<&str>) {
    let start = name.rfind('/').map_or(0, |pos| pos + 1);
    match name[start..].rfind(':') {
        Some(pos) => (&name[..start + pos], Some(&name[start + pos + 1..])),
        None => (name, None),
    }
}

fn split_registry_repository(name: &str) -> std::result::Result<(String, String), String> {
    let (registry, repository) = match name.split_once('/') {
        Some((first, rest))
            if first.contains('.') || first.contains(':') || first == "localhost" =>
        {
            (first.to_string(), rest.to_string())
        }
        Some(_) => (DEFAULT_REGISTRY.to_string(), name.to_string()),
        None => (DEFAULT_REGISTRY.to_string(), format!("library/{}", name)),
    };

    if repository.is_empty() {
        return Err("empty repository".to_string());
    }
    if let Some(component) = repository.split('/').find(|c| !is_valid_component(c)) {
        return Err(format!("invalid repository component '{}'", component));
    }

    Ok((registry, repository))
}

fn is_valid_component(component: &str) -> bool {
    let alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    component.starts_with(alnum)
        && component.ends_with(alnum)
        && component
            .chars()
            .all(|c| alnum(c) || matches!(c, '.' | '_' | '-'))
}

fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag.len() <= 128
        && !tag.starts_with(['.', '-'])
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

fn validate_digest(digest: &str) -> std::result::Result<(), String> {
    let Some(hex) = digest.strip_prefix("sha256:") else {
        return Err(format!("unsupported digest '{}', expected sha256", digest));
    };
    if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()) {
        return Err(format!("malformed sha256 digest '{}'", digest));
    }
    Ok(())
}
