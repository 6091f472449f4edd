// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KpError {
    #[error("Failed to fetch image '{reference}': {reason}")]
    FetchFailed { reference: String, reason: String },

    #[error("Invalid stack metadata on image '{reference}': {reason}")]
    InvalidStackMetadata { reference: String, reason: String },

    #[error("build stack '{build}' does not match run stack '{run}'")]
    StackMismatch { build: String, run: String },

    #[error("Failed to relocate image '{image}' to '{destination}': {reason}")]
    RelocationFailed {
        image: String,
        destination: String,
        reason: String,
    },

    #[error("Image '{reference}' is not a buildpackage: {reason}")]
    NotABuildpackage { reference: String, reason: String },

    #[error("Invalid image reference '{reference}': {reason}")]
    InvalidReference { reference: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{kind} '{name}' does not exist")]
    NotFound { kind: String, name: String },

    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: String, name: String },

    #[error("{kind} '{name}' was modified concurrently, re-run the command to retry")]
    Conflict { kind: String, name: String },

    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl KpError {
    /// Conflicts are resolved by re-running the whole command, never internally.
    pub fn is_retryable(&self) -> bool {
        matches!(self, KpError::Conflict { .. })
    }

    /// Process exit status: 75 (EX_TEMPFAIL) when re-running may succeed, 1 otherwise
    pub fn exit_code(&self) -> u8 {
        if self.is_retryable() {
            EXIT_RETRYABLE
        } else {
            1
        }
    }
}

pub const EXIT_RETRYABLE: u8 = 75;

pub type Result<T> = std::result::Result<T, KpError>;
