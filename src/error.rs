// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SecretSyncError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Secret {0} has no namespace")]
    MissingNamespace(String),
}

pub type Result<T> = std::result::Result<T, SecretSyncError>;
