// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes reconcilers that react to watch events.

pub mod secret;

pub use secret::SecretReconciler;

use crate::config::Config;
use crate::error::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use k8s_openapi::api::core::v1::Secret;
use kube::{runtime::reflector::ObjectRef, Client};

/// What a single reconciliation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The source no longer exists
    SourceGone,
    /// The source carries no sync annotation
    Unmanaged,
    /// Orphans were collected and replicas written
    Synced {
        deleted: usize,
        created: usize,
        updated: usize,
    },
}

/// Reconcile a single object by its identity.
///
/// Callers must not run two reconciliations for the same object concurrently.
#[async_trait]
pub trait Reconcile: Send + Sync {
    async fn reconcile(&self, key: &ObjectRef<Secret>) -> Result<ReconcileOutcome>;
}

/// A controller's run loop
pub type ControllerFuture = BoxFuture<'static, anyhow::Result<()>>;

/// A controller to start at boot, with the kind it watches
pub struct ControllerRegistration {
    pub kind: &'static str,
    pub start: fn(Client, Config) -> ControllerFuture,
}

/// Every controller this operator runs
pub fn registrations() -> Vec<ControllerRegistration> {
    vec![ControllerRegistration {
        kind: "Secret",
        start: start_secret_controller,
    }]
}

fn start_secret_controller(client: Client, config: Config) -> ControllerFuture {
    secret::run(client, config).boxed()
}
