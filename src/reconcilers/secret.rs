// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secret reconciler - mirrors annotated secrets into their target namespaces.

use crate::config::Config;
use crate::constants::CONTROLLER_NAME;
use crate::error::{Result, SecretSyncError};
use crate::kubernetes::{KubeSecretStore, SecretStore};
use crate::reconcilers::{Reconcile, ReconcileOutcome};
use crate::sync::{collect_orphans, synchronize, target_namespaces};
use async_trait::async_trait;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    runtime::{controller::Action, reflector::ObjectRef, Controller},
    Api, Client,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Reconciles one source secret: garbage-collects orphans, then synchronizes replicas.
///
/// Every pass starts from a fresh read of the source. No state is kept between passes.
pub struct SecretReconciler<S> {
    store: S,
}

impl<S: SecretStore> SecretReconciler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: SecretStore> Reconcile for SecretReconciler<S> {
    #[instrument(skip(self), fields(secret = %key))]
    async fn reconcile(&self, key: &ObjectRef<Secret>) -> Result<ReconcileOutcome> {
        let name = key.name.as_str();
        let namespace = key
            .namespace
            .as_deref()
            .ok_or_else(|| SecretSyncError::MissingNamespace(name.to_string()))?;

        info!("Reconciling secret");

        // Deleted sources leave their replicas in place
        let Some(source) = self.store.get(namespace, name).await? else {
            debug!("Secret {}/{} no longer exists, nothing to do", namespace, name);
            return Ok(ReconcileOutcome::SourceGone);
        };

        let Some(targets) = target_namespaces(&source) else {
            debug!(
                "Secret {}/{} does not have the sync annotation, skipping",
                namespace, name
            );
            return Ok(ReconcileOutcome::Unmanaged);
        };

        info!(
            "Secret {}/{} is configured to sync to [{}]",
            namespace,
            name,
            targets.join(",")
        );

        let deleted = collect_orphans(&self.store, name, namespace, &targets).await?;
        let summary = synchronize(&self.store, &source, &targets).await?;

        Ok(ReconcileOutcome::Synced {
            deleted,
            created: summary.created,
            updated: summary.updated,
        })
    }
}

/// State shared with the kube controller callbacks
struct ControllerContext {
    reconciler: SecretReconciler<KubeSecretStore>,
    error_requeue: Duration,
}

/// Secrets to watch as sources, either in one namespace or cluster-wide
fn source_api(client: Client, config: &Config) -> Api<Secret> {
    match &config.watch_namespace {
        Some(namespace) => Api::namespaced(client, namespace),
        None => Api::all(client),
    }
}

/// Watch secrets and reconcile each change until the watch stream ends.
pub async fn run(client: Client, config: Config) -> anyhow::Result<()> {
    let secrets = source_api(client.clone(), &config);
    let context = Arc::new(ControllerContext {
        reconciler: SecretReconciler::new(KubeSecretStore::new(client)),
        error_requeue: config.error_requeue,
    });

    info!(
        "Starting {} for {}",
        CONTROLLER_NAME,
        config.watch_namespace.as_deref().unwrap_or("all namespaces")
    );

    Controller::new(secrets, WatcherConfig::default())
        .run(reconcile, error_policy, context)
        .for_each(|res| async move {
            match res {
                Ok(o) => debug!("Reconciled secret: {:?}", o),
                Err(e) => warn!("Reconciliation error: {:?}", e),
            }
        })
        .await;

    Ok(())
}

async fn reconcile(secret: Arc<Secret>, ctx: Arc<ControllerContext>) -> Result<Action> {
    let outcome = ctx
        .reconciler
        .reconcile(&ObjectRef::from_obj(secret.as_ref()))
        .await?;
    debug!("Reconcile outcome: {:?}", outcome);

    // Wait for the next change of the source
    Ok(Action::await_change())
}

fn error_policy(
    secret: Arc<Secret>,
    error: &SecretSyncError,
    ctx: Arc<ControllerContext>,
) -> Action {
    error!(
        "Reconciliation of secret {} failed: {}",
        ObjectRef::from_obj(secret.as_ref()),
        error
    );
    Action::requeue(ctx.error_requeue)
}
