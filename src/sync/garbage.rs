// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Removal of replicas whose namespace is no longer targeted

use crate::error::Result;
use crate::kubernetes::SecretStore;
use crate::sync::annotations::provenance_selector;
use kube::ResourceExt;
use tracing::{debug, info, instrument};

/// Delete every replica of `name`/`namespace` that lives outside `targets`.
///
/// Replicas are found cluster-wide through their provenance labels. The first
/// failed delete aborts the pass; the remaining orphans are picked up on the
/// next reconciliation. Returns the number of deleted replicas.
#[instrument(skip(store, targets), fields(secret = %format!("{}/{}", namespace, name)))]
pub async fn collect_orphans(
    store: &dyn SecretStore,
    name: &str,
    namespace: &str,
    targets: &[String],
) -> Result<usize> {
    let replicas = store
        .list_by_labels(&provenance_selector(name, namespace))
        .await?;

    debug!("Found {} replicas", replicas.len());

    let mut deleted = 0;
    for replica in &replicas {
        let replica_namespace = replica.namespace().unwrap_or_default();

        // Never collect the source itself, even if it carries its own provenance labels
        if replica_namespace == namespace && replica.name_any() == name {
            continue;
        }

        if !is_targeted(targets, &replica_namespace) {
            info!(
                "Secret {}/{} is no longer targeted, deleting it",
                replica_namespace,
                replica.name_any()
            );
            store.delete(replica).await?;
            deleted += 1;
        }
    }

    Ok(deleted)
}

fn is_targeted(targets: &[String], namespace: &str) -> bool {
    !namespace.is_empty() && targets.iter().any(|t| t == namespace)
}
