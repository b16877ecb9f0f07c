// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Creating and updating replicas in target namespaces

use crate::error::Result;
use crate::kubernetes::SecretStore;
use crate::sync::annotations::provenance_labels;
use k8s_openapi::api::core::v1::Secret;
use kube::{api::ObjectMeta, ResourceExt};
use tracing::{info, instrument, warn};

/// Writes performed by one [`synchronize`] pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub created: usize,
    pub updated: usize,
}

/// Build the replica of `source` for `namespace`.
///
/// Only name, data, type and labels are carried over.
pub fn build_replica(source: &Secret, namespace: &str) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: source.metadata.name.clone(),
            namespace: Some(namespace.to_string()),
            labels: Some(provenance_labels(source)),
            ..Default::default()
        },
        data: source.data.clone(),
        type_: source.type_.clone(),
        ..Default::default()
    }
}

/// Ensure a replica of `source` exists in every target namespace.
///
/// Targets are processed in order. A missing replica is created; an existing
/// one is always replaced, even when its content already matches, so every
/// target costs exactly one write per pass. The first failure stops the pass
/// and earlier targets keep their new state.
///
/// A target equal to the source's own namespace is the one exception to the
/// one-write-per-target rule: it is skipped without any store call, so such a
/// target costs no lookup and no write. Writing there would overwrite the
/// source with its own replica.
#[instrument(
    skip(store, source, targets),
    fields(secret = %format!("{}/{}", source.namespace().unwrap_or_default(), source.name_any()))
)]
pub async fn synchronize(
    store: &dyn SecretStore,
    source: &Secret,
    targets: &[String],
) -> Result<SyncSummary> {
    let name = source.name_any();
    let source_namespace = source.namespace().unwrap_or_default();
    let mut summary = SyncSummary::default();

    for namespace in targets {
        if *namespace == source_namespace {
            warn!(
                "Secret {}/{} lists its own namespace as a target, skipping",
                source_namespace, name
            );
            continue;
        }

        let replica = build_replica(source, namespace);

        match store.get(namespace, &name).await? {
            None => {
                info!("Secret {} doesn't exist in {}, creating it", name, namespace);
                store.create(&replica).await?;
                summary.created += 1;
            }
            Some(_) => {
                info!("Secret {} already exists in {}, updating it", name, namespace);
                store.update(&replica).await?;
                summary.updated += 1;
            }
        }
    }

    Ok(summary)
}
