// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Target annotation parsing and provenance labels

use crate::constants::{annotations, labels};
use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use std::collections::BTreeMap;

/// Split an annotation value into target namespaces.
///
/// Tokens are kept verbatim, so `"a,,b"` yields an empty entry in the middle.
/// Only the empty string maps to an empty list.
pub fn parse_targets(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value
        .split(annotations::TARGET_DELIMITER)
        .map(str::to_string)
        .collect()
}

/// Get the target namespaces declared on a secret, or `None` if the secret is not managed
pub fn target_namespaces(secret: &Secret) -> Option<Vec<String>> {
    secret
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(annotations::TO_NAMESPACES))
        .map(|v| parse_targets(v))
}

/// Labels for a replica of `source`: its own labels plus the provenance keys
pub fn provenance_labels(source: &Secret) -> BTreeMap<String, String> {
    let mut res = source.labels().clone();
    res.insert(labels::FROM_NAME.to_string(), source.name_any());
    res.insert(
        labels::FROM_NAMESPACE.to_string(),
        source.namespace().unwrap_or_default(),
    );
    res.insert(labels::FROM_UID.to_string(), source.uid().unwrap_or_default());
    res
}

/// Label selector matching every replica derived from `name` in `namespace`
pub fn provenance_selector(name: &str, namespace: &str) -> String {
    format!(
        "{}={},{}={}",
        labels::FROM_NAME,
        name,
        labels::FROM_NAMESPACE,
        namespace
    )
}
