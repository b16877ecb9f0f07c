// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes annotation keys read from source secrets
pub mod annotations {
    /// Comma separated list of namespaces the secret is mirrored into.
    /// Absence of the key means the secret is not managed.
    pub const TO_NAMESPACES: &str = "secretsync.ndp.netease.com/to-namespaces";

    /// Delimiter between namespaces in [`TO_NAMESPACES`]
    pub const TARGET_DELIMITER: char = ',';
}

/// Provenance labels written onto every replica
pub mod labels {
    pub const FROM_NAME: &str = "secretsync.ndp.netease.com/from-name";
    pub const FROM_NAMESPACE: &str = "secretsync.ndp.netease.com/from-namespace";
    pub const FROM_UID: &str = "secretsync.ndp.netease.com/from-uuid";
}

/// The controller name used in logs and registration
pub const CONTROLLER_NAME: &str = "secretsync-controller";

/// Leader election defaults
pub mod leader {
    /// Name of the Lease object the operator replicas compete for
    pub const DEFAULT_LEASE_NAME: &str = "k8s-secret-sync-operator-lock";
    /// How long a lease stays valid without renewal
    pub const DEFAULT_LEASE_DURATION_SECS: u64 = 15;
    /// How often the holder renews, and how often others retry
    pub const DEFAULT_RENEW_INTERVAL_SECS: u64 = 5;
}

/// Requeue configuration
pub mod requeue {
    /// Seconds to wait before retrying a failed reconciliation
    pub const DEFAULT_ERROR_REQUEUE_SECS: u64 = 60;
}
