// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::leader::{
    DEFAULT_LEASE_DURATION_SECS, DEFAULT_LEASE_NAME, DEFAULT_RENEW_INTERVAL_SECS,
};
use crate::constants::requeue::DEFAULT_ERROR_REQUEUE_SECS;
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Restrict the source watch to a single namespace. `None` watches the whole cluster.
    /// Replica lookup is always cluster-wide.
    pub watch_namespace: Option<String>,
    /// Delay before a failed reconciliation is retried
    pub error_requeue: Duration,
    /// Lease settings, `None` when leader election is disabled
    pub leader_election: Option<LeaderElection>,
}

/// Lease-based leader election settings
#[derive(Debug, Clone)]
pub struct LeaderElection {
    pub lease_name: String,
    pub lease_namespace: String,
    /// Holder identity written into the lease, unique per replica of the operator
    pub identity: String,
    pub lease_duration: Duration,
    pub renew_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watch_namespace: None,
            error_requeue: Duration::from_secs(DEFAULT_ERROR_REQUEUE_SECS),
            leader_election: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let watch_namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.is_empty());

        let error_requeue_secs = match lookup("ERROR_REQUEUE_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("ERROR_REQUEUE_SECS is not a valid number: {raw}"))?,
            None => DEFAULT_ERROR_REQUEUE_SECS,
        };

        let leader_elect = match lookup("LEADER_ELECT") {
            Some(raw) => raw
                .parse::<bool>()
                .with_context(|| format!("LEADER_ELECT is not a valid boolean: {raw}"))?,
            None => true,
        };

        let leader_election = leader_elect.then(|| LeaderElection {
            lease_name: lookup("LEASE_NAME")
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| DEFAULT_LEASE_NAME.to_string()),
            lease_namespace: lookup("LEASE_NAMESPACE")
                .or_else(|| lookup("POD_NAMESPACE"))
                .filter(|ns| !ns.is_empty())
                .unwrap_or_else(|| "default".to_string()),
            identity: lookup("POD_NAME")
                .or_else(|| lookup("HOSTNAME"))
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("secretsync-{}", std::process::id())),
            lease_duration: Duration::from_secs(DEFAULT_LEASE_DURATION_SECS),
            renew_interval: Duration::from_secs(DEFAULT_RENEW_INTERVAL_SECS),
        });

        Ok(Config {
            watch_namespace,
            error_requeue: Duration::from_secs(error_requeue_secs),
            leader_election,
        })
    }
}
