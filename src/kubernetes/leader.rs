// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Lease-based leader election, so only one operator replica reconciles at a time

use crate::config::LeaderElection;
use crate::error::Result;
use k8s_openapi::api::coordination::v1::{Lease, LeaseSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::MicroTime;
use k8s_openapi::chrono::{DateTime, Duration as ChronoDuration, Utc};
use kube::{
    api::{ObjectMeta, PostParams},
    Api, Client,
};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument, warn};

/// A `coordination.k8s.io/v1` Lease used as a leader lock
pub struct LeaseLock {
    api: Api<Lease>,
    settings: LeaderElection,
}

impl LeaseLock {
    pub fn new(client: Client, settings: LeaderElection) -> Self {
        Self {
            api: Api::namespaced(client, &settings.lease_namespace),
            settings,
        }
    }

    /// Take the lease if it is free or expired, or renew it if we already hold it.
    ///
    /// Returns `false` when another instance holds a valid lease, or won a
    /// concurrent write to it.
    #[instrument(
        skip(self),
        fields(lease = %self.settings.lease_name, identity = %self.settings.identity)
    )]
    pub async fn try_acquire_or_renew(&self) -> Result<bool> {
        let now = Utc::now();

        let Some(mut lease) = self.api.get_opt(&self.settings.lease_name).await? else {
            debug!("Lease does not exist yet, creating it");
            let lease = Lease {
                metadata: ObjectMeta {
                    name: Some(self.settings.lease_name.clone()),
                    namespace: Some(self.settings.lease_namespace.clone()),
                    ..Default::default()
                },
                spec: Some(self.claim(None, now)),
            };
            return won(self.api.create(&PostParams::default(), &lease).await);
        };

        if !is_acquirable(lease.spec.as_ref(), &self.settings.identity, now) {
            debug!("Lease is held by another instance");
            return Ok(false);
        }

        // Keeps the fetched resourceVersion, so a concurrent writer makes this replace fail
        lease.spec = Some(self.claim(lease.spec.as_ref(), now));
        won(self
            .api
            .replace(&self.settings.lease_name, &PostParams::default(), &lease)
            .await)
    }

    /// Block until this instance holds the lease
    pub async fn acquire(&self) -> Result<()> {
        loop {
            match self.try_acquire_or_renew().await {
                Ok(true) => {
                    info!(
                        "Acquired leader lease {}/{} as {}",
                        self.settings.lease_namespace,
                        self.settings.lease_name,
                        self.settings.identity
                    );
                    return Ok(());
                }
                Ok(false) => {
                    debug!(
                        "Not the leader, retrying in {:?}",
                        self.settings.renew_interval
                    );
                }
                Err(e) => {
                    warn!(
                        "Error acquiring leader lease: {}, retrying in {:?}",
                        e, self.settings.renew_interval
                    );
                }
            }

            sleep(self.settings.renew_interval).await;
        }
    }

    /// Keep renewing the lease. Returns an error once leadership is lost, or
    /// when no renewal succeeded for a whole lease duration.
    pub async fn hold(self) -> anyhow::Result<()> {
        let mut last_renewal = Instant::now();

        loop {
            sleep(self.settings.renew_interval).await;

            match self.try_acquire_or_renew().await {
                Ok(true) => last_renewal = Instant::now(),
                Ok(false) => anyhow::bail!(
                    "Lost leader lease {}/{} to another instance",
                    self.settings.lease_namespace,
                    self.settings.lease_name
                ),
                Err(e) if last_renewal.elapsed() >= self.settings.lease_duration => {
                    anyhow::bail!(
                        "Could not renew leader lease {}/{} within {:?}: {}",
                        self.settings.lease_namespace,
                        self.settings.lease_name,
                        self.settings.lease_duration,
                        e
                    )
                }
                Err(e) => warn!("Error renewing leader lease: {}", e),
            }
        }
    }

    fn claim(&self, current: Option<&LeaseSpec>, now: DateTime<Utc>) -> LeaseSpec {
        let holder = current.and_then(|s| s.holder_identity.as_deref());
        let renewing = holder == Some(self.settings.identity.as_str());
        let transitions = current.and_then(|s| s.lease_transitions).unwrap_or(0);

        LeaseSpec {
            holder_identity: Some(self.settings.identity.clone()),
            lease_duration_seconds: Some(
                i32::try_from(self.settings.lease_duration.as_secs()).unwrap_or(i32::MAX),
            ),
            acquire_time: if renewing {
                current.and_then(|s| s.acquire_time.clone())
            } else {
                Some(MicroTime(now))
            },
            renew_time: Some(MicroTime(now)),
            lease_transitions: Some(if renewing || current.is_none() {
                transitions
            } else {
                transitions + 1
            }),
            ..Default::default()
        }
    }
}

/// A 409 means another instance wrote the lease first
fn won(result: kube::Result<Lease>) -> Result<bool> {
    match result {
        Ok(_) => Ok(true),
        Err(kube::Error::Api(err)) if err.code == 409 => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Whether `identity` may take or renew a lease in state `spec` at `now`
pub fn is_acquirable(spec: Option<&LeaseSpec>, identity: &str, now: DateTime<Utc>) -> bool {
    let Some(spec) = spec else {
        return true;
    };
    match spec.holder_identity.as_deref() {
        None | Some("") => true,
        Some(holder) if holder == identity => true,
        Some(_) => is_expired(spec, now),
    }
}

fn is_expired(spec: &LeaseSpec, now: DateTime<Utc>) -> bool {
    let last_seen = spec.renew_time.as_ref().or(spec.acquire_time.as_ref());
    let Some(MicroTime(renewed)) = last_seen else {
        return true;
    };
    let duration = ChronoDuration::seconds(spec.lease_duration_seconds.unwrap_or(0).into());
    *renewed + duration < now
}
