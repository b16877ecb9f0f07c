// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secret storage used by the reconciler

use crate::error::Result;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    api::{DeleteParams, ListParams, PostParams},
    Api, Client, ResourceExt,
};
use tracing::{debug, instrument};

/// The operations the reconciler needs on secrets.
///
/// A missing secret is reported as `Ok(None)` from [`SecretStore::get`], never as an error.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch a secret by namespace and name
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Secret>>;

    /// List secrets in all namespaces matching a label selector
    async fn list_by_labels(&self, selector: &str) -> Result<Vec<Secret>>;

    async fn create(&self, secret: &Secret) -> Result<()>;

    /// Replace a secret wholesale
    async fn update(&self, secret: &Secret) -> Result<()>;

    async fn delete(&self, secret: &Secret) -> Result<()>;
}

/// [`SecretStore`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
}

impl KubeSecretStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn namespaced(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(resp) if resp.code == 404)
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    #[instrument(skip(self))]
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Secret>> {
        match self.namespaced(namespace).get(name).await {
            Ok(secret) => Ok(Some(secret)),
            Err(e) if is_not_found(&e) => {
                debug!("Secret {}/{} not found", namespace, name);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn list_by_labels(&self, selector: &str) -> Result<Vec<Secret>> {
        let secrets: Api<Secret> = Api::all(self.client.clone());
        let lp = ListParams::default().labels(selector);
        Ok(secrets.list(&lp).await?.items)
    }

    async fn create(&self, secret: &Secret) -> Result<()> {
        let namespace = secret.namespace().unwrap_or_default();
        self.namespaced(&namespace)
            .create(&PostParams::default(), secret)
            .await?;
        Ok(())
    }

    async fn update(&self, secret: &Secret) -> Result<()> {
        let namespace = secret.namespace().unwrap_or_default();
        self.namespaced(&namespace)
            .replace(&secret.name_any(), &PostParams::default(), secret)
            .await?;
        Ok(())
    }

    async fn delete(&self, secret: &Secret) -> Result<()> {
        let namespace = secret.namespace().unwrap_or_default();
        let name = secret.name_any();
        match self
            .namespaced(&namespace)
            .delete(&name, &DeleteParams::default())
            .await
        {
            Ok(_) => Ok(()),
            // Already gone, nothing left to collect
            Err(e) if is_not_found(&e) => {
                debug!("Secret {}/{} was already deleted", namespace, name);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
