// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mock Kubernetes API server and an in-memory secret store.

use crate::error::Result;
use crate::kubernetes::SecretStore;
use async_trait::async_trait;
use http::{Request, Response};
use http_body_util::BodyExt;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::error::ErrorResponse;
use kube::{Client, ResourceExt};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::result::Result as StdResult;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A request seen by [`MockService`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub body: String,
}

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for requests with the given method matching the exact path
    pub fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    /// All requests received so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "https://kubernetes.default.svc")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        self.responses
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = Pin<Box<dyn Future<Output = StdResult<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<StdResult<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let (parts, body) = req.into_parts();
        let method = parts.method.to_string();
        let path = parts.uri.path().to_string();
        let query = parts.uri.query().unwrap_or_default().to_string();

        let response = self.find_response(&method, &path);
        let requests = self.requests.clone();

        Box::pin(async move {
            let body = match body.collect().await {
                Ok(collected) => String::from_utf8_lossy(&collected.to_bytes()).into_owned(),
                Err(_) => String::new(),
            };
            requests.lock().unwrap().push(RecordedRequest {
                method,
                path,
                query,
                body,
            });

            let (status, body) =
                response.unwrap_or_else(|| (404, not_found_json("secrets", "unknown")));
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a mock secret JSON response
pub fn secret_json(namespace: &str, name: &str) -> String {
    secret_value(namespace, name).to_string()
}

/// Create a mock secret list JSON response
pub fn secret_list_json(secrets: &[(&str, &str)]) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "SecretList",
        "metadata": { "resourceVersion": "1" },
        "items": secrets
            .iter()
            .map(|(namespace, name)| secret_value(namespace, name))
            .collect::<Vec<_>>()
    })
    .to_string()
}

fn secret_value(namespace: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": "test-uid"
        },
        "type": "Opaque"
    })
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// Create a failure `Status` response with the given code and reason
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Build a secret with string data
pub fn make_secret(
    namespace: &str,
    name: &str,
    data: &[(&str, &str)],
    annotations: Option<BTreeMap<String, String>>,
) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            uid: Some(format!("uid-{namespace}-{name}")),
            annotations,
            ..Default::default()
        },
        data: Some(
            data.iter()
                .map(|(k, v)| (k.to_string(), ByteString(v.as_bytes().to_vec())))
                .collect(),
        ),
        type_: Some("Opaque".to_string()),
        ..Default::default()
    }
}

/// Store operations, as recorded by [`MemorySecretStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Get,
    List,
    Create,
    Update,
    Delete,
}

/// An in-memory [`SecretStore`] that logs every call and can fail on demand.
///
/// `list_by_labels` understands comma separated `key=value` selectors only.
#[derive(Clone, Default)]
pub struct MemorySecretStore {
    secrets: Arc<Mutex<BTreeMap<(String, String), Secret>>>,
    calls: Arc<Mutex<Vec<(Op, String)>>>,
    failures: Arc<Mutex<Vec<(Op, String)>>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a secret directly into the store without logging a call
    pub fn insert(&self, secret: Secret) {
        let key = (secret.namespace().unwrap_or_default(), secret.name_any());
        self.secrets.lock().unwrap().insert(key, secret);
    }

    pub fn secret(&self, namespace: &str, name: &str) -> Option<Secret> {
        self.secrets
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    /// Namespaces holding a secret called `name`
    pub fn namespaces_of(&self, name: &str) -> Vec<String> {
        self.secrets
            .lock()
            .unwrap()
            .keys()
            .filter(|(_, n)| n == name)
            .map(|(ns, _)| ns.clone())
            .collect()
    }

    /// Make every `op` against `namespace` fail with a server error
    pub fn fail_on(&self, op: Op, namespace: &str) {
        self.failures
            .lock()
            .unwrap()
            .push((op, namespace.to_string()));
    }

    pub fn calls(&self) -> Vec<(Op, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls.lock().unwrap().iter().filter(|(o, _)| *o == op).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, op: Op, namespace: &str) -> Result<()> {
        self.calls.lock().unwrap().push((op, namespace.to_string()));
        let failing = self
            .failures
            .lock()
            .unwrap()
            .iter()
            .any(|(o, ns)| *o == op && ns == namespace);
        if failing {
            return Err(kube::Error::Api(ErrorResponse {
                status: "Failure".to_string(),
                message: format!("injected {:?} failure in {}", op, namespace),
                reason: "InternalError".to_string(),
                code: 500,
            })
            .into());
        }
        Ok(())
    }
}

fn matches_selector(secret: &Secret, selector: &str) -> bool {
    selector.split(',').all(|term| match term.split_once('=') {
        Some((key, value)) => secret.labels().get(key).is_some_and(|v| v == value),
        None => false,
    })
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Secret>> {
        self.record(Op::Get, namespace)?;
        Ok(self.secret(namespace, name))
    }

    async fn list_by_labels(&self, selector: &str) -> Result<Vec<Secret>> {
        self.record(Op::List, "")?;
        Ok(self
            .secrets
            .lock()
            .unwrap()
            .values()
            .filter(|s| matches_selector(s, selector))
            .cloned()
            .collect())
    }

    async fn create(&self, secret: &Secret) -> Result<()> {
        let namespace = secret.namespace().unwrap_or_default();
        self.record(Op::Create, &namespace)?;
        self.insert(secret.clone());
        Ok(())
    }

    async fn update(&self, secret: &Secret) -> Result<()> {
        let namespace = secret.namespace().unwrap_or_default();
        self.record(Op::Update, &namespace)?;
        self.insert(secret.clone());
        Ok(())
    }

    async fn delete(&self, secret: &Secret) -> Result<()> {
        let namespace = secret.namespace().unwrap_or_default();
        self.record(Op::Delete, &namespace)?;
        self.secrets
            .lock()
            .unwrap()
            .remove(&(namespace, secret.name_any()));
        Ok(())
    }
}
