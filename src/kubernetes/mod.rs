// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes access for reading and writing secrets, and the leader lease.

pub mod leader;
pub mod store;

pub use leader::LeaseLock;
pub use store::{KubeSecretStore, SecretStore};
