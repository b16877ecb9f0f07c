// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Replica garbage collection and synchronization logic.

pub mod annotations;
pub mod garbage;
pub mod replicas;

pub use annotations::{parse_targets, provenance_labels, target_namespaces};
pub use garbage::collect_orphans;
pub use replicas::{build_replica, synchronize, SyncSummary};
