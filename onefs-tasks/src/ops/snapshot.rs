// SPDX-License-Identifier: GPL-3.0-only

use async_trait::async_trait;

use onefs_types::{Snapshot, SnapshotCreate, SnapshotUpdate};

use crate::error::TaskError;

#[async_trait]
pub trait SnapshotOps: Send + Sync {
    async fn snapshot(&self, name: &str) -> Result<Option<Snapshot>, TaskError>;

    async fn snapshots(&self, kind: Option<&str>) -> Result<Vec<Snapshot>, TaskError>;

    async fn create_snapshot(&self, body: &SnapshotCreate) -> Result<Snapshot, TaskError>;

    async fn update_snapshot(&self, name: &str, body: &SnapshotUpdate) -> Result<(), TaskError>;

    async fn delete_snapshot(&self, name: &str) -> Result<(), TaskError>;
}
