// SPDX-License-Identifier: GPL-3.0-only

//! SnapshotIQ endpoints

use onefs_types::{Snapshot, SnapshotCreate, SnapshotUpdate};
use serde::Deserialize;

use crate::client::PapiClient;
use crate::error::{PapiError, Result};

#[derive(Deserialize)]
struct SnapshotsWrapper {
    snapshots: Vec<Snapshot>,
}

impl PapiClient {
    /// List snapshots, optionally filtered by kind (`"alias"` lists alias
    /// entries instead of real snapshots).
    pub async fn list_snapshots(&self, kind: Option<&str>) -> Result<Vec<Snapshot>> {
        let query: Vec<(&str, String)> = match kind {
            Some(kind) => vec![("type", kind.to_string())],
            None => Vec::new(),
        };
        let wrapper: SnapshotsWrapper = self
            .get_json("/platform/1/snapshot/snapshots", &query)
            .await?;
        Ok(wrapper.snapshots)
    }

    /// Fetch one snapshot by name.
    pub async fn get_snapshot(&self, name: &str) -> Result<Snapshot> {
        let wrapper: SnapshotsWrapper = self
            .get_json(&format!("/platform/1/snapshot/snapshots/{name}"), &[])
            .await?;
        wrapper
            .snapshots
            .into_iter()
            .next()
            .ok_or_else(|| PapiError::UnexpectedBody("empty snapshots list".into()))
    }

    /// Create a snapshot of a directory.
    pub async fn create_snapshot(&self, body: &SnapshotCreate) -> Result<Snapshot> {
        self.post_json("/platform/1/snapshot/snapshots", &[], body)
            .await
    }

    /// Update a snapshot by name. Renames take effect immediately, so later
    /// calls must use the new name.
    pub async fn update_snapshot(&self, name: &str, body: &SnapshotUpdate) -> Result<()> {
        self.put_json(&format!("/platform/1/snapshot/snapshots/{name}"), &[], body)
            .await
    }

    /// Delete a snapshot by name.
    pub async fn delete_snapshot(&self, name: &str) -> Result<()> {
        self.delete(&format!("/platform/1/snapshot/snapshots/{name}"), &[])
            .await
    }
}
