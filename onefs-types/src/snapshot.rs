//! Snapshot models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A filesystem snapshot as reported by the array.
///
/// Alias listing entries reuse this shape: for those, `name` is the alias
/// name and `target_name`/`target_id` point at the snapshot the alias tracks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Numeric snapshot id
    pub id: Option<i64>,

    pub name: Option<String>,

    /// Path the snapshot captures (e.g. "/ifs/data/sample")
    pub path: Option<String>,

    /// Lifecycle state reported by the array ("active", "deleting", ...)
    pub state: Option<String>,

    /// Creation time (epoch seconds)
    pub created: Option<i64>,

    /// Expiration time (epoch seconds); absent when the snapshot is kept
    /// forever
    pub expires: Option<i64>,

    /// Alias name, when the array reports one inline
    pub alias: Option<String>,

    /// Alias entries only: id of the snapshot this alias tracks
    pub target_id: Option<i64>,

    /// Alias entries only: name of the snapshot this alias tracks
    pub target_name: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body for creating a snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotCreate {
    pub name: String,

    pub path: String,

    /// Expiration epoch; omitted means the snapshot never expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// Body for updating a snapshot; only set fields are sent.
///
/// `expires` is doubly optional: `Some(None)` serializes as an explicit null,
/// which clears the expiration on the array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<Option<i64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}
