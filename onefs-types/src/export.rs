//! NFS export models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An NFS export as reported by the array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NfsExport {
    /// Numeric export id
    pub id: Option<i64>,

    /// Access zone the export belongs to
    pub zone: Option<String>,

    /// Exported filesystem paths
    #[serde(default)]
    pub paths: Vec<String>,

    pub description: Option<String>,

    pub read_only: Option<bool>,

    /// Whether all subdirectories under the paths are mountable
    pub all_dirs: Option<bool>,

    pub clients: Option<Vec<String>>,

    pub read_only_clients: Option<Vec<String>>,

    pub read_write_clients: Option<Vec<String>>,

    pub root_clients: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body for creating an NFS export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NfsExportCreate {
    pub paths: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub clients: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only_clients: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_write_clients: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_clients: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_dirs: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body for updating an NFS export; only set fields are sent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NfsExportUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clients: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only_clients: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_write_clients: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_clients: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_dirs: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NfsExportUpdate {
    pub fn is_empty(&self) -> bool {
        self.clients.is_none()
            && self.read_only_clients.is_none()
            && self.read_write_clients.is_none()
            && self.root_clients.is_none()
            && self.read_only.is_none()
            && self.all_dirs.is_none()
            && self.description.is_none()
    }
}
