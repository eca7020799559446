// SPDX-License-Identifier: GPL-3.0-only

//! Cluster-level read endpoints used by facts gathering

use serde_json::Value;

use crate::client::PapiClient;
use crate::error::Result;

impl PapiClient {
    /// Full cluster configuration document.
    pub async fn get_cluster_config(&self) -> Result<Value> {
        self.get_json("/platform/1/cluster/config", &[]).await
    }

    /// Cluster name and description.
    pub async fn get_cluster_identity(&self) -> Result<Value> {
        self.get_json("/platform/1/cluster/identity", &[]).await
    }

    /// Contact information of the cluster owner.
    pub async fn get_cluster_owner(&self) -> Result<Value> {
        self.get_json("/platform/1/cluster/owner", &[]).await
    }

    /// External IP addresses of the cluster, a bare JSON array.
    pub async fn get_cluster_external_ips(&self) -> Result<Vec<String>> {
        self.get_json("/platform/1/cluster/external-ips", &[]).await
    }

    /// OneFS version per node.
    pub async fn get_cluster_version(&self) -> Result<Value> {
        self.get_json("/platform/3/cluster/version", &[]).await
    }

    /// Node inventory.
    pub async fn get_cluster_nodes(&self) -> Result<Value> {
        self.get_json("/platform/3/cluster/nodes", &[]).await
    }
}
