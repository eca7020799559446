// SPDX-License-Identifier: GPL-3.0-only

use async_trait::async_trait;

use serde_json::Value;

use crate::error::TaskError;

#[async_trait]
pub trait ClusterOps: Send + Sync {
    async fn cluster_config(&self) -> Result<Value, TaskError>;

    async fn cluster_identity(&self) -> Result<Value, TaskError>;

    async fn cluster_owner(&self) -> Result<Value, TaskError>;

    async fn external_ips(&self) -> Result<Vec<String>, TaskError>;

    async fn cluster_version(&self) -> Result<Value, TaskError>;

    async fn cluster_nodes(&self) -> Result<Value, TaskError>;
}
