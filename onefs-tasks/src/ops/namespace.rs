// SPDX-License-Identifier: GPL-3.0-only

use async_trait::async_trait;

use onefs_types::NamespaceAcl;
use serde_json::Value;

use crate::error::TaskError;

/// Directory operations through the RAN namespace API. Paths are given
/// without a leading slash, the way that API addresses them.
#[async_trait]
pub trait NamespaceOps: Send + Sync {
    async fn directory_metadata(&self, path: &str) -> Result<Option<Value>, TaskError>;

    async fn create_directory(
        &self,
        path: &str,
        recursive: bool,
        initial_acl: Option<&str>,
    ) -> Result<(), TaskError>;

    async fn delete_directory(&self, path: &str) -> Result<(), TaskError>;

    async fn acl(&self, path: &str) -> Result<NamespaceAcl, TaskError>;

    async fn set_acl(&self, path: &str, acl: &NamespaceAcl) -> Result<(), TaskError>;
}
