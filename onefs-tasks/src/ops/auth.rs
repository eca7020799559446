// SPDX-License-Identifier: GPL-3.0-only

use async_trait::async_trait;

use onefs_types::{AuthGroup, AuthUser};
use serde_json::Value;

use crate::error::TaskError;

#[async_trait]
pub trait AuthOps: Send + Sync {
    async fn auth_user(
        &self,
        name: &str,
        zone: &str,
        provider: &str,
    ) -> Result<AuthUser, TaskError>;

    async fn auth_group(
        &self,
        name: &str,
        zone: &str,
        provider: &str,
    ) -> Result<AuthGroup, TaskError>;

    async fn auth_users(&self, zone: &str) -> Result<Value, TaskError>;

    async fn auth_groups(&self, zone: &str) -> Result<Value, TaskError>;

    async fn providers_summary(&self, zone: &str) -> Result<Value, TaskError>;
}
