// SPDX-License-Identifier: GPL-3.0-only

use async_trait::async_trait;

use onefs_papi::QuotaQuery;
use onefs_types::{Quota, QuotaCreate, QuotaType, QuotaUpdate};

use crate::error::TaskError;

#[async_trait]
pub trait QuotaOps: Send + Sync {
    async fn quotas(&self, query: &QuotaQuery) -> Result<Vec<Quota>, TaskError>;

    async fn create_quota(
        &self,
        body: &QuotaCreate,
        zone: Option<&str>,
    ) -> Result<String, TaskError>;

    async fn update_quota(&self, id: &str, body: &QuotaUpdate) -> Result<(), TaskError>;

    async fn delete_quota(&self, id: &str) -> Result<(), TaskError>;

    async fn delete_quotas_on_path(
        &self,
        path: &str,
        quota_type: QuotaType,
    ) -> Result<(), TaskError>;
}
