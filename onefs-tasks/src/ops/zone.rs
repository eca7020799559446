// SPDX-License-Identifier: GPL-3.0-only

use async_trait::async_trait;

use onefs_types::AccessZone;

use crate::error::TaskError;

#[async_trait]
pub trait ZoneOps: Send + Sync {
    async fn zone(&self, name: &str) -> Result<Option<AccessZone>, TaskError>;

    async fn zone_base_path(&self, name: &str) -> Result<String, TaskError>;

    async fn zones(&self) -> Result<Vec<AccessZone>, TaskError>;
}
