// SPDX-License-Identifier: GPL-3.0-only

use async_trait::async_trait;

use onefs_types::{NfsExport, NfsExportCreate, NfsExportUpdate};

use crate::error::TaskError;

#[async_trait]
pub trait NfsOps: Send + Sync {
    async fn nfs_exports_by_path(
        &self,
        path: &str,
        zone: &str,
    ) -> Result<Vec<NfsExport>, TaskError>;

    async fn nfs_export(&self, id: i64, zone: &str) -> Result<Option<NfsExport>, TaskError>;

    async fn create_nfs_export(&self, export: &NfsExportCreate) -> Result<i64, TaskError>;

    async fn update_nfs_export(
        &self,
        id: i64,
        update: &NfsExportUpdate,
        zone: &str,
    ) -> Result<(), TaskError>;

    async fn delete_nfs_export(&self, id: i64, zone: &str) -> Result<(), TaskError>;
}
