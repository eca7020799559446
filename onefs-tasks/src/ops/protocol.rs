// SPDX-License-Identifier: GPL-3.0-only

use async_trait::async_trait;

use onefs_types::protocol::{
    NfsExportSettings, NfsExportSettingsUpdate, NfsZoneSettings, NfsZoneSettingsUpdate,
    SmbSettingsApply, SmbShare, SmbShareSettings,
};

use crate::error::TaskError;

#[async_trait]
pub trait ProtocolOps: Send + Sync {
    async fn smb_settings(&self, zone: &str) -> Result<SmbShareSettings, TaskError>;

    async fn apply_smb_settings(
        &self,
        settings: &SmbSettingsApply,
        zone: &str,
    ) -> Result<(), TaskError>;

    async fn nfs_export_settings(&self, zone: &str) -> Result<NfsExportSettings, TaskError>;

    async fn apply_nfs_export_settings(
        &self,
        settings: &NfsExportSettingsUpdate,
        zone: &str,
    ) -> Result<(), TaskError>;

    async fn nfs_zone_settings(&self, zone: &str) -> Result<NfsZoneSettings, TaskError>;

    async fn apply_nfs_zone_settings(
        &self,
        settings: &NfsZoneSettingsUpdate,
        zone: &str,
    ) -> Result<(), TaskError>;

    async fn smb_shares(&self, zone: &str) -> Result<Vec<SmbShare>, TaskError>;
}
