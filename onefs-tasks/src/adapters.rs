// SPDX-License-Identifier: GPL-3.0-only

//! Adapter trait implementations for the real array client

use async_trait::async_trait;
use serde_json::Value;

use onefs_papi::{PapiClient, QuotaQuery};
use onefs_types::protocol::{
    NfsExportSettings, NfsExportSettingsUpdate, NfsZoneSettings, NfsZoneSettingsUpdate,
    SmbSettingsApply, SmbShare, SmbShareSettings,
};
use onefs_types::{
    AccessZone, AuthGroup, AuthUser, NamespaceAcl, NfsExport, NfsExportCreate, NfsExportUpdate,
    Quota, QuotaCreate, QuotaType, QuotaUpdate, Snapshot, SnapshotCreate, SnapshotUpdate,
};

use crate::error::TaskError;
use crate::ops::{
    AuthOps, ClusterOps, NamespaceOps, NfsOps, ProtocolOps, QuotaOps, SnapshotOps, ZoneOps,
};

/// Map the array's 404 answer to `None`; everything else passes through.
fn absent_on_404<T>(result: onefs_papi::Result<T>) -> Result<Option<T>, TaskError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(TaskError::Api(e)),
    }
}

#[async_trait]
impl ZoneOps for PapiClient {
    async fn zone(&self, name: &str) -> Result<Option<AccessZone>, TaskError> {
        absent_on_404(self.get_zone(name).await)
    }

    async fn zone_base_path(&self, name: &str) -> Result<String, TaskError> {
        Ok(self.get_zone_base_path(name).await?)
    }

    async fn zones(&self) -> Result<Vec<AccessZone>, TaskError> {
        Ok(self.list_zones().await?)
    }
}

#[async_trait]
impl ProtocolOps for PapiClient {
    async fn smb_settings(&self, zone: &str) -> Result<SmbShareSettings, TaskError> {
        Ok(self.get_smb_settings(zone).await?)
    }

    async fn apply_smb_settings(
        &self,
        settings: &SmbSettingsApply,
        zone: &str,
    ) -> Result<(), TaskError> {
        Ok(self.update_smb_settings(settings, zone).await?)
    }

    async fn nfs_export_settings(&self, zone: &str) -> Result<NfsExportSettings, TaskError> {
        Ok(self.get_nfs_export_settings(zone).await?)
    }

    async fn apply_nfs_export_settings(
        &self,
        settings: &NfsExportSettingsUpdate,
        zone: &str,
    ) -> Result<(), TaskError> {
        Ok(self.update_nfs_export_settings(settings, zone).await?)
    }

    async fn nfs_zone_settings(&self, zone: &str) -> Result<NfsZoneSettings, TaskError> {
        Ok(self.get_nfs_zone_settings(zone).await?)
    }

    async fn apply_nfs_zone_settings(
        &self,
        settings: &NfsZoneSettingsUpdate,
        zone: &str,
    ) -> Result<(), TaskError> {
        Ok(self.update_nfs_zone_settings(settings, zone).await?)
    }

    async fn smb_shares(&self, zone: &str) -> Result<Vec<SmbShare>, TaskError> {
        Ok(self.list_smb_shares(zone).await?)
    }
}

#[async_trait]
impl NfsOps for PapiClient {
    async fn nfs_exports_by_path(
        &self,
        path: &str,
        zone: &str,
    ) -> Result<Vec<NfsExport>, TaskError> {
        Ok(self.list_nfs_exports(path, zone).await?)
    }

    async fn nfs_export(&self, id: i64, zone: &str) -> Result<Option<NfsExport>, TaskError> {
        absent_on_404(self.get_nfs_export(id, zone).await)
    }

    async fn create_nfs_export(&self, export: &NfsExportCreate) -> Result<i64, TaskError> {
        Ok(PapiClient::create_nfs_export(self, export).await?)
    }

    async fn update_nfs_export(
        &self,
        id: i64,
        update: &NfsExportUpdate,
        zone: &str,
    ) -> Result<(), TaskError> {
        Ok(PapiClient::update_nfs_export(self, id, update, zone).await?)
    }

    async fn delete_nfs_export(&self, id: i64, zone: &str) -> Result<(), TaskError> {
        Ok(PapiClient::delete_nfs_export(self, id, zone).await?)
    }
}

#[async_trait]
impl QuotaOps for PapiClient {
    async fn quotas(&self, query: &QuotaQuery) -> Result<Vec<Quota>, TaskError> {
        Ok(self.list_quotas(query).await?)
    }

    async fn create_quota(
        &self,
        body: &QuotaCreate,
        zone: Option<&str>,
    ) -> Result<String, TaskError> {
        Ok(PapiClient::create_quota(self, body, zone).await?)
    }

    async fn update_quota(&self, id: &str, body: &QuotaUpdate) -> Result<(), TaskError> {
        Ok(PapiClient::update_quota(self, id, body).await?)
    }

    async fn delete_quota(&self, id: &str) -> Result<(), TaskError> {
        Ok(PapiClient::delete_quota(self, id).await?)
    }

    async fn delete_quotas_on_path(
        &self,
        path: &str,
        quota_type: QuotaType,
    ) -> Result<(), TaskError> {
        Ok(self.delete_quotas_matching(path, quota_type).await?)
    }
}

#[async_trait]
impl NamespaceOps for PapiClient {
    async fn directory_metadata(&self, path: &str) -> Result<Option<Value>, TaskError> {
        absent_on_404(self.get_directory_metadata(path).await)
    }

    async fn create_directory(
        &self,
        path: &str,
        recursive: bool,
        initial_acl: Option<&str>,
    ) -> Result<(), TaskError> {
        Ok(PapiClient::create_directory(self, path, recursive, initial_acl).await?)
    }

    async fn delete_directory(&self, path: &str) -> Result<(), TaskError> {
        Ok(PapiClient::delete_directory(self, path).await?)
    }

    async fn acl(&self, path: &str) -> Result<NamespaceAcl, TaskError> {
        Ok(self.get_acl(path).await?)
    }

    async fn set_acl(&self, path: &str, acl: &NamespaceAcl) -> Result<(), TaskError> {
        Ok(PapiClient::set_acl(self, path, acl).await?)
    }
}

#[async_trait]
impl SnapshotOps for PapiClient {
    async fn snapshot(&self, name: &str) -> Result<Option<Snapshot>, TaskError> {
        absent_on_404(self.get_snapshot(name).await)
    }

    async fn snapshots(&self, kind: Option<&str>) -> Result<Vec<Snapshot>, TaskError> {
        Ok(self.list_snapshots(kind).await?)
    }

    async fn create_snapshot(&self, body: &SnapshotCreate) -> Result<Snapshot, TaskError> {
        Ok(PapiClient::create_snapshot(self, body).await?)
    }

    async fn update_snapshot(&self, name: &str, body: &SnapshotUpdate) -> Result<(), TaskError> {
        Ok(PapiClient::update_snapshot(self, name, body).await?)
    }

    async fn delete_snapshot(&self, name: &str) -> Result<(), TaskError> {
        Ok(PapiClient::delete_snapshot(self, name).await?)
    }
}

#[async_trait]
impl AuthOps for PapiClient {
    async fn auth_user(
        &self,
        name: &str,
        zone: &str,
        provider: &str,
    ) -> Result<AuthUser, TaskError> {
        Ok(self.get_auth_user(name, zone, provider).await?)
    }

    async fn auth_group(
        &self,
        name: &str,
        zone: &str,
        provider: &str,
    ) -> Result<AuthGroup, TaskError> {
        Ok(self.get_auth_group(name, zone, provider).await?)
    }

    async fn auth_users(&self, zone: &str) -> Result<Value, TaskError> {
        Ok(self.list_auth_users(zone).await?)
    }

    async fn auth_groups(&self, zone: &str) -> Result<Value, TaskError> {
        Ok(self.list_auth_groups(zone).await?)
    }

    async fn providers_summary(&self, zone: &str) -> Result<Value, TaskError> {
        Ok(self.get_providers_summary(zone).await?)
    }
}

#[async_trait]
impl ClusterOps for PapiClient {
    async fn cluster_config(&self) -> Result<Value, TaskError> {
        Ok(self.get_cluster_config().await?)
    }

    async fn cluster_identity(&self) -> Result<Value, TaskError> {
        Ok(self.get_cluster_identity().await?)
    }

    async fn cluster_owner(&self) -> Result<Value, TaskError> {
        Ok(self.get_cluster_owner().await?)
    }

    async fn external_ips(&self) -> Result<Vec<String>, TaskError> {
        Ok(self.get_cluster_external_ips().await?)
    }

    async fn cluster_version(&self) -> Result<Value, TaskError> {
        Ok(self.get_cluster_version().await?)
    }

    async fn cluster_nodes(&self) -> Result<Value, TaskError> {
        Ok(self.get_cluster_nodes().await?)
    }
}
