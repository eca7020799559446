// SPDX-License-Identifier: GPL-3.0-only

//! SMB and NFS protocol endpoints

use onefs_types::protocol::{
    NfsExportSettings, NfsExportSettingsUpdate, NfsZoneSettings, NfsZoneSettingsUpdate,
    SmbSettingsApply, SmbShare, SmbShareSettings,
};
use onefs_types::{NfsExport, NfsExportCreate, NfsExportUpdate};
use serde::Deserialize;

use crate::client::PapiClient;
use crate::error::{PapiError, Result};

#[derive(Deserialize)]
struct SmbSettingsWrapper {
    settings: SmbShareSettings,
}

#[derive(Deserialize)]
struct NfsExportSettingsWrapper {
    settings: NfsExportSettings,
}

#[derive(Deserialize)]
struct NfsZoneSettingsWrapper {
    settings: NfsZoneSettings,
}

#[derive(Deserialize)]
struct SmbSharesWrapper {
    shares: Vec<SmbShare>,
}

#[derive(Deserialize)]
struct NfsExportsWrapper {
    exports: Vec<NfsExport>,
}

#[derive(Deserialize)]
struct CreatedId {
    id: i64,
}

fn zone_query(zone: &str) -> [(&'static str, String); 1] {
    [("zone", zone.to_string())]
}

impl PapiClient {
    /// Zone-wide default SMB share settings.
    pub async fn get_smb_settings(&self, zone: &str) -> Result<SmbShareSettings> {
        let wrapper: SmbSettingsWrapper = self
            .get_json("/platform/3/protocols/smb/settings/share", &zone_query(zone))
            .await?;
        Ok(wrapper.settings)
    }

    /// Apply SMB share settings for a zone. Partial bodies are fine; fields
    /// left out keep their current value.
    pub async fn update_smb_settings(&self, settings: &SmbSettingsApply, zone: &str) -> Result<()> {
        self.put_json("/platform/3/protocols/smb/settings/share", &zone_query(zone), settings)
            .await
    }

    /// Zone-wide NFS export settings.
    pub async fn get_nfs_export_settings(&self, zone: &str) -> Result<NfsExportSettings> {
        let wrapper: NfsExportSettingsWrapper = self
            .get_json("/platform/2/protocols/nfs/settings/export", &zone_query(zone))
            .await?;
        Ok(wrapper.settings)
    }

    pub async fn update_nfs_export_settings(
        &self,
        settings: &NfsExportSettingsUpdate,
        zone: &str,
    ) -> Result<()> {
        self.put_json("/platform/2/protocols/nfs/settings/export", &zone_query(zone), settings)
            .await
    }

    /// Zone-wide NFSv4 identity settings.
    pub async fn get_nfs_zone_settings(&self, zone: &str) -> Result<NfsZoneSettings> {
        let wrapper: NfsZoneSettingsWrapper = self
            .get_json("/platform/2/protocols/nfs/settings/zone", &zone_query(zone))
            .await?;
        Ok(wrapper.settings)
    }

    pub async fn update_nfs_zone_settings(
        &self,
        settings: &NfsZoneSettingsUpdate,
        zone: &str,
    ) -> Result<()> {
        self.put_json("/platform/2/protocols/nfs/settings/zone", &zone_query(zone), settings)
            .await
    }

    /// SMB shares visible in a zone.
    pub async fn list_smb_shares(&self, zone: &str) -> Result<Vec<SmbShare>> {
        let wrapper: SmbSharesWrapper = self
            .get_json("/platform/3/protocols/smb/shares", &zone_query(zone))
            .await?;
        Ok(wrapper.shares)
    }

    /// NFS exports in a zone whose path list contains `path`.
    pub async fn list_nfs_exports(&self, path: &str, zone: &str) -> Result<Vec<NfsExport>> {
        let query = [("path", path.to_string()), ("zone", zone.to_string())];
        let wrapper: NfsExportsWrapper = self
            .get_json("/platform/2/protocols/nfs/exports", &query)
            .await?;
        Ok(wrapper.exports)
    }

    /// Fetch one NFS export by id.
    pub async fn get_nfs_export(&self, id: i64, zone: &str) -> Result<NfsExport> {
        let wrapper: NfsExportsWrapper = self
            .get_json(&format!("/platform/2/protocols/nfs/exports/{id}"), &zone_query(zone))
            .await?;
        wrapper
            .exports
            .into_iter()
            .next()
            .ok_or_else(|| PapiError::UnexpectedBody("empty exports list".into()))
    }

    /// Create an NFS export. The body carries the target zone; returns the
    /// id assigned by the array.
    pub async fn create_nfs_export(&self, export: &NfsExportCreate) -> Result<i64> {
        let created: CreatedId = self
            .post_json("/platform/2/protocols/nfs/exports", &[], export)
            .await?;
        Ok(created.id)
    }

    pub async fn update_nfs_export(
        &self,
        id: i64,
        update: &NfsExportUpdate,
        zone: &str,
    ) -> Result<()> {
        self.put_json(&format!("/platform/2/protocols/nfs/exports/{id}"), &zone_query(zone), update)
            .await
    }

    pub async fn delete_nfs_export(&self, id: i64, zone: &str) -> Result<()> {
        self.delete(&format!("/platform/2/protocols/nfs/exports/{id}"), &zone_query(zone))
            .await
    }
}
