// SPDX-License-Identifier: GPL-3.0-only

//! Access zone task: reconcile the default SMB/NFS protocol settings of a
//! zone
//!
//! Zones themselves are not created or deleted here; the task manages only
//! the per-zone protocol defaults and reports the zone with both settings
//! sections embedded.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::info;

use onefs_types::protocol::{
    NfsExportSettings, NfsExportSettingsUpdate, NfsSettingsUpdate, NfsZoneSettings,
    NfsZoneSettingsUpdate, SmbSettingsApply, SmbSettingsUpdate, SmbShareSettings,
};
use onefs_types::{AccessZone, State, format_octal};

use crate::error::TaskError;
use crate::ops::{ProtocolOps, ZoneOps};
use crate::tasks::given_differs;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessZoneParams {
    /// Zone name (case-insensitive on the array)
    pub az_name: String,

    pub state: State,

    /// Desired default SMB share settings
    #[serde(default)]
    pub smb: Option<SmbSettingsUpdate>,

    /// Desired default NFS settings (both sections in one block)
    #[serde(default)]
    pub nfs: Option<NfsSettingsUpdate>,
}

#[derive(Debug, Serialize)]
pub struct AccessZoneReport {
    pub changed: bool,
    pub smb_modify_flag: bool,
    pub nfs_modify_flag: bool,
    pub access_zone_details: Value,
}

struct ZoneState {
    zone: AccessZone,
    smb: SmbShareSettings,
    nfs_export: NfsExportSettings,
    nfs_zone: NfsZoneSettings,
}

pub async fn run<A>(array: &A, params: &AccessZoneParams) -> Result<AccessZoneReport, TaskError>
where
    A: ZoneOps + ProtocolOps,
{
    let name = &params.az_name;
    let state = fetch_state(array, name).await?;

    let Some(mut state_now) = state else {
        if params.state.is_present() {
            return Err(TaskError::failed(format!(
                "Access zone {name} not found - creation of access zones is not supported"
            )));
        }
        return Ok(AccessZoneReport {
            changed: false,
            smb_modify_flag: false,
            nfs_modify_flag: false,
            access_zone_details: json!({}),
        });
    };

    if !params.state.is_present() {
        return Err(TaskError::failed(
            "Deletion of access zones is not supported; only the default protocol settings can be modified",
        ));
    }

    let mut smb_modify_flag = false;
    if let Some(smb) = &params.smb {
        let desired = smb
            .to_apply()
            .map_err(|e| TaskError::validation(e.to_string()))?;
        if smb_settings_differ(&state_now.smb, &desired) {
            info!(zone = %name, "updating default SMB share settings");
            array
                .apply_smb_settings(&desired, name)
                .await
                .map_err(|e| {
                    e.context(format!("Modify SMB share settings of access zone {name}"))
                })?;
            smb_modify_flag = true;
        }
    }

    let mut nfs_modify_flag = false;
    if let Some(nfs) = &params.nfs {
        let (export_update, zone_update) = nfs.split();
        if nfs_export_settings_differ(&state_now.nfs_export, &export_update) {
            info!(zone = %name, "updating default NFS export settings");
            array
                .apply_nfs_export_settings(&export_update, name)
                .await
                .map_err(|e| {
                    e.context(format!("Modify NFS export settings of access zone {name}"))
                })?;
            nfs_modify_flag = true;
        }
        if nfs_zone_settings_differ(&state_now.nfs_zone, &zone_update) {
            info!(zone = %name, "updating NFS zone settings");
            array
                .apply_nfs_zone_settings(&zone_update, name)
                .await
                .map_err(|e| {
                    e.context(format!("Modify NFS zone settings of access zone {name}"))
                })?;
            nfs_modify_flag = true;
        }
    }

    let changed = smb_modify_flag || nfs_modify_flag;
    if changed {
        state_now = fetch_state(array, name).await?.ok_or_else(|| {
            TaskError::failed(format!("Access zone {name} disappeared during modification"))
        })?;
    }

    Ok(AccessZoneReport {
        changed,
        smb_modify_flag,
        nfs_modify_flag,
        access_zone_details: render_details(&state_now),
    })
}

async fn fetch_state<A>(array: &A, name: &str) -> Result<Option<ZoneState>, TaskError>
where
    A: ZoneOps + ProtocolOps,
{
    let Some(zone) = array
        .zone(name)
        .await
        .map_err(|e| e.context(format!("Get details of access zone {name}")))?
    else {
        return Ok(None);
    };
    let smb = array.smb_settings(name).await.map_err(|e| {
        e.context(format!("Get details of SMB share settings of access zone {name}"))
    })?;
    let nfs_export = array.nfs_export_settings(name).await.map_err(|e| {
        e.context(format!("Get details of NFS export settings of access zone {name}"))
    })?;
    let nfs_zone = array.nfs_zone_settings(name).await.map_err(|e| {
        e.context(format!("Get details of NFS zone settings of access zone {name}"))
    })?;
    Ok(Some(ZoneState { zone, smb, nfs_export, nfs_zone }))
}

/// One settings field diverges when the desired value is given and differs.
pub fn smb_settings_differ(observed: &SmbShareSettings, desired: &SmbSettingsApply) -> bool {
    given_differs(&desired.create_permissions, &observed.create_permissions)
        || given_differs(&desired.directory_create_mask, &observed.directory_create_mask)
        || given_differs(&desired.directory_create_mode, &observed.directory_create_mode)
        || given_differs(&desired.file_create_mask, &observed.file_create_mask)
        || given_differs(&desired.file_create_mode, &observed.file_create_mode)
        || given_differs(&desired.access_based_enumeration, &observed.access_based_enumeration)
        || given_differs(
            &desired.access_based_enumeration_root_only,
            &observed.access_based_enumeration_root_only,
        )
        || given_differs(&desired.ntfs_acl_support, &observed.ntfs_acl_support)
        || given_differs(&desired.oplocks, &observed.oplocks)
}

pub fn nfs_export_settings_differ(
    observed: &NfsExportSettings,
    desired: &NfsExportSettingsUpdate,
) -> bool {
    given_differs(&desired.commit_asynchronous, &observed.commit_asynchronous)
}

pub fn nfs_zone_settings_differ(
    observed: &NfsZoneSettings,
    desired: &NfsZoneSettingsUpdate,
) -> bool {
    given_differs(&desired.nfsv4_domain, &observed.nfsv4_domain)
        || given_differs(&desired.nfsv4_allow_numeric_ids, &observed.nfsv4_allow_numeric_ids)
        || given_differs(&desired.nfsv4_no_domain, &observed.nfsv4_no_domain)
        || given_differs(&desired.nfsv4_no_domain_uids, &observed.nfsv4_no_domain_uids)
        || given_differs(&desired.nfsv4_no_names, &observed.nfsv4_no_names)
}

/// The zone document with both protocol settings sections embedded, the SMB
/// mask/mode fields additionally rendered in octal.
fn render_details(state: &ZoneState) -> Value {
    let mut details = match serde_json::to_value(&state.zone) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    details.insert(
        "nfs_settings".to_string(),
        json!({
            "export_settings": state.nfs_export,
            "zone_settings": state.nfs_zone,
        }),
    );
    details.insert("smb_settings".to_string(), smb_settings_with_octal(&state.smb));
    Value::Object(details)
}

fn smb_settings_with_octal(settings: &SmbShareSettings) -> Value {
    let mut map = match serde_json::to_value(settings) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    let octal_fields = [
        ("directory_create_mask", settings.directory_create_mask),
        ("directory_create_mode", settings.directory_create_mode),
        ("file_create_mask", settings.file_create_mask),
        ("file_create_mode", settings.file_create_mode),
    ];
    for (field, value) in octal_fields {
        if let Some(bits) = value {
            map.insert(format!("{field}(octal)"), Value::String(format_octal(bits)));
        }
    }
    Value::Object(map)
}
