// SPDX-License-Identifier: GPL-3.0-only

//! NFS export task: reconcile the export on a path, its client lists and
//! scalar settings
//!
//! Client lists are merged rather than replaced: `client_state` decides
//! whether the given addresses are added to or removed from what the array
//! already has, preserving the existing order.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use onefs_types::{NfsExport, NfsExportCreate, NfsExportUpdate, State};

use crate::error::TaskError;
use crate::ops::{NfsOps, ZoneOps};
use crate::tasks::{default_zone, is_system_zone};

/// Whether the given client addresses should be present in or absent from
/// the export's lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ClientState {
    #[serde(rename = "present-in-export")]
    PresentInExport,

    #[serde(rename = "absent-in-export")]
    AbsentInExport,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NfsExportParams {
    /// Exported path, absolute within the access zone
    pub path: String,

    pub state: State,

    #[serde(default = "default_zone")]
    pub access_zone: String,

    #[serde(default)]
    pub clients: Option<Vec<String>>,

    #[serde(default)]
    pub read_only_clients: Option<Vec<String>>,

    #[serde(default)]
    pub read_write_clients: Option<Vec<String>>,

    #[serde(default)]
    pub root_clients: Option<Vec<String>>,

    /// Required whenever any client list is given
    #[serde(default)]
    pub client_state: Option<ClientState>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub read_only: Option<bool>,

    /// Maps to the export's `all_dirs` flag
    #[serde(default)]
    pub sub_directories_mountable: Option<bool>,
}

impl NfsExportParams {
    fn client_lists(&self) -> [&Option<Vec<String>>; 4] {
        [&self.clients, &self.read_only_clients, &self.read_write_clients, &self.root_clients]
    }
}

#[derive(Debug, Serialize)]
pub struct NfsExportReport {
    pub changed: bool,
    #[serde(rename = "NFS_export_details")]
    pub nfs_export_details: Value,
}

pub async fn run<A>(array: &A, params: &NfsExportParams) -> Result<NfsExportReport, TaskError>
where
    A: ZoneOps + NfsOps,
{
    validate(params)?;

    let zone = &params.access_zone;
    let path = if is_system_zone(zone) {
        params.path.clone()
    } else {
        let base = array
            .zone_base_path(zone)
            .await
            .map_err(|e| e.context(format!("Fetch base path of access zone {zone}")))?;
        if params.path.starts_with('/') {
            format!("{base}{}", params.path)
        } else {
            format!("{base}/{}", params.path)
        }
    };

    let observed = fetch_export(array, &path, zone).await?;

    let mut changed = false;
    let mut details = json!({});
    match (params.state, observed) {
        (State::Present, None) => {
            info!(%path, %zone, "creating NFS export");
            let body = create_body(params, &path, zone);
            let id = array.create_nfs_export(&body).await.map_err(|e| {
                e.context(format!("Create NFS export for path {path} and access zone {zone}"))
            })?;
            let created = array.nfs_export(id, zone).await.map_err(|e| {
                e.context(format!("Get details of NFS export {id} in access zone {zone}"))
            })?;
            details = created
                .and_then(|export| serde_json::to_value(export).ok())
                .unwrap_or_else(|| json!({}));
            changed = true;
        }
        (State::Present, Some(export)) => {
            let update = build_update(&export, params);
            if update.is_empty() {
                details = serde_json::to_value(&export).unwrap_or_else(|_| json!({}));
            } else {
                let id = export_id(&export, &path)?;
                let export_zone = export.zone.as_deref().unwrap_or(zone);
                info!(%path, id, "modifying NFS export");
                array.update_nfs_export(id, &update, export_zone).await.map_err(|e| {
                    e.context(format!(
                        "Modify NFS export for path {path} and access zone {zone}"
                    ))
                })?;
                let refetched = fetch_export(array, &path, zone).await?;
                details = refetched
                    .and_then(|export| serde_json::to_value(export).ok())
                    .unwrap_or_else(|| json!({}));
                changed = true;
            }
        }
        (State::Absent, Some(export)) => {
            let id = export_id(&export, &path)?;
            let export_zone = export.zone.as_deref().unwrap_or(zone);
            info!(%path, id, "deleting NFS export");
            array.delete_nfs_export(id, export_zone).await.map_err(|e| {
                e.context(format!("Delete NFS export for path {path} and access zone {zone}"))
            })?;
            changed = true;
        }
        (State::Absent, None) => {}
    }

    Ok(NfsExportReport { changed, nfs_export_details: details })
}

fn validate(params: &NfsExportParams) -> Result<(), TaskError> {
    let any_clients = params.client_lists().iter().any(|list| list.is_some());
    if params.client_state.is_some() && !any_clients {
        return Err(TaskError::validation(
            "Invalid input: Client state is given, clients not specified",
        ));
    }
    if params.client_state.is_none() && any_clients {
        return Err(TaskError::validation(
            "Invalid input: Clients are given, client state not specified",
        ));
    }
    Ok(())
}

/// At most one export may exist on a path within a zone.
async fn fetch_export<A: NfsOps + ?Sized>(
    array: &A,
    path: &str,
    zone: &str,
) -> Result<Option<NfsExport>, TaskError> {
    let mut exports = array.nfs_exports_by_path(path, zone).await.map_err(|e| {
        e.context(format!(
            "Get details of NFS export for path {path} and access zone {zone}"
        ))
    })?;
    if exports.len() > 1 {
        return Err(TaskError::failed("Multiple NFS Exports found"));
    }
    Ok(exports.pop())
}

fn export_id(export: &NfsExport, path: &str) -> Result<i64, TaskError> {
    export.id.ok_or_else(|| {
        TaskError::failed(format!("The NFS export for path {path} carries no id"))
    })
}

fn create_body(params: &NfsExportParams, path: &str, zone: &str) -> NfsExportCreate {
    NfsExportCreate {
        paths: vec![path.to_string()],
        zone: Some(zone.to_string()),
        clients: params.clients.clone(),
        read_only_clients: params.read_only_clients.clone(),
        read_write_clients: params.read_write_clients.clone(),
        root_clients: params.root_clients.clone(),
        read_only: params.read_only,
        all_dirs: params.sub_directories_mountable,
        description: params.description.clone(),
    }
}

/// The update carrying only divergent fields; empty means converged.
fn build_update(observed: &NfsExport, params: &NfsExportParams) -> NfsExportUpdate {
    let mut update = NfsExportUpdate::default();

    if let Some(client_state) = params.client_state {
        update.clients =
            merged_clients(observed.clients.as_deref(), params.clients.as_deref(), client_state);
        update.read_only_clients = merged_clients(
            observed.read_only_clients.as_deref(),
            params.read_only_clients.as_deref(),
            client_state,
        );
        update.read_write_clients = merged_clients(
            observed.read_write_clients.as_deref(),
            params.read_write_clients.as_deref(),
            client_state,
        );
        update.root_clients = merged_clients(
            observed.root_clients.as_deref(),
            params.root_clients.as_deref(),
            client_state,
        );
    }

    if let Some(read_only) = params.read_only
        && observed.read_only != Some(read_only)
    {
        update.read_only = Some(read_only);
    }
    if let Some(all_dirs) = params.sub_directories_mountable
        && observed.all_dirs != Some(all_dirs)
    {
        update.all_dirs = Some(all_dirs);
    }
    if let Some(description) = &params.description
        && observed.description.as_deref() != Some(description.as_str())
    {
        update.description = Some(description.clone());
    }

    update
}

/// Merge one client list. Returns the new list only when it actually
/// changes; additions append in the given order, removals keep the rest in
/// place.
fn merged_clients(
    observed: Option<&[String]>,
    desired: Option<&[String]>,
    client_state: ClientState,
) -> Option<Vec<String>> {
    let desired = desired?;
    let mut merged: Vec<String> = observed.unwrap_or_default().to_vec();
    let mut modified = false;
    match client_state {
        ClientState::PresentInExport => {
            for client in desired {
                if !merged.contains(client) {
                    merged.push(client.clone());
                    modified = true;
                }
            }
        }
        ClientState::AbsentInExport => {
            for client in desired {
                if let Some(at) = merged.iter().position(|c| c == client) {
                    merged.remove(at);
                    modified = true;
                }
            }
        }
    }
    modified.then_some(merged)
}
