// SPDX-License-Identifier: GPL-3.0-only

//! In-memory array implementing the adapter traits, for full task flows

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};

use onefs_papi::QuotaQuery;
use onefs_tasks::error::TaskError;
use onefs_tasks::ops::{
    AuthOps, ClusterOps, NamespaceOps, NfsOps, ProtocolOps, QuotaOps, SnapshotOps, ZoneOps,
};
use onefs_types::protocol::{
    NfsExportSettings, NfsExportSettingsUpdate, NfsZoneSettings, NfsZoneSettingsUpdate,
    SmbSettingsApply, SmbShare, SmbShareSettings,
};
use onefs_types::{
    AccessZone, AclAuthority, AuthGroup, AuthUser, Identity, NamespaceAcl, NfsExport,
    NfsExportCreate, NfsExportUpdate, Quota, QuotaCreate, QuotaThresholds, QuotaType, QuotaUpdate,
    Snapshot, SnapshotCreate, SnapshotUpdate,
};

#[derive(Default)]
pub struct ArrayState {
    pub zones: Vec<AccessZone>,
    pub smb_settings: SmbShareSettings,
    pub nfs_export_settings: NfsExportSettings,
    pub nfs_zone_settings: NfsZoneSettings,
    pub smb_shares: Vec<SmbShare>,
    pub quotas: Vec<Quota>,
    pub next_quota_id: u64,
    /// Namespace paths are stored without the leading slash, the way the
    /// namespace API addresses them
    pub directories: HashMap<String, Value>,
    pub acls: HashMap<String, NamespaceAcl>,
    pub snapshots: Vec<Snapshot>,
    pub aliases: Vec<Snapshot>,
    pub next_snapshot_id: i64,
    pub exports: Vec<NfsExport>,
    pub next_export_id: i64,
    pub users: HashMap<String, AuthUser>,
    pub groups: HashMap<String, AuthGroup>,
}

pub struct FakeArray {
    pub state: Mutex<ArrayState>,
}

impl FakeArray {
    /// An array with a System zone rooted at /ifs and one local user/group.
    pub fn new() -> Self {
        let mut state = ArrayState {
            next_quota_id: 1,
            next_snapshot_id: 1,
            next_export_id: 1,
            ..Default::default()
        };
        state.zones.push(AccessZone {
            id: Some("System".to_string()),
            name: Some("System".to_string()),
            path: Some("/ifs".to_string()),
            groupnet: Some("groupnet0".to_string()),
            zone_id: Some(1),
            ..Default::default()
        });
        state.users.insert(
            "ansible_user".to_string(),
            AuthUser {
                name: Some("ansible_user".to_string()),
                uid: Some(Identity::user("UID:2000", "ansible_user")),
                gid: Some(Identity::group("GID:1800", "users")),
                sid: Some(Identity {
                    id: Some("SID:S-1-5-21-8-9-2000".to_string()),
                    name: None,
                    kind: Some("user".to_string()),
                }),
                ..Default::default()
            },
        );
        state.groups.insert(
            "users".to_string(),
            AuthGroup {
                name: Some("users".to_string()),
                gid: Some(Identity::group("GID:1800", "users")),
                sid: Some(Identity {
                    id: Some("SID:S-1-5-21-8-9-1800".to_string()),
                    name: None,
                    kind: Some("group".to_string()),
                }),
                ..Default::default()
            },
        );
        FakeArray { state: Mutex::new(state) }
    }

    pub fn with_state(mutate: impl FnOnce(&mut ArrayState)) -> Self {
        let array = FakeArray::new();
        mutate(&mut array.state.lock().unwrap());
        array
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ArrayState> {
        self.state.lock().unwrap()
    }
}

fn not_found(what: impl Into<String>) -> TaskError {
    TaskError::failed(what.into())
}

#[async_trait]
impl ZoneOps for FakeArray {
    async fn zone(&self, name: &str) -> Result<Option<AccessZone>, TaskError> {
        let state = self.lock();
        Ok(state
            .zones
            .iter()
            .find(|zone| {
                zone.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name))
            })
            .cloned())
    }

    async fn zone_base_path(&self, name: &str) -> Result<String, TaskError> {
        let state = self.lock();
        state
            .zones
            .iter()
            .find(|zone| {
                zone.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name))
            })
            .and_then(|zone| zone.path.clone())
            .ok_or_else(|| not_found(format!("access zone {name} not found")))
    }

    async fn zones(&self) -> Result<Vec<AccessZone>, TaskError> {
        Ok(self.lock().zones.clone())
    }
}

#[async_trait]
impl ProtocolOps for FakeArray {
    async fn smb_settings(&self, _zone: &str) -> Result<SmbShareSettings, TaskError> {
        Ok(self.lock().smb_settings.clone())
    }

    async fn apply_smb_settings(
        &self,
        settings: &SmbSettingsApply,
        _zone: &str,
    ) -> Result<(), TaskError> {
        let mut state = self.lock();
        let smb = &mut state.smb_settings;
        if let Some(v) = &settings.create_permissions {
            smb.create_permissions = Some(v.clone());
        }
        if let Some(v) = settings.directory_create_mask {
            smb.directory_create_mask = Some(v);
        }
        if let Some(v) = settings.directory_create_mode {
            smb.directory_create_mode = Some(v);
        }
        if let Some(v) = settings.file_create_mask {
            smb.file_create_mask = Some(v);
        }
        if let Some(v) = settings.file_create_mode {
            smb.file_create_mode = Some(v);
        }
        if let Some(v) = settings.access_based_enumeration {
            smb.access_based_enumeration = Some(v);
        }
        if let Some(v) = settings.access_based_enumeration_root_only {
            smb.access_based_enumeration_root_only = Some(v);
        }
        if let Some(v) = settings.ntfs_acl_support {
            smb.ntfs_acl_support = Some(v);
        }
        if let Some(v) = settings.oplocks {
            smb.oplocks = Some(v);
        }
        Ok(())
    }

    async fn nfs_export_settings(&self, _zone: &str) -> Result<NfsExportSettings, TaskError> {
        Ok(self.lock().nfs_export_settings.clone())
    }

    async fn apply_nfs_export_settings(
        &self,
        settings: &NfsExportSettingsUpdate,
        _zone: &str,
    ) -> Result<(), TaskError> {
        if let Some(v) = settings.commit_asynchronous {
            self.lock().nfs_export_settings.commit_asynchronous = Some(v);
        }
        Ok(())
    }

    async fn nfs_zone_settings(&self, _zone: &str) -> Result<NfsZoneSettings, TaskError> {
        Ok(self.lock().nfs_zone_settings.clone())
    }

    async fn apply_nfs_zone_settings(
        &self,
        settings: &NfsZoneSettingsUpdate,
        _zone: &str,
    ) -> Result<(), TaskError> {
        let mut state = self.lock();
        let nfs = &mut state.nfs_zone_settings;
        if let Some(v) = &settings.nfsv4_domain {
            nfs.nfsv4_domain = Some(v.clone());
        }
        if let Some(v) = settings.nfsv4_allow_numeric_ids {
            nfs.nfsv4_allow_numeric_ids = Some(v);
        }
        if let Some(v) = settings.nfsv4_no_domain {
            nfs.nfsv4_no_domain = Some(v);
        }
        if let Some(v) = settings.nfsv4_no_domain_uids {
            nfs.nfsv4_no_domain_uids = Some(v);
        }
        if let Some(v) = settings.nfsv4_no_names {
            nfs.nfsv4_no_names = Some(v);
        }
        Ok(())
    }

    async fn smb_shares(&self, _zone: &str) -> Result<Vec<SmbShare>, TaskError> {
        Ok(self.lock().smb_shares.clone())
    }
}

#[async_trait]
impl QuotaOps for FakeArray {
    async fn quotas(&self, query: &QuotaQuery) -> Result<Vec<Quota>, TaskError> {
        let state = self.lock();
        Ok(state
            .quotas
            .iter()
            .filter(|quota| {
                query.path.as_deref().is_none_or(|p| quota.path.as_deref() == Some(p))
                    && query.quota_type.is_none_or(|t| quota.quota_type == Some(t))
                    && query
                        .persona
                        .as_deref()
                        .is_none_or(|p| {
                            quota.persona.as_ref().and_then(|i| i.id.as_deref()) == Some(p)
                        })
                    && query
                        .include_snapshots
                        .is_none_or(|v| quota.include_snapshots == Some(v))
            })
            .cloned()
            .collect())
    }

    async fn create_quota(
        &self,
        body: &QuotaCreate,
        _zone: Option<&str>,
    ) -> Result<String, TaskError> {
        let mut state = self.lock();
        let id = format!("quota-{}", state.next_quota_id);
        state.next_quota_id += 1;
        state.quotas.push(Quota {
            id: id.clone(),
            quota_type: Some(body.quota_type),
            path: Some(body.path.clone()),
            persona: body.persona.clone(),
            enforced: Some(body.enforced),
            include_snapshots: Some(body.include_snapshots),
            thresholds_include_overhead: Some(body.thresholds_include_overhead),
            thresholds: Some(QuotaThresholds {
                advisory: body.thresholds.advisory,
                soft: body.thresholds.soft,
                hard: body.thresholds.hard,
                soft_grace: body.thresholds.soft_grace,
                ..Default::default()
            }),
            ..Default::default()
        });
        Ok(id)
    }

    async fn update_quota(&self, id: &str, body: &QuotaUpdate) -> Result<(), TaskError> {
        let mut state = self.lock();
        let quota = state
            .quotas
            .iter_mut()
            .find(|quota| quota.id == id)
            .ok_or_else(|| not_found(format!("quota {id} not found")))?;
        if let Some(enforced) = body.enforced {
            quota.enforced = Some(enforced);
        }
        if let Some(overhead) = body.thresholds_include_overhead {
            quota.thresholds_include_overhead = Some(overhead);
        }
        if let Some(update) = &body.thresholds {
            let thresholds = quota.thresholds.get_or_insert_with(Default::default);
            if update.advisory.is_some() {
                thresholds.advisory = update.advisory;
            }
            if update.soft.is_some() {
                thresholds.soft = update.soft;
            }
            if update.hard.is_some() {
                thresholds.hard = update.hard;
            }
            if update.soft_grace.is_some() {
                thresholds.soft_grace = update.soft_grace;
            }
        }
        Ok(())
    }

    async fn delete_quota(&self, id: &str) -> Result<(), TaskError> {
        self.lock().quotas.retain(|quota| quota.id != id);
        Ok(())
    }

    async fn delete_quotas_on_path(
        &self,
        path: &str,
        quota_type: QuotaType,
    ) -> Result<(), TaskError> {
        self.lock().quotas.retain(|quota| {
            !(quota.path.as_deref() == Some(path) && quota.quota_type == Some(quota_type))
        });
        Ok(())
    }
}

#[async_trait]
impl NamespaceOps for FakeArray {
    async fn directory_metadata(&self, path: &str) -> Result<Option<Value>, TaskError> {
        Ok(self.lock().directories.get(path).cloned())
    }

    async fn create_directory(
        &self,
        path: &str,
        _recursive: bool,
        initial_acl: Option<&str>,
    ) -> Result<(), TaskError> {
        let mut state = self.lock();
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        state
            .directories
            .insert(path.to_string(), json!({"name": name, "type": "container"}));
        let acl = match initial_acl {
            Some(mode) => NamespaceAcl::with_mode(mode),
            None => NamespaceAcl::with_mode("0700"),
        };
        state.acls.insert(path.to_string(), acl);
        Ok(())
    }

    async fn delete_directory(&self, path: &str) -> Result<(), TaskError> {
        let mut state = self.lock();
        state
            .directories
            .remove(path)
            .ok_or_else(|| not_found(format!("directory {path} not found")))?;
        state.acls.remove(path);
        Ok(())
    }

    async fn acl(&self, path: &str) -> Result<NamespaceAcl, TaskError> {
        self.lock()
            .acls
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(format!("ACL for {path} not found")))
    }

    async fn set_acl(&self, path: &str, acl: &NamespaceAcl) -> Result<(), TaskError> {
        let mut state = self.lock();
        let entry = state
            .acls
            .entry(path.to_string())
            .or_insert_with(|| NamespaceAcl::with_mode("0700"));
        if let Some(mode) = &acl.mode {
            entry.mode = Some(mode.clone());
            entry.authoritative = Some(AclAuthority::Mode);
        }
        if let Some(owner) = &acl.owner {
            entry.owner = Some(owner.clone());
        }
        if let Some(group) = &acl.group {
            entry.group = Some(group.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl SnapshotOps for FakeArray {
    async fn snapshot(&self, name: &str) -> Result<Option<Snapshot>, TaskError> {
        Ok(self
            .lock()
            .snapshots
            .iter()
            .find(|snap| snap.name.as_deref() == Some(name))
            .cloned())
    }

    async fn snapshots(&self, kind: Option<&str>) -> Result<Vec<Snapshot>, TaskError> {
        let state = self.lock();
        Ok(match kind {
            Some("alias") => state.aliases.clone(),
            _ => state.snapshots.clone(),
        })
    }

    async fn create_snapshot(&self, body: &SnapshotCreate) -> Result<Snapshot, TaskError> {
        let mut state = self.lock();
        let id = state.next_snapshot_id;
        state.next_snapshot_id += 1;
        let snapshot = Snapshot {
            id: Some(id),
            name: Some(body.name.clone()),
            path: Some(body.path.clone()),
            state: Some("active".to_string()),
            created: Some(Utc::now().timestamp()),
            expires: body.expires,
            alias: body.alias.clone(),
            ..Default::default()
        };
        if let Some(alias) = &body.alias {
            state.aliases.push(Snapshot {
                name: Some(alias.clone()),
                target_id: Some(id),
                target_name: Some(body.name.clone()),
                ..Default::default()
            });
        }
        state.snapshots.push(snapshot.clone());
        Ok(snapshot)
    }

    async fn update_snapshot(&self, name: &str, body: &SnapshotUpdate) -> Result<(), TaskError> {
        let mut state = self.lock();
        let snapshot = state
            .snapshots
            .iter_mut()
            .find(|snap| snap.name.as_deref() == Some(name))
            .ok_or_else(|| not_found(format!("snapshot {name} not found")))?;
        if let Some(new_name) = &body.name {
            snapshot.name = Some(new_name.clone());
        }
        if let Some(expires) = body.expires {
            snapshot.expires = expires;
        }
        let renamed = snapshot.name.clone();
        if let Some(alias) = &body.alias {
            let target = renamed.unwrap_or_else(|| name.to_string());
            state.aliases.retain(|entry| entry.target_name.as_deref() != Some(&target));
            state.aliases.push(Snapshot {
                name: Some(alias.clone()),
                target_name: Some(target),
                ..Default::default()
            });
        }
        Ok(())
    }

    async fn delete_snapshot(&self, name: &str) -> Result<(), TaskError> {
        let mut state = self.lock();
        state.snapshots.retain(|snap| snap.name.as_deref() != Some(name));
        state.aliases.retain(|entry| entry.target_name.as_deref() != Some(name));
        Ok(())
    }
}

#[async_trait]
impl NfsOps for FakeArray {
    async fn nfs_exports_by_path(
        &self,
        path: &str,
        zone: &str,
    ) -> Result<Vec<NfsExport>, TaskError> {
        Ok(self
            .lock()
            .exports
            .iter()
            .filter(|export| {
                export.paths.iter().any(|p| p == path)
                    && export.zone.as_deref().is_none_or(|z| z.eq_ignore_ascii_case(zone))
            })
            .cloned()
            .collect())
    }

    async fn nfs_export(&self, id: i64, _zone: &str) -> Result<Option<NfsExport>, TaskError> {
        Ok(self.lock().exports.iter().find(|export| export.id == Some(id)).cloned())
    }

    async fn create_nfs_export(&self, export: &NfsExportCreate) -> Result<i64, TaskError> {
        let mut state = self.lock();
        let id = state.next_export_id;
        state.next_export_id += 1;
        state.exports.push(NfsExport {
            id: Some(id),
            zone: export.zone.clone(),
            paths: export.paths.clone(),
            description: export.description.clone(),
            read_only: export.read_only,
            all_dirs: export.all_dirs,
            clients: export.clients.clone(),
            read_only_clients: export.read_only_clients.clone(),
            read_write_clients: export.read_write_clients.clone(),
            root_clients: export.root_clients.clone(),
            ..Default::default()
        });
        Ok(id)
    }

    async fn update_nfs_export(
        &self,
        id: i64,
        update: &NfsExportUpdate,
        _zone: &str,
    ) -> Result<(), TaskError> {
        let mut state = self.lock();
        let export = state
            .exports
            .iter_mut()
            .find(|export| export.id == Some(id))
            .ok_or_else(|| not_found(format!("NFS export {id} not found")))?;
        if let Some(clients) = &update.clients {
            export.clients = Some(clients.clone());
        }
        if let Some(clients) = &update.read_only_clients {
            export.read_only_clients = Some(clients.clone());
        }
        if let Some(clients) = &update.read_write_clients {
            export.read_write_clients = Some(clients.clone());
        }
        if let Some(clients) = &update.root_clients {
            export.root_clients = Some(clients.clone());
        }
        if let Some(read_only) = update.read_only {
            export.read_only = Some(read_only);
        }
        if let Some(all_dirs) = update.all_dirs {
            export.all_dirs = Some(all_dirs);
        }
        if let Some(description) = &update.description {
            export.description = Some(description.clone());
        }
        Ok(())
    }

    async fn delete_nfs_export(&self, id: i64, _zone: &str) -> Result<(), TaskError> {
        self.lock().exports.retain(|export| export.id != Some(id));
        Ok(())
    }
}

#[async_trait]
impl AuthOps for FakeArray {
    async fn auth_user(
        &self,
        name: &str,
        _zone: &str,
        _provider: &str,
    ) -> Result<AuthUser, TaskError> {
        self.lock()
            .users
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(format!("user {name} not found")))
    }

    async fn auth_group(
        &self,
        name: &str,
        _zone: &str,
        _provider: &str,
    ) -> Result<AuthGroup, TaskError> {
        self.lock()
            .groups
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(format!("group {name} not found")))
    }

    async fn auth_users(&self, _zone: &str) -> Result<Value, TaskError> {
        let users: Vec<_> = self.lock().users.values().cloned().collect();
        Ok(serde_json::to_value(users).unwrap_or_else(|_| json!([])))
    }

    async fn auth_groups(&self, _zone: &str) -> Result<Value, TaskError> {
        let groups: Vec<_> = self.lock().groups.values().cloned().collect();
        Ok(serde_json::to_value(groups).unwrap_or_else(|_| json!([])))
    }

    async fn providers_summary(&self, _zone: &str) -> Result<Value, TaskError> {
        Ok(json!({"provider_instances": [{"name": "lsa-local-provider:System", "type": "local"}]}))
    }
}

#[async_trait]
impl ClusterOps for FakeArray {
    async fn cluster_config(&self) -> Result<Value, TaskError> {
        Ok(json!({"name": "fake-cluster", "onefs_version": {"release": "9.0.0.0"}}))
    }

    async fn cluster_identity(&self) -> Result<Value, TaskError> {
        Ok(json!({"description": "fake cluster", "logon": {"motd": ""}}))
    }

    async fn cluster_owner(&self) -> Result<Value, TaskError> {
        Ok(json!({"company": "Example Corp", "primary_email": "admin@example.com"}))
    }

    async fn external_ips(&self) -> Result<Vec<String>, TaskError> {
        Ok(vec!["10.0.0.10".to_string(), "10.0.0.11".to_string()])
    }

    async fn cluster_version(&self) -> Result<Value, TaskError> {
        Ok(json!({"nodes": [{"id": 1, "release": "9.0.0.0"}]}))
    }

    async fn cluster_nodes(&self) -> Result<Value, TaskError> {
        Ok(json!({"nodes": [{"id": 1, "lnn": 1}], "total": 1}))
    }
}
