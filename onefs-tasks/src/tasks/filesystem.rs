// SPDX-License-Identifier: GPL-3.0-only

//! Filesystem task: reconcile a directory, its POSIX permissions, its
//! owner/group, and an optional directory quota
//!
//! The namespace API addresses directories without the leading slash while
//! the quota/protocol APIs want the absolute path, so the task keeps both
//! spellings of the effective path around.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use onefs_papi::QuotaQuery;
use onefs_types::{
    AccessControl, AclAuthority, AuthProvider, CapacityUnit, FsQuotaParams, Identity,
    NamespaceAcl, Quota, QuotaCreate, QuotaType, QuotaUpdate, State, ThresholdsUpdate,
    size_to_bytes,
};

use crate::error::TaskError;
use crate::ops::{AuthOps, NamespaceOps, NfsOps, ProtocolOps, QuotaOps, SnapshotOps, ZoneOps};
use crate::tasks::{default_zone, is_system_zone};

/// Grace period applied when a soft limit is created without one: 7 days.
const SOFT_GRACE_DEFAULT_SECS: u64 = 604_800;

/// Owner or group reference, resolved through an auth provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityParams {
    pub name: String,

    /// Defaults to the local provider
    #[serde(default)]
    pub provider_type: Option<AuthProvider>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilesystemParams {
    /// Absolute path within the access zone, starting with '/'
    pub path: String,

    #[serde(default = "default_zone")]
    pub access_zone: String,

    pub state: State,

    /// Owning user; required when the directory is created
    #[serde(default)]
    pub owner: Option<IdentityParams>,

    #[serde(default)]
    pub group: Option<IdentityParams>,

    /// Desired permissions: a predefined ACL policy or POSIX octal bits
    #[serde(default)]
    pub access_control: Option<AccessControl>,

    /// Create missing parent directories
    #[serde(default = "default_true")]
    pub recursive: bool,

    /// Desired directory quota
    #[serde(default)]
    pub quota: Option<FsQuotaParams>,

    /// Include snapshots of the path in the report
    #[serde(default)]
    pub list_snapshots: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct FilesystemReport {
    pub changed: bool,
    pub create_filesystem: bool,
    pub delete_filesystem: bool,
    pub modify_filesystem: bool,
    pub add_quota: bool,
    pub delete_quota: bool,
    pub modify_quota: bool,
    pub modify_owner: bool,
    pub modify_group: bool,
    pub filesystem_details: Value,
    pub quota_details: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filesystem_snapshots: Option<Value>,
}

struct ResolvedOwner {
    uid: String,
    sid: Option<String>,
}

struct ResolvedGroup {
    gid: String,
    sid: Option<String>,
}

pub async fn run<A>(array: &A, params: &FilesystemParams) -> Result<FilesystemReport, TaskError>
where
    A: ZoneOps + NamespaceOps + QuotaOps + AuthOps + NfsOps + ProtocolOps + SnapshotOps,
{
    validate(params)?;

    let zone = &params.access_zone;
    let zone_path = if is_system_zone(zone) {
        params.path.clone()
    } else {
        let base = array
            .zone_base_path(zone)
            .await
            .map_err(|e| e.context(format!("Fetch base path of access zone {zone}")))?;
        format!("{base}{}", params.path)
    };
    // The namespace API wants the path without its leading slash
    let namespace_path = zone_path.trim_start_matches('/').to_string();

    let metadata = array
        .directory_metadata(&namespace_path)
        .await
        .map_err(|e| e.context(format!("Get details of filesystem {zone_path}")))?;

    let mut create_filesystem = false;
    let mut delete_filesystem = false;
    let mut modify_filesystem = false;
    let mut add_quota = false;
    let mut delete_quota = false;
    let mut modify_quota = false;
    let mut modify_owner = false;
    let mut modify_group = false;

    match (params.state, metadata.is_some()) {
        (State::Present, false) => {
            create(array, params, &zone_path, &namespace_path).await?;
            create_filesystem = true;
        }
        (State::Present, true) => {
            if let Some(access_control) = &params.access_control {
                let observed = array
                    .acl(&namespace_path)
                    .await
                    .map_err(|e| e.context(format!("Get ACL of filesystem {zone_path}")))?;
                if acl_update_required(&observed, access_control)? {
                    info!(path = %zone_path, mode = access_control.as_str(), "updating mode bits");
                    array
                        .set_acl(&namespace_path, &NamespaceAcl::with_mode(access_control.as_str()))
                        .await
                        .map_err(|e| {
                            e.context(format!("Modify ACL rights of filesystem {zone_path}"))
                        })?;
                    modify_filesystem = true;
                }
            }

            if let Some(owner) = &params.owner {
                modify_owner =
                    reconcile_owner(array, owner, zone, &zone_path, &namespace_path).await?;
            }
            if let Some(group) = &params.group {
                modify_group =
                    reconcile_group(array, group, zone, &zone_path, &namespace_path).await?;
            }

            if let Some(quota) = &params.quota {
                let observed_quota = directory_quota(array, &zone_path).await?;
                match (quota.quota_state, observed_quota) {
                    (State::Present, None) => {
                        info!(path = %zone_path, "creating directory quota");
                        array
                            .create_quota(&quota_create_body(quota, &zone_path), None)
                            .await
                            .map_err(|e| {
                                e.context(format!("Create quota for filesystem {zone_path}"))
                            })?;
                        add_quota = true;
                    }
                    (State::Present, Some(observed)) => {
                        if fs_quota_needs_update(&observed, quota)? {
                            info!(path = %zone_path, "modifying directory quota");
                            array
                                .update_quota(&observed.id, &quota_update_body(quota))
                                .await
                                .map_err(|e| {
                                    e.context(format!("Modify quota for filesystem {zone_path}"))
                                })?;
                            modify_quota = true;
                        }
                    }
                    (State::Absent, Some(_)) => {
                        info!(path = %zone_path, "deleting directory quota");
                        array
                            .delete_quotas_on_path(&zone_path, QuotaType::Directory)
                            .await
                            .map_err(|e| {
                                e.context(format!("Delete quota for filesystem {zone_path}"))
                            })?;
                        delete_quota = true;
                    }
                    (State::Absent, None) => {}
                }
            }
        }
        (State::Absent, true) => {
            ensure_deletable(array, zone, &zone_path).await?;
            info!(path = %zone_path, "deleting filesystem");
            array
                .delete_directory(&namespace_path)
                .await
                .map_err(|e| e.context(format!("Delete filesystem {zone_path}")))?;
            delete_filesystem = true;
        }
        (State::Absent, false) => {}
    }

    let (filesystem_details, quota_details) = if params.state.is_present() {
        let metadata = array
            .directory_metadata(&namespace_path)
            .await
            .map_err(|e| e.context(format!("Get details of filesystem {zone_path}")))?;
        let quota = directory_quota(array, &zone_path).await?;
        (
            metadata.unwrap_or_else(|| json!({})),
            quota
                .and_then(|q| serde_json::to_value(q).ok())
                .unwrap_or_else(|| json!({})),
        )
    } else {
        (json!({}), json!({}))
    };

    let filesystem_snapshots = if params.list_snapshots {
        let snapshots: Vec<_> = array
            .snapshots(None)
            .await
            .map_err(|e| e.context(format!("Get snapshots of filesystem {zone_path}")))?
            .into_iter()
            .filter(|snap| snap.path.as_deref() == Some(zone_path.as_str()))
            .collect();
        Some(serde_json::to_value(snapshots).unwrap_or_else(|_| json!([])))
    } else {
        None
    };

    let changed = create_filesystem
        || delete_filesystem
        || modify_filesystem
        || add_quota
        || delete_quota
        || modify_quota
        || modify_owner
        || modify_group;

    Ok(FilesystemReport {
        changed,
        create_filesystem,
        delete_filesystem,
        modify_filesystem,
        add_quota,
        delete_quota,
        modify_quota,
        modify_owner,
        modify_group,
        filesystem_details,
        quota_details,
        filesystem_snapshots,
    })
}

fn validate(params: &FilesystemParams) -> Result<(), TaskError> {
    if !params.path.starts_with('/') {
        return Err(TaskError::validation(format!(
            "Invalid path {}, the path must start with '/'",
            params.path
        )));
    }
    if let Some(quota) = &params.quota
        && let Some(unit) = quota.cap_unit
        && matches!(unit, CapacityUnit::Kb)
    {
        return Err(TaskError::validation(
            "Invalid cap_unit provided, only MB, GB and TB are supported",
        ));
    }
    Ok(())
}

async fn create<A>(
    array: &A,
    params: &FilesystemParams,
    zone_path: &str,
    namespace_path: &str,
) -> Result<(), TaskError>
where
    A: NamespaceOps + QuotaOps + AuthOps,
{
    let zone = &params.access_zone;
    let owner = params.owner.as_ref().ok_or_else(|| {
        TaskError::validation("owner is required while creating a filesystem")
    })?;
    let resolved_owner = resolve_owner(array, owner, zone).await?;
    let resolved_group = match &params.group {
        Some(group) => Some(resolve_group(array, group, zone).await?),
        None => None,
    };

    info!(path = %zone_path, "creating filesystem");
    array
        .create_directory(
            namespace_path,
            params.recursive,
            params.access_control.as_ref().map(|a| a.as_str()),
        )
        .await
        .map_err(|e| e.context(format!("Create filesystem {zone_path}")))?;

    if let Some(quota) = &params.quota
        && quota.quota_state.is_present()
    {
        array
            .create_quota(&quota_create_body(quota, zone_path), None)
            .await
            .map_err(|e| e.context(format!("Create quota for filesystem {zone_path}")))?;
    }

    let acl = NamespaceAcl::with_identities(
        Some(Identity::user(resolved_owner.uid, owner.name.clone())),
        resolved_group.map(|group| {
            let name = params.group.as_ref().map(|g| g.name.clone()).unwrap_or_default();
            Identity::group(group.gid, name)
        }),
    );
    array
        .set_acl(namespace_path, &acl)
        .await
        .map_err(|e| e.context(format!("Set owner and group of filesystem {zone_path}")))?;
    Ok(())
}

/// Compare the resolved owner against the ACL and apply on divergence.
/// ADS identities surface as SIDs in the ACL, so the comparison key differs
/// by provider while the written identity always carries the UID.
async fn reconcile_owner<A>(
    array: &A,
    owner: &IdentityParams,
    zone: &str,
    zone_path: &str,
    namespace_path: &str,
) -> Result<bool, TaskError>
where
    A: NamespaceOps + AuthOps,
{
    let resolved = resolve_owner(array, owner, zone).await?;
    let provider = owner.provider_type.unwrap_or_default();
    let compare_id = if provider.is_ads() {
        resolved.sid.clone().ok_or_else(|| {
            TaskError::failed(format!(
                "Failed to get the SID for owner {} in zone {zone}",
                owner.name
            ))
        })?
    } else {
        resolved.uid.clone()
    };

    let acl = array
        .acl(namespace_path)
        .await
        .map_err(|e| e.context(format!("Get ACL of filesystem {zone_path}")))?;
    if acl.owner_id() == Some(compare_id.as_str()) {
        return Ok(false);
    }

    info!(path = %zone_path, owner = %owner.name, "updating owner");
    let body = NamespaceAcl::with_identities(
        Some(Identity::user(resolved.uid, owner.name.clone())),
        None,
    );
    array
        .set_acl(namespace_path, &body)
        .await
        .map_err(|e| e.context(format!("Modify owner of filesystem {zone_path}")))?;
    Ok(true)
}

async fn reconcile_group<A>(
    array: &A,
    group: &IdentityParams,
    zone: &str,
    zone_path: &str,
    namespace_path: &str,
) -> Result<bool, TaskError>
where
    A: NamespaceOps + AuthOps,
{
    let resolved = resolve_group(array, group, zone).await?;
    let provider = group.provider_type.unwrap_or_default();
    let compare_id = if provider.is_ads() {
        resolved.sid.clone().ok_or_else(|| {
            TaskError::failed(format!(
                "Failed to get the SID for group {} in zone {zone}",
                group.name
            ))
        })?
    } else {
        resolved.gid.clone()
    };

    let acl = array
        .acl(namespace_path)
        .await
        .map_err(|e| e.context(format!("Get ACL of filesystem {zone_path}")))?;
    if acl.group_id() == Some(compare_id.as_str()) {
        return Ok(false);
    }

    info!(path = %zone_path, group = %group.name, "updating group");
    let body = NamespaceAcl::with_identities(
        None,
        Some(Identity::group(resolved.gid, group.name.clone())),
    );
    array
        .set_acl(namespace_path, &body)
        .await
        .map_err(|e| e.context(format!("Modify group of filesystem {zone_path}")))?;
    Ok(true)
}

async fn resolve_owner<A: AuthOps + ?Sized>(
    array: &A,
    owner: &IdentityParams,
    zone: &str,
) -> Result<ResolvedOwner, TaskError> {
    let provider = owner.provider_type.unwrap_or_default();
    let name = &owner.name;
    let user = array
        .auth_user(name, zone, provider.as_str())
        .await
        .map_err(|e| {
            TaskError::failed(format!(
                "Failed to get the owner id for {name} in zone {zone} and provider {provider} due to error: {e}"
            ))
        })?;
    let uid = user
        .uid_id()
        .ok_or_else(|| {
            TaskError::failed(format!("Failed to get the owner id for {name} in zone {zone}"))
        })?
        .to_string();
    Ok(ResolvedOwner { uid, sid: user.sid_id().map(str::to_string) })
}

async fn resolve_group<A: AuthOps + ?Sized>(
    array: &A,
    group: &IdentityParams,
    zone: &str,
) -> Result<ResolvedGroup, TaskError> {
    let provider = group.provider_type.unwrap_or_default();
    let name = &group.name;
    let found = array
        .auth_group(name, zone, provider.as_str())
        .await
        .map_err(|e| {
            TaskError::failed(format!(
                "Failed to get the group id for {name} in zone {zone} and provider {provider} due to error: {e}"
            ))
        })?;
    let gid = found
        .gid_id()
        .ok_or_else(|| {
            TaskError::failed(format!("Failed to get the group id for {name} in zone {zone}"))
        })?
        .to_string();
    Ok(ResolvedGroup { gid, sid: found.sid_id().map(str::to_string) })
}

async fn directory_quota<A: QuotaOps + ?Sized>(
    array: &A,
    zone_path: &str,
) -> Result<Option<Quota>, TaskError> {
    let query = QuotaQuery {
        path: Some(zone_path.to_string()),
        quota_type: Some(QuotaType::Directory),
        ..Default::default()
    };
    let quotas = array
        .quotas(&query)
        .await
        .map_err(|e| e.context(format!("Get quota details for filesystem {zone_path}")))?;
    Ok(quotas.into_iter().next())
}

/// Deletion is refused while protocol resources still point at the path.
async fn ensure_deletable<A>(array: &A, zone: &str, zone_path: &str) -> Result<(), TaskError>
where
    A: NfsOps + ProtocolOps,
{
    let exports = array
        .nfs_exports_by_path(zone_path, zone)
        .await
        .map_err(|e| e.context(format!("Get NFS exports for filesystem {zone_path}")))?;
    if !exports.is_empty() {
        return Err(TaskError::failed(format!(
            "The filesystem path {zone_path} has NFS exports. Deleting this filesystem is not allowed"
        )));
    }
    let shares = array
        .smb_shares(zone)
        .await
        .map_err(|e| e.context(format!("Get SMB shares of access zone {zone}")))?;
    if shares.iter().any(|share| share.path.as_deref() == Some(zone_path)) {
        return Err(TaskError::failed(format!(
            "The filesystem path {zone_path} has SMB shares. Deleting this filesystem is not allowed"
        )));
    }
    Ok(())
}

/// POSIX-to-POSIX changes are the only supported permission modification.
/// Switching the authoritative side between mode bits and a real ACL is
/// rejected even when the reported octal strings agree; ACL-to-ACL is
/// rejected unless the bits already match.
fn acl_update_required(
    observed: &NamespaceAcl,
    desired: &AccessControl,
) -> Result<bool, TaskError> {
    let desired_bits = desired.posix_bits();
    let observed_mode = observed.mode.as_deref().unwrap_or("");
    let observed_authority = observed.authoritative.unwrap_or(AclAuthority::Mode);
    let desired_authority = desired.authority();
    if observed_authority == AclAuthority::Mode && desired_authority == AclAuthority::Mode {
        return Ok(desired_bits != observed_mode);
    }
    if observed_authority != desired_authority || desired_bits != observed_mode {
        return Err(TaskError::validation(
            "Modification of ACL is only supported from POSIX to POSIX mode bits",
        ));
    }
    Ok(false)
}

fn desired_fs_thresholds(params: &FsQuotaParams) -> (Option<u64>, Option<u64>, Option<u64>) {
    let unit = params.cap_unit.unwrap_or_default();
    let to_bytes = |size: Option<u64>| size.map(|s| size_to_bytes(s, unit));
    (
        to_bytes(params.advisory_limit_size),
        to_bytes(params.soft_limit_size),
        to_bytes(params.hard_limit_size),
    )
}

fn quota_create_body(params: &FsQuotaParams, path: &str) -> QuotaCreate {
    let (advisory, soft, hard) = desired_fs_thresholds(params);
    QuotaCreate {
        quota_type: QuotaType::Directory,
        path: path.to_string(),
        persona: None,
        enforced: hard.is_some() || soft.is_some(),
        include_snapshots: params.include_snap_data.unwrap_or(false),
        thresholds_include_overhead: params.include_data_protection_overhead.unwrap_or(false),
        thresholds: ThresholdsUpdate {
            advisory,
            soft,
            hard,
            soft_grace: soft.map(|_| SOFT_GRACE_DEFAULT_SECS),
        },
    }
}

fn quota_update_body(params: &FsQuotaParams) -> QuotaUpdate {
    let (advisory, soft, hard) = desired_fs_thresholds(params);
    QuotaUpdate {
        enforced: Some(hard.is_some() || soft.is_some()),
        thresholds_include_overhead: params.include_data_protection_overhead,
        thresholds: Some(ThresholdsUpdate {
            advisory,
            soft,
            hard,
            soft_grace: soft.map(|_| SOFT_GRACE_DEFAULT_SECS),
        }),
    }
}

fn fs_quota_needs_update(observed: &Quota, desired: &FsQuotaParams) -> Result<bool, TaskError> {
    if let Some(include_snap) = desired.include_snap_data
        && observed.include_snapshots != Some(include_snap)
    {
        return Err(TaskError::validation(
            "include_snap_data of an existing quota cannot be modified",
        ));
    }
    if let Some(overhead) = desired.include_data_protection_overhead
        && observed.thresholds_include_overhead != Some(overhead)
    {
        return Ok(true);
    }
    let (advisory, soft, hard) = desired_fs_thresholds(desired);
    let thresholds = observed.thresholds.clone().unwrap_or_default();
    let pairs = [
        (advisory, thresholds.advisory),
        (soft, thresholds.soft),
        (hard, thresholds.hard),
    ];
    Ok(pairs
        .iter()
        .any(|(want, have)| matches!(want, Some(w) if have != &Some(*w))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fs_quota(hard_gb: Option<u64>, soft_gb: Option<u64>) -> FsQuotaParams {
        FsQuotaParams {
            quota_state: State::Present,
            include_snap_data: None,
            include_data_protection_overhead: None,
            advisory_limit_size: None,
            soft_limit_size: soft_gb,
            hard_limit_size: hard_gb,
            cap_unit: Some(CapacityUnit::Gb),
        }
    }

    #[test]
    fn test_acl_posix_to_posix_is_allowed() {
        let observed = NamespaceAcl {
            authoritative: Some(AclAuthority::Mode),
            mode: Some("0700".to_string()),
            ..Default::default()
        };
        let desired = AccessControl::Posix("0755".to_string());
        assert!(acl_update_required(&observed, &desired).unwrap());

        let same = AccessControl::Posix("0700".to_string());
        assert!(!acl_update_required(&observed, &same).unwrap());
    }

    #[test]
    fn test_acl_preset_over_differing_mode_is_rejected() {
        let observed = NamespaceAcl {
            authoritative: Some(AclAuthority::Mode),
            mode: Some("0700".to_string()),
            ..Default::default()
        };
        // private maps to 0770, which differs from the observed bits
        let err = acl_update_required(&observed, &AccessControl::Private).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_acl_authoritative_acl_with_matching_bits_is_noop() {
        let observed = NamespaceAcl {
            authoritative: Some(AclAuthority::Acl),
            mode: Some("0770".to_string()),
            ..Default::default()
        };
        assert!(!acl_update_required(&observed, &AccessControl::Private).unwrap());
    }

    #[test]
    fn test_acl_preset_over_matching_mode_is_rejected() {
        // private maps to 0770; equal bits do not make the authority switch legal
        let observed = NamespaceAcl {
            authoritative: Some(AclAuthority::Mode),
            mode: Some("0770".to_string()),
            ..Default::default()
        };
        let err = acl_update_required(&observed, &AccessControl::Private).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_acl_posix_over_acl_with_matching_bits_is_rejected() {
        let observed = NamespaceAcl {
            authoritative: Some(AclAuthority::Acl),
            mode: Some("0770".to_string()),
            ..Default::default()
        };
        let err =
            acl_update_required(&observed, &AccessControl::Posix("0770".to_string())).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_acl_transition_from_acl_is_rejected() {
        let observed = NamespaceAcl {
            authoritative: Some(AclAuthority::Acl),
            mode: Some("0770".to_string()),
            ..Default::default()
        };
        let err =
            acl_update_required(&observed, &AccessControl::Posix("0700".to_string())).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_quota_create_body_converts_units() {
        let body = quota_create_body(&fs_quota(Some(10), None), "/ifs/sample_fs");
        assert_eq!(body.thresholds.hard, Some(10 * 1024 * 1024 * 1024));
        assert!(body.enforced);
        assert_eq!(body.thresholds.soft_grace, None);
        assert_eq!(body.quota_type, QuotaType::Directory);
    }

    #[test]
    fn test_quota_create_body_soft_limit_implies_grace() {
        let body = quota_create_body(&fs_quota(None, Some(2)), "/ifs/sample_fs");
        assert_eq!(body.thresholds.soft, Some(2 * 1024 * 1024 * 1024));
        assert_eq!(body.thresholds.soft_grace, Some(SOFT_GRACE_DEFAULT_SECS));
        assert!(body.enforced);
    }

    #[test]
    fn test_quota_advisory_only_is_not_enforced() {
        let params = FsQuotaParams {
            advisory_limit_size: Some(5),
            ..fs_quota(None, None)
        };
        let body = quota_create_body(&params, "/ifs/sample_fs");
        assert!(!body.enforced);
        assert_eq!(body.thresholds.advisory, Some(5 * 1024 * 1024 * 1024));
    }

    #[test]
    fn test_fs_quota_include_snap_divergence_is_fatal() {
        let observed = Quota {
            id: "q1".to_string(),
            include_snapshots: Some(false),
            ..Default::default()
        };
        let params = FsQuotaParams {
            include_snap_data: Some(true),
            ..fs_quota(Some(1), None)
        };
        let err = fs_quota_needs_update(&observed, &params).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_fs_quota_limit_divergence_modifies() {
        let observed = Quota {
            id: "q1".to_string(),
            include_snapshots: Some(false),
            thresholds: Some(onefs_types::QuotaThresholds {
                hard: Some(1024 * 1024 * 1024),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(fs_quota_needs_update(&observed, &fs_quota(Some(2), None)).unwrap());
        assert!(!fs_quota_needs_update(&observed, &fs_quota(Some(1), None)).unwrap());
    }

    #[test]
    fn test_validate_path_must_be_absolute() {
        let params = FilesystemParams {
            path: "sample_fs".to_string(),
            access_zone: "System".to_string(),
            state: State::Present,
            owner: None,
            group: None,
            access_control: None,
            recursive: true,
            quota: None,
            list_snapshots: false,
        };
        assert!(validate(&params).unwrap_err().is_validation());
    }
}
