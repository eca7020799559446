//! Default SMB/NFS protocol settings of an access zone
//!
//! Observed settings mirror what the array reports for a zone; the `*Update`
//! types are the playbook-side counterparts. SMB mask/mode fields are octal
//! strings on the playbook side and decimal mode bits on the array side, so
//! the desired settings are converted with [`SmbSettingsUpdate::to_apply`]
//! before they can be compared or sent.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::common::parse_octal;

/// Default SMB share settings of a zone, as reported by the array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmbShareSettings {
    /// Permission preset applied to new shares (e.g. "default acl")
    pub create_permissions: Option<String>,

    /// Directory create mask (decimal mode bits)
    pub directory_create_mask: Option<u32>,

    /// Directory create mode (decimal mode bits)
    pub directory_create_mode: Option<u32>,

    /// File create mask (decimal mode bits)
    pub file_create_mask: Option<u32>,

    /// File create mode (decimal mode bits)
    pub file_create_mode: Option<u32>,

    pub access_based_enumeration: Option<bool>,

    pub access_based_enumeration_root_only: Option<bool>,

    pub ntfs_acl_support: Option<bool>,

    pub oplocks: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Desired default SMB share settings (mask/mode fields as octal strings)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmbSettingsUpdate {
    pub create_permissions: Option<String>,

    /// Octal string, e.g. "700"
    pub directory_create_mask: Option<String>,

    /// Octal string
    pub directory_create_mode: Option<String>,

    /// Octal string
    pub file_create_mask: Option<String>,

    /// Octal string
    pub file_create_mode: Option<String>,

    pub access_based_enumeration: Option<bool>,

    pub access_based_enumeration_root_only: Option<bool>,

    pub ntfs_acl_support: Option<bool>,

    pub oplocks: Option<bool>,
}

impl SmbSettingsUpdate {
    /// Convert the octal mask/mode strings into the decimal form the array
    /// expects. Fails on a non-octal string before anything is sent.
    pub fn to_apply(&self) -> Result<SmbSettingsApply> {
        let parse = |field: &Option<String>, name: &str| -> Result<Option<u32>> {
            field
                .as_deref()
                .map(|text| {
                    parse_octal(text)
                        .with_context(|| format!("conversion from octal to decimal failed for {name}"))
                })
                .transpose()
        };

        Ok(SmbSettingsApply {
            create_permissions: self.create_permissions.clone(),
            directory_create_mask: parse(&self.directory_create_mask, "directory_create_mask")?,
            directory_create_mode: parse(&self.directory_create_mode, "directory_create_mode")?,
            file_create_mask: parse(&self.file_create_mask, "file_create_mask")?,
            file_create_mode: parse(&self.file_create_mode, "file_create_mode")?,
            access_based_enumeration: self.access_based_enumeration,
            access_based_enumeration_root_only: self.access_based_enumeration_root_only,
            ntfs_acl_support: self.ntfs_acl_support,
            oplocks: self.oplocks,
        })
    }
}

/// SMB settings update body in array form (decimal mode bits)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmbSettingsApply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_permissions: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory_create_mask: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory_create_mode: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_create_mask: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_create_mode: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_based_enumeration: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_based_enumeration_root_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ntfs_acl_support: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub oplocks: Option<bool>,
}

/// An SMB share, as reported by the array.
///
/// Only the fields the tasks look at are named; everything else rides along
/// in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmbShare {
    pub name: Option<String>,

    /// Filesystem path backing the share
    pub path: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Default NFS export settings of a zone, as reported by the array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NfsExportSettings {
    pub commit_asynchronous: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Default NFS zone settings, as reported by the array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NfsZoneSettings {
    pub nfsv4_domain: Option<String>,

    pub nfsv4_allow_numeric_ids: Option<bool>,

    pub nfsv4_no_domain: Option<bool>,

    pub nfsv4_no_domain_uids: Option<bool>,

    pub nfsv4_no_names: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Desired default NFS settings of a zone.
///
/// A single playbook block covers both settings sections; [`split`] separates
/// the fields by the section they belong to.
///
/// [`split`]: NfsSettingsUpdate::split
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NfsSettingsUpdate {
    pub commit_asynchronous: Option<bool>,

    pub nfsv4_domain: Option<String>,

    pub nfsv4_allow_numeric_ids: Option<bool>,

    pub nfsv4_no_domain: Option<bool>,

    pub nfsv4_no_domain_uids: Option<bool>,

    pub nfsv4_no_names: Option<bool>,
}

impl NfsSettingsUpdate {
    /// Split into the export-settings and zone-settings update bodies.
    pub fn split(&self) -> (NfsExportSettingsUpdate, NfsZoneSettingsUpdate) {
        (
            NfsExportSettingsUpdate {
                commit_asynchronous: self.commit_asynchronous,
            },
            NfsZoneSettingsUpdate {
                nfsv4_domain: self.nfsv4_domain.clone(),
                nfsv4_allow_numeric_ids: self.nfsv4_allow_numeric_ids,
                nfsv4_no_domain: self.nfsv4_no_domain,
                nfsv4_no_domain_uids: self.nfsv4_no_domain_uids,
                nfsv4_no_names: self.nfsv4_no_names,
            },
        )
    }
}

/// Update body for the default NFS export settings section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NfsExportSettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_asynchronous: Option<bool>,
}

impl NfsExportSettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.commit_asynchronous.is_none()
    }
}

/// Update body for the NFS zone settings section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NfsZoneSettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nfsv4_domain: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nfsv4_allow_numeric_ids: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nfsv4_no_domain: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nfsv4_no_domain_uids: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nfsv4_no_names: Option<bool>,
}

impl NfsZoneSettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.nfsv4_domain.is_none()
            && self.nfsv4_allow_numeric_ids.is_none()
            && self.nfsv4_no_domain.is_none()
            && self.nfsv4_no_domain_uids.is_none()
            && self.nfsv4_no_names.is_none()
    }
}
