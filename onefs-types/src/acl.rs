//! Namespace ACL models
//!
//! Directory permissions on the array are either POSIX mode bits
//! (`authoritative: mode`) or a real ACL (`authoritative: acl`). Playbooks
//! express the desired permissions as [`AccessControl`]: one of the
//! predefined ACL policies, or a raw POSIX octal string.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::auth::Identity;
use crate::common::parse_octal;

/// Which permission representation is authoritative for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AclAuthority {
    Mode,
    Acl,
}

/// Namespace ACL document, used both for reads and for `set_acl` bodies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceAcl {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authoritative: Option<AclAuthority>,

    /// POSIX mode as an octal string (e.g. "0775")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Identity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<Identity>,

    /// Access control entries (present when the ACL is authoritative)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NamespaceAcl {
    /// Body that sets POSIX mode bits.
    pub fn with_mode(mode: impl Into<String>) -> Self {
        NamespaceAcl {
            authoritative: Some(AclAuthority::Mode),
            mode: Some(mode.into()),
            ..Default::default()
        }
    }

    /// Body that sets the owning user and/or group.
    pub fn with_identities(owner: Option<Identity>, group: Option<Identity>) -> Self {
        NamespaceAcl {
            authoritative: Some(AclAuthority::Mode),
            owner,
            group,
            ..Default::default()
        }
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner.as_ref().and_then(|i| i.id.as_deref())
    }

    pub fn group_id(&self) -> Option<&str> {
        self.group.as_ref().and_then(|i| i.id.as_deref())
    }
}

/// Desired directory permissions: a predefined ACL policy or POSIX mode bits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AccessControl {
    PrivateRead,
    Private,
    PublicRead,
    PublicReadWrite,
    Public,
    /// Raw POSIX octal string, e.g. "0700"
    Posix(String),
}

impl AccessControl {
    /// POSIX bits equivalent to this setting, as an octal string.
    pub fn posix_bits(&self) -> &str {
        match self {
            AccessControl::PrivateRead => "0550",
            AccessControl::Private => "0770",
            AccessControl::PublicRead => "0775",
            AccessControl::PublicReadWrite => "0777",
            AccessControl::Public => "0777",
            AccessControl::Posix(mode) => mode,
        }
    }

    /// Which representation this setting makes authoritative on the array.
    pub fn authority(&self) -> AclAuthority {
        match self {
            AccessControl::Posix(_) => AclAuthority::Mode,
            _ => AclAuthority::Acl,
        }
    }

    /// The playbook-side spelling, as sent to the array on create.
    pub fn as_str(&self) -> &str {
        match self {
            AccessControl::PrivateRead => "private_read",
            AccessControl::Private => "private",
            AccessControl::PublicRead => "public_read",
            AccessControl::PublicReadWrite => "public_read_write",
            AccessControl::Public => "public",
            AccessControl::Posix(mode) => mode,
        }
    }
}

impl TryFrom<String> for AccessControl {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let parsed = match value.as_str() {
            "private_read" => AccessControl::PrivateRead,
            "private" => AccessControl::Private,
            "public_read" => AccessControl::PublicRead,
            "public_read_write" => AccessControl::PublicReadWrite,
            "public" => AccessControl::Public,
            other => {
                parse_octal(other)
                    .with_context(|| format!("invalid access_control value {other:?}"))?;
                AccessControl::Posix(value)
            }
        };
        Ok(parsed)
    }
}

impl From<AccessControl> for String {
    fn from(value: AccessControl) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predefined_policies_map_to_posix_bits() {
        assert_eq!(AccessControl::PrivateRead.posix_bits(), "0550");
        assert_eq!(AccessControl::Private.posix_bits(), "0770");
        assert_eq!(AccessControl::PublicRead.posix_bits(), "0775");
        assert_eq!(AccessControl::PublicReadWrite.posix_bits(), "0777");
        assert_eq!(AccessControl::Public.posix_bits(), "0777");
        assert_eq!(AccessControl::Private.authority(), AclAuthority::Acl);
    }

    #[test]
    fn test_posix_input_parses_and_keeps_spelling() {
        let ac: AccessControl = serde_json::from_str("\"0700\"").unwrap();
        assert_eq!(ac, AccessControl::Posix("0700".to_string()));
        assert_eq!(ac.posix_bits(), "0700");
        assert_eq!(ac.authority(), AclAuthority::Mode);

        let named: AccessControl = serde_json::from_str("\"public_read\"").unwrap();
        assert_eq!(named, AccessControl::PublicRead);
    }

    #[test]
    fn test_invalid_access_control_rejected() {
        assert!(serde_json::from_str::<AccessControl>("\"rwxr--r--\"").is_err());
        assert!(serde_json::from_str::<AccessControl>("\"0A9\"").is_err());
    }

    #[test]
    fn test_namespace_acl_mode_body() {
        let body = NamespaceAcl::with_mode("0755");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["authoritative"], "mode");
        assert_eq!(json["mode"], "0755");
        assert!(json.get("owner").is_none());
    }

    #[test]
    fn test_namespace_acl_observed_shape() {
        let json = r#"{
            "authoritative": "mode",
            "mode": "0770",
            "owner": {"id": "UID:2000", "name": "ansible_user", "type": "user"},
            "group": {"id": "GID:1800", "name": "users", "type": "group"}
        }"#;
        let acl: NamespaceAcl = serde_json::from_str(json).unwrap();
        assert_eq!(acl.authoritative, Some(AclAuthority::Mode));
        assert_eq!(acl.owner_id(), Some("UID:2000"));
        assert_eq!(acl.group_id(), Some("GID:1800"));
    }
}
