//! Authentication provider models
//!
//! Users and groups resolved through the array's auth providers. Identity ids
//! carry their namespace prefix as reported by the array (`UID:2000`,
//! `GID:2000`, `SID:S-1-5-21-...`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity provider types known to the array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    #[default]
    Local,
    File,
    Ldap,
    Ads,
}

impl AuthProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthProvider::Local => "local",
            AuthProvider::File => "file",
            AuthProvider::Ldap => "ldap",
            AuthProvider::Ads => "ads",
        }
    }

    /// ADS identities surface as SIDs in namespace ACLs rather than UID/GID.
    pub fn is_ads(self) -> bool {
        matches!(self, AuthProvider::Ads)
    }
}

impl std::fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single identity reference as used by auth and namespace APIs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Prefixed identity id (e.g. "UID:2000")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Identity kind ("user", "group")
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Identity {
    pub fn user(id: impl Into<String>, name: impl Into<String>) -> Self {
        Identity {
            id: Some(id.into()),
            name: Some(name.into()),
            kind: Some("user".to_string()),
        }
    }

    pub fn group(id: impl Into<String>, name: impl Into<String>) -> Self {
        Identity {
            id: Some(id.into()),
            name: Some(name.into()),
            kind: Some("group".to_string()),
        }
    }
}

/// A user account as returned by the auth API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub name: Option<String>,

    pub uid: Option<Identity>,

    pub gid: Option<Identity>,

    pub sid: Option<Identity>,

    pub provider: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthUser {
    /// The prefixed UID id, if the array reported one
    pub fn uid_id(&self) -> Option<&str> {
        self.uid.as_ref().and_then(|i| i.id.as_deref())
    }

    /// The prefixed SID id, if the array reported one
    pub fn sid_id(&self) -> Option<&str> {
        self.sid.as_ref().and_then(|i| i.id.as_deref())
    }
}

/// A group account as returned by the auth API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthGroup {
    pub name: Option<String>,

    pub gid: Option<Identity>,

    pub sid: Option<Identity>,

    pub provider: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthGroup {
    pub fn gid_id(&self) -> Option<&str> {
        self.gid.as_ref().and_then(|i| i.id.as_deref())
    }

    pub fn sid_id(&self) -> Option<&str> {
        self.sid.as_ref().and_then(|i| i.id.as_deref())
    }
}
