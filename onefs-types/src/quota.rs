//! SmartQuota models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::auth::Identity;
use crate::common::{CapacityUnit, GracePeriodUnit, State};

/// The identity a quota is bound to; user/group quotas carry one.
pub type Persona = Identity;

/// Quota flavors supported by the array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaType {
    User,
    Group,
    Directory,
}

impl QuotaType {
    pub fn as_str(self) -> &'static str {
        match self {
            QuotaType::User => "user",
            QuotaType::Group => "group",
            QuotaType::Directory => "directory",
        }
    }
}

impl std::fmt::Display for QuotaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threshold block of a quota (byte values)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotaThresholds {
    pub advisory: Option<u64>,

    pub soft: Option<u64>,

    pub hard: Option<u64>,

    /// Grace period for the soft limit, in seconds
    pub soft_grace: Option<u64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A quota as reported by the array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quota {
    /// Quota identifier assigned by the array
    pub id: String,

    #[serde(rename = "type")]
    pub quota_type: Option<QuotaType>,

    pub path: Option<String>,

    /// Identity the quota applies to (user/group quotas only)
    pub persona: Option<Persona>,

    /// Whether the limits are enforced rather than advisory-only
    pub enforced: Option<bool>,

    pub include_snapshots: Option<bool>,

    pub thresholds_include_overhead: Option<bool>,

    pub thresholds: Option<QuotaThresholds>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Threshold block for quota create/update bodies (byte values)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hard: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_grace: Option<u64>,
}

/// Body for creating a quota
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaCreate {
    #[serde(rename = "type")]
    pub quota_type: QuotaType,

    pub path: String,

    /// Identity for user/group quotas (SID reference)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona: Option<Persona>,

    pub enforced: bool,

    pub include_snapshots: bool,

    pub thresholds_include_overhead: bool,

    pub thresholds: ThresholdsUpdate,
}

/// Body for updating a quota
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotaUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforced: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds_include_overhead: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<ThresholdsUpdate>,
}

/// Desired quota limits for the quota task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuotaLimits {
    /// Whether snapshot data counts against the quota
    #[serde(default)]
    pub include_snapshots: bool,

    /// Whether data protection overhead counts against the quota
    pub include_overheads: Option<bool>,

    pub advisory_limit_size: Option<u64>,

    pub soft_limit_size: Option<u64>,

    pub hard_limit_size: Option<u64>,

    /// Grace period for the soft limit, in `period_unit` units
    pub soft_grace_period: Option<u64>,

    pub period_unit: Option<GracePeriodUnit>,

    /// Unit for the limit sizes
    pub cap_unit: Option<CapacityUnit>,
}

impl QuotaLimits {
    /// Whether any of the advisory/soft/hard limits is present.
    pub fn any_limit_set(&self) -> bool {
        self.advisory_limit_size.is_some()
            || self.soft_limit_size.is_some()
            || self.hard_limit_size.is_some()
    }
}

/// Desired quota block of the filesystem task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FsQuotaParams {
    /// Whether the directory quota should exist
    pub quota_state: State,

    /// Whether snapshot data counts against the quota (create-time only)
    pub include_snap_data: Option<bool>,

    pub include_data_protection_overhead: Option<bool>,

    pub advisory_limit_size: Option<u64>,

    pub soft_limit_size: Option<u64>,

    pub hard_limit_size: Option<u64>,

    /// Unit for the limit sizes (MB/GB/TB)
    pub cap_unit: Option<CapacityUnit>,
}
