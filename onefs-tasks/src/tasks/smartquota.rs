// SPDX-License-Identifier: GPL-3.0-only

//! SmartQuota task: reconcile a user, group or directory quota on a path
//!
//! Limit sizes arrive in capacity units and are normalized to bytes before
//! anything is compared or sent; the report annotates the thresholds with
//! human-readable sizes the same way.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::info;

use onefs_papi::QuotaQuery;
use onefs_types::{
    AuthProvider, CapacityUnit, Persona, Quota, QuotaCreate, QuotaLimits, QuotaType, QuotaUpdate,
    State, ThresholdsUpdate, bytes_with_unit, grace_period_seconds, size_to_bytes,
};

use crate::error::TaskError;
use crate::ops::{AuthOps, QuotaOps, ZoneOps};
use crate::tasks::{default_zone, is_system_zone};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmartQuotaParams {
    /// Path the quota applies to, absolute within the access zone
    pub path: String,

    pub quota_type: QuotaType,

    pub state: State,

    #[serde(default = "default_zone")]
    pub access_zone: String,

    /// Required for user quotas
    #[serde(default)]
    pub user_name: Option<String>,

    /// Required for group quotas
    #[serde(default)]
    pub group_name: Option<String>,

    /// Auth provider the user/group is resolved through (default local)
    #[serde(default)]
    pub provider_type: Option<AuthProvider>,

    /// Desired limits; omit to manage an accounting-only quota
    #[serde(default)]
    pub quota: Option<QuotaLimits>,
}

#[derive(Debug, Serialize)]
pub struct SmartQuotaReport {
    pub changed: bool,
    pub quota_details: Value,
}

/// Desired limits normalized to bytes and seconds.
#[derive(Debug, Default, PartialEq)]
struct DesiredLimits {
    include_snapshots: bool,
    include_overheads: Option<bool>,
    advisory: Option<u64>,
    soft: Option<u64>,
    hard: Option<u64>,
    soft_grace: Option<u64>,
}

impl DesiredLimits {
    fn from_limits(limits: &QuotaLimits) -> Self {
        let unit = limits.cap_unit.unwrap_or_default();
        let to_bytes = |size: Option<u64>| size.map(|s| size_to_bytes(s, unit));
        DesiredLimits {
            include_snapshots: limits.include_snapshots,
            include_overheads: limits.include_overheads,
            advisory: to_bytes(limits.advisory_limit_size),
            soft: to_bytes(limits.soft_limit_size),
            hard: to_bytes(limits.hard_limit_size),
            soft_grace: limits.soft_grace_period.map(|period| {
                grace_period_seconds(period, limits.period_unit.unwrap_or_default())
            }),
        }
    }

    fn any_limit(&self) -> bool {
        self.advisory.is_some() || self.soft.is_some() || self.hard.is_some()
    }
}

pub async fn run<A>(array: &A, params: &SmartQuotaParams) -> Result<SmartQuotaReport, TaskError>
where
    A: ZoneOps + QuotaOps + AuthOps,
{
    validate(params)?;
    let desired = params.quota.as_ref().map(DesiredLimits::from_limits);

    let zone = &params.access_zone;
    let path = if is_system_zone(zone) {
        params.path.clone()
    } else {
        let base = array
            .zone_base_path(zone)
            .await
            .map_err(|e| e.context(format!("Fetch base path of access zone {zone}")))?;
        format!("{base}{}", params.path)
    };

    let persona_id = resolve_persona(array, params).await?;

    let query = QuotaQuery {
        path: Some(path.clone()),
        quota_type: Some(params.quota_type),
        include_snapshots: Some(desired.as_ref().map(|d| d.include_snapshots).unwrap_or(false)),
        persona: persona_id.clone(),
        zone: Some(zone.clone()),
    };
    let observed = array
        .quotas(&query)
        .await
        .map_err(|e| e.context(format!("Get details of quota for path {path}")))?
        .into_iter()
        .next();

    let mut changed = false;
    match (params.state, &observed) {
        (State::Present, None) => {
            let body = create_body(params, desired.as_ref(), &path, persona_id.as_deref());
            info!(%path, quota_type = %params.quota_type, "creating quota");
            array
                .create_quota(&body, Some(zone))
                .await
                .map_err(|e| e.context(format!("Create quota for path {path}")))?;
            changed = true;
        }
        (State::Present, Some(quota)) => {
            if let Some(desired) = &desired
                && quota_needs_update(quota, desired)
            {
                let body = update_body(quota, desired);
                info!(%path, id = %quota.id, "modifying quota");
                array
                    .update_quota(&quota.id, &body)
                    .await
                    .map_err(|e| e.context(format!("Modify quota for path {path}")))?;
                changed = true;
            }
        }
        (State::Absent, Some(quota)) => {
            info!(%path, id = %quota.id, "deleting quota");
            array
                .delete_quota(&quota.id)
                .await
                .map_err(|e| e.context(format!("Delete quota for path {path}")))?;
            changed = true;
        }
        (State::Absent, None) => {}
    }

    let quota_details = if params.state.is_present() {
        let refetched = array
            .quotas(&query)
            .await
            .map_err(|e| e.context(format!("Get details of quota for path {path}")))?
            .into_iter()
            .next();
        match refetched {
            Some(quota) => render_details(&quota, params),
            None => json!({}),
        }
    } else {
        json!({})
    };

    Ok(SmartQuotaReport { changed, quota_details })
}

fn validate(params: &SmartQuotaParams) -> Result<(), TaskError> {
    if params.access_zone.trim().is_empty() {
        return Err(TaskError::validation(
            "Invalid access_zone provided. Provide valid access_zone",
        ));
    }
    if params.path.trim().is_empty() {
        return Err(TaskError::validation("Invalid path provided. Provide valid path"));
    }

    match params.quota_type {
        QuotaType::Directory => {
            if params.user_name.is_some()
                || params.group_name.is_some()
                || params.provider_type.is_some()
            {
                return Err(TaskError::validation(
                    "user_name, group_name and provider_type are not applicable for directory quotas",
                ));
            }
        }
        QuotaType::User => {
            if params.user_name.is_none() {
                return Err(TaskError::validation("user_name is required for a user quota"));
            }
        }
        QuotaType::Group => {
            if params.group_name.is_none() {
                return Err(TaskError::validation("group_name is required for a group quota"));
            }
        }
    }

    let Some(quota) = &params.quota else {
        return Ok(());
    };

    for (name, value) in [
        ("advisory_limit_size", quota.advisory_limit_size),
        ("soft_limit_size", quota.soft_limit_size),
        ("hard_limit_size", quota.hard_limit_size),
        ("soft_grace_period", quota.soft_grace_period),
    ] {
        if value == Some(0) {
            return Err(TaskError::validation(format!(
                "Invalid {name} provided, must be greater than 0"
            )));
        }
    }

    if let Some(unit) = quota.cap_unit
        && !matches!(unit, CapacityUnit::Gb | CapacityUnit::Tb)
    {
        return Err(TaskError::validation(
            "Invalid cap_unit provided, only GB and TB are supported",
        ));
    }
    if quota.cap_unit.is_some() && !quota.any_limit_set() {
        return Err(TaskError::validation(
            "cap_unit provided without a limit size; both must be provided together",
        ));
    }
    if quota.any_limit_set() && quota.cap_unit.is_none() {
        return Err(TaskError::validation(
            "limit size provided without cap_unit; both must be provided together",
        ));
    }
    if quota.soft_grace_period.is_some()
        && (quota.period_unit.is_none() || quota.soft_limit_size.is_none())
    {
        return Err(TaskError::validation(
            "soft_grace_period requires period_unit and soft_limit_size",
        ));
    }

    Ok(())
}

/// The SID the quota is keyed on, resolved through the auth provider.
/// Directory quotas have no persona.
async fn resolve_persona<A>(
    array: &A,
    params: &SmartQuotaParams,
) -> Result<Option<String>, TaskError>
where
    A: AuthOps,
{
    let zone = &params.access_zone;
    let provider = params.provider_type.unwrap_or_default();
    match params.quota_type {
        QuotaType::Directory => Ok(None),
        QuotaType::User => {
            // Checked by validate
            let Some(name) = params.user_name.as_deref() else {
                return Ok(None);
            };
            let user = array
                .auth_user(name, zone, provider.as_str())
                .await
                .map_err(|e| {
                    TaskError::failed(format!(
                        "Failed to get the user account {name} in zone {zone} and provider {provider} due to error: {e}"
                    ))
                })?;
            match user.sid_id() {
                Some(sid) => Ok(Some(sid.to_string())),
                None => Err(TaskError::failed(format!(
                    "Failed to get the SID for user {name} in zone {zone}"
                ))),
            }
        }
        QuotaType::Group => {
            let Some(name) = params.group_name.as_deref() else {
                return Ok(None);
            };
            let group = array
                .auth_group(name, zone, provider.as_str())
                .await
                .map_err(|e| {
                    TaskError::failed(format!(
                        "Failed to get the group account {name} in zone {zone} and provider {provider} due to error: {e}"
                    ))
                })?;
            match group.sid_id() {
                Some(sid) => Ok(Some(sid.to_string())),
                None => Err(TaskError::failed(format!(
                    "Failed to get the SID for group {name} in zone {zone}"
                ))),
            }
        }
    }
}

fn create_body(
    params: &SmartQuotaParams,
    desired: Option<&DesiredLimits>,
    path: &str,
    persona_id: Option<&str>,
) -> QuotaCreate {
    let default_limits = DesiredLimits::default();
    let desired = desired.unwrap_or(&default_limits);
    QuotaCreate {
        quota_type: params.quota_type,
        path: path.to_string(),
        persona: persona_id.map(|id| Persona {
            id: Some(id.to_string()),
            ..Default::default()
        }),
        enforced: desired.any_limit(),
        include_snapshots: desired.include_snapshots,
        thresholds_include_overhead: desired.include_overheads.unwrap_or(false),
        thresholds: ThresholdsUpdate {
            advisory: desired.advisory,
            soft: desired.soft,
            hard: desired.hard,
            soft_grace: desired.soft_grace,
        },
    }
}

fn quota_needs_update(observed: &Quota, desired: &DesiredLimits) -> bool {
    if let Some(include_overheads) = desired.include_overheads
        && observed.thresholds_include_overhead != Some(include_overheads)
    {
        return true;
    }
    let thresholds = observed.thresholds.clone().unwrap_or_default();
    let observed_limits = [
        (desired.advisory, thresholds.advisory),
        (desired.soft, thresholds.soft),
        (desired.hard, thresholds.hard),
        (desired.soft_grace, thresholds.soft_grace),
    ];
    observed_limits
        .iter()
        .any(|(want, have)| matches!(want, Some(w) if have != &Some(*w)))
}

fn update_body(observed: &Quota, desired: &DesiredLimits) -> QuotaUpdate {
    QuotaUpdate {
        enforced: Some(observed.enforced.unwrap_or(false) || desired.any_limit()),
        thresholds_include_overhead: desired.include_overheads,
        thresholds: Some(ThresholdsUpdate {
            advisory: desired.advisory,
            soft: desired.soft,
            hard: desired.hard,
            soft_grace: desired.soft_grace,
        }),
    }
}

/// The refetched quota with the persona filled in from the parameters and
/// the thresholds annotated with unit-scaled sizes (`"hard(GB)": "10.0"`).
fn render_details(quota: &Quota, params: &SmartQuotaParams) -> Value {
    let mut details = match serde_json::to_value(quota) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };

    let persona_name = match params.quota_type {
        QuotaType::User => params.user_name.as_deref(),
        QuotaType::Group => params.group_name.as_deref(),
        QuotaType::Directory => None,
    };
    if let Some(name) = persona_name
        && let Some(Value::Object(persona)) = details.get_mut("persona")
    {
        persona.insert("name".to_string(), Value::String(name.to_string()));
        persona.insert(
            "type".to_string(),
            Value::String(params.quota_type.as_str().to_string()),
        );
    }

    if let Some(Value::Object(thresholds)) = details.get_mut("thresholds") {
        annotate_limits(thresholds);
    }
    Value::Object(details)
}

fn annotate_limits(thresholds: &mut Map<String, Value>) {
    for key in ["advisory", "soft", "hard"] {
        let Some(bytes) = thresholds.get(key).and_then(Value::as_u64) else {
            continue;
        };
        if bytes == 0 {
            continue;
        }
        let pretty = bytes_with_unit(bytes);
        if let Some((value, unit)) = pretty.rsplit_once(' ') {
            thresholds.insert(format!("{key}({unit})"), Value::String(value.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onefs_types::{GracePeriodUnit, QuotaThresholds};

    fn base_params() -> SmartQuotaParams {
        SmartQuotaParams {
            path: "/sample_fs".to_string(),
            quota_type: QuotaType::Directory,
            state: State::Present,
            access_zone: "System".to_string(),
            user_name: None,
            group_name: None,
            provider_type: None,
            quota: None,
        }
    }

    fn gb_limits(hard: u64) -> QuotaLimits {
        QuotaLimits {
            hard_limit_size: Some(hard),
            cap_unit: Some(CapacityUnit::Gb),
            ..Default::default()
        }
    }

    #[test]
    fn test_desired_limits_normalized_to_bytes() {
        let limits = QuotaLimits {
            soft_limit_size: Some(4),
            hard_limit_size: Some(10),
            soft_grace_period: Some(1),
            period_unit: Some(GracePeriodUnit::Weeks),
            cap_unit: Some(CapacityUnit::Gb),
            ..Default::default()
        };
        let desired = DesiredLimits::from_limits(&limits);
        assert_eq!(desired.soft, Some(4 * 1024 * 1024 * 1024));
        assert_eq!(desired.hard, Some(10 * 1024 * 1024 * 1024));
        assert_eq!(desired.soft_grace, Some(7 * 86_400));
        assert!(desired.any_limit());
    }

    #[test]
    fn test_desired_limits_grace_unit_defaults_to_days() {
        let limits = QuotaLimits {
            soft_limit_size: Some(4),
            soft_grace_period: Some(2),
            period_unit: None,
            cap_unit: Some(CapacityUnit::Gb),
            ..Default::default()
        };
        let desired = DesiredLimits::from_limits(&limits);
        assert_eq!(desired.soft_grace, Some(2 * 86_400));
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let mut params = base_params();
        params.quota = Some(gb_limits(0));
        let err = validate(&params).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("hard_limit_size"));
    }

    #[test]
    fn test_validate_requires_cap_unit_with_limits() {
        let mut params = base_params();
        params.quota = Some(QuotaLimits {
            hard_limit_size: Some(10),
            ..Default::default()
        });
        assert!(validate(&params).unwrap_err().is_validation());

        params.quota = Some(QuotaLimits {
            cap_unit: Some(CapacityUnit::Tb),
            ..Default::default()
        });
        assert!(validate(&params).unwrap_err().is_validation());
    }

    #[test]
    fn test_validate_rejects_identity_fields_for_directory_quota() {
        let mut params = base_params();
        params.user_name = Some("ansible_user".to_string());
        let err = validate(&params).unwrap_err();
        assert!(err.to_string().contains("not applicable for directory quotas"));
    }

    #[test]
    fn test_validate_requires_identity_for_user_quota() {
        let mut params = base_params();
        params.quota_type = QuotaType::User;
        assert!(validate(&params).unwrap_err().is_validation());
    }

    #[test]
    fn test_validate_rejects_mb_cap_unit() {
        let mut params = base_params();
        params.quota = Some(QuotaLimits {
            hard_limit_size: Some(10),
            cap_unit: Some(CapacityUnit::Mb),
            ..Default::default()
        });
        let err = validate(&params).unwrap_err();
        assert!(err.to_string().contains("only GB and TB"));
    }

    #[test]
    fn test_create_body_enforces_when_limit_set() {
        let params = base_params();
        let desired = DesiredLimits::from_limits(&gb_limits(10));
        let body = create_body(&params, Some(&desired), "/ifs/sample_fs", None);
        assert!(body.enforced);
        assert_eq!(body.thresholds.hard, Some(10 * 1024 * 1024 * 1024));
        assert!(body.persona.is_none());
        assert!(!body.include_snapshots);
    }

    #[test]
    fn test_create_body_accounting_only_without_limits() {
        let params = base_params();
        let body = create_body(&params, None, "/ifs/sample_fs", None);
        assert!(!body.enforced);
        assert_eq!(body.thresholds, ThresholdsUpdate::default());
    }

    #[test]
    fn test_quota_needs_update_on_limit_divergence() {
        let observed = Quota {
            id: "iddqd".to_string(),
            enforced: Some(true),
            thresholds_include_overhead: Some(false),
            thresholds: Some(QuotaThresholds {
                hard: Some(5 * 1024 * 1024 * 1024),
                ..Default::default()
            }),
            ..Default::default()
        };

        let same = DesiredLimits {
            hard: Some(5 * 1024 * 1024 * 1024),
            ..Default::default()
        };
        assert!(!quota_needs_update(&observed, &same));

        let grown = DesiredLimits {
            hard: Some(10 * 1024 * 1024 * 1024),
            ..Default::default()
        };
        assert!(quota_needs_update(&observed, &grown));

        let overheads = DesiredLimits {
            include_overheads: Some(true),
            ..Default::default()
        };
        assert!(quota_needs_update(&observed, &overheads));
    }

    #[test]
    fn test_update_body_keeps_enforcement_sticky() {
        let observed = Quota {
            id: "iddqd".to_string(),
            enforced: Some(true),
            ..Default::default()
        };
        // No new limits, but the quota was already enforced
        let body = update_body(&observed, &DesiredLimits::default());
        assert_eq!(body.enforced, Some(true));
        assert_eq!(body.thresholds_include_overhead, None);
    }

    #[test]
    fn test_annotate_limits_adds_unit_keys() {
        let mut thresholds = match json!({
            "advisory": null,
            "soft": 2147483648u64,
            "hard": 10737418240u64
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        annotate_limits(&mut thresholds);
        assert_eq!(thresholds["soft(GB)"], "2.0");
        assert_eq!(thresholds["hard(GB)"], "10.0");
        assert!(!thresholds.contains_key("advisory(GB)"));
    }
}
