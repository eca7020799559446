// SPDX-License-Identifier: GPL-3.0-only

//! Snapshot task: reconcile a filesystem snapshot's expiration, alias and
//! name
//!
//! Expiration can be given as an absolute UTC timestamp or as a retention
//! period. On create the period is anchored at "now"; against an existing
//! snapshot it is anchored at the snapshot's creation time, and a divergence
//! inside the tolerance window counts as already converged.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use onefs_types::{
    RetentionUnit, Snapshot, SnapshotCreate, SnapshotUpdate, State, expiry_within_tolerance,
    parse_expiration_timestamp, retention_expiry,
};

use crate::error::TaskError;
use crate::ops::{SnapshotOps, ZoneOps};
use crate::tasks::{default_zone, is_system_zone};

/// Retention as written in a task file: an integer, an integer string, or
/// the literal `"None"` meaning the snapshot is kept forever.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RetentionInput {
    Count(u64),
    Text(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotParams {
    pub snapshot_name: String,

    pub state: State,

    /// Path the snapshot captures; required on create
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default = "default_zone")]
    pub access_zone: String,

    /// Rename an existing snapshot
    #[serde(default)]
    pub new_snapshot_name: Option<String>,

    /// Absolute expiration, `2025-01-01T00:00:00Z` style (UTC)
    #[serde(default)]
    pub expiration_timestamp: Option<String>,

    /// Relative retention; mutually exclusive with `expiration_timestamp`
    #[serde(default)]
    pub desired_retention: Option<RetentionInput>,

    #[serde(default)]
    pub retention_unit: Option<RetentionUnit>,

    #[serde(default)]
    pub alias: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SnapshotReport {
    pub changed: bool,
    pub snapshot_details: Value,
}

/// Validated retention input.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Retention {
    Period(u64),
    /// Explicit "None": the snapshot must not expire
    NoExpiry,
}

/// What the expiration should become, once a check is requested at all.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ExpiryIntent {
    Set(i64),
    Clear,
}

pub async fn run<A>(array: &A, params: &SnapshotParams) -> Result<SnapshotReport, TaskError>
where
    A: ZoneOps + SnapshotOps,
{
    let (retention, expiration_epoch) = validate(params)?;
    let name = &params.snapshot_name;

    let zone = &params.access_zone;
    let effective_path = match &params.path {
        Some(path) if !is_system_zone(zone) => {
            let base = array
                .zone_base_path(zone)
                .await
                .map_err(|e| e.context(format!("Fetch base path of access zone {zone}")))?;
            Some(format!("{base}{path}"))
        }
        Some(path) => Some(path.clone()),
        None => None,
    };

    let observed = array
        .snapshot(name)
        .await
        .map_err(|e| e.context(format!("Get details of Snapshot {name}")))?;

    let mut changed = false;
    let mut final_name = name.clone();
    match (params.state, &observed) {
        (State::Present, None) => {
            let expires =
                create_expiry(params, retention, expiration_epoch, Utc::now().timestamp())?;
            let Some(path) = &effective_path else {
                return Err(TaskError::validation(
                    "Please provide a valid path for snapshot creation",
                ));
            };
            info!(snapshot = %name, %path, "creating snapshot");
            let body = SnapshotCreate {
                name: name.clone(),
                path: path.clone(),
                expires,
                alias: params.alias.clone(),
            };
            array
                .create_snapshot(&body)
                .await
                .map_err(|e| e.context(format!("Create snapshot {name} for filesystem {path}")))?;
            changed = true;
        }
        (State::Present, Some(snapshot)) => {
            if let (Some(effective), Some(on_array)) = (&effective_path, &snapshot.path)
                && effective != on_array
            {
                return Err(TaskError::failed(format!(
                    "The path {effective} specified in the playbook does not match the path of the snapshot {name} on the array"
                )));
            }

            let expiry_update = match desired_expiry(
                retention,
                params.retention_unit,
                expiration_epoch,
                snapshot.created.unwrap_or_else(|| Utc::now().timestamp()),
            ) {
                Some(intent) => expiry_divergence(snapshot.expires, intent),
                None => None,
            };

            let alias_update = match &params.alias {
                Some(alias) => {
                    let aliases = array
                        .snapshots(Some("alias"))
                        .await
                        .map_err(|e| e.context(format!("Get alias for snapshot {name}")))?;
                    if current_alias(&aliases, name).as_deref() == Some(alias.as_str()) {
                        None
                    } else {
                        Some(alias.clone())
                    }
                }
                None => None,
            };

            if let Some(new_name) = &params.new_snapshot_name
                && snapshot.name.as_deref() != Some(new_name.as_str())
            {
                info!(snapshot = %name, %new_name, "renaming snapshot");
                let body = SnapshotUpdate { name: Some(new_name.clone()), ..Default::default() };
                array
                    .update_snapshot(name, &body)
                    .await
                    .map_err(|e| e.context(format!("Rename snapshot {name}")))?;
                final_name = new_name.clone();
                changed = true;
            }

            if let Some(expires) = expiry_update {
                info!(snapshot = %final_name, ?expires, "updating snapshot expiration");
                let body = SnapshotUpdate { expires: Some(expires), ..Default::default() };
                array
                    .update_snapshot(&final_name, &body)
                    .await
                    .map_err(|e| e.context(format!("Modify snapshot {final_name}")))?;
                changed = true;
            }
            if let Some(alias) = alias_update {
                info!(snapshot = %final_name, %alias, "updating snapshot alias");
                let body = SnapshotUpdate { alias: Some(alias), ..Default::default() };
                array
                    .update_snapshot(&final_name, &body)
                    .await
                    .map_err(|e| e.context(format!("Modify snapshot {final_name}")))?;
                changed = true;
            }
        }
        (State::Absent, Some(_)) => {
            info!(snapshot = %name, "deleting snapshot");
            array
                .delete_snapshot(name)
                .await
                .map_err(|e| e.context(format!("Delete snapshot {name}")))?;
            changed = true;
        }
        (State::Absent, None) => {}
    }

    let snapshot_details = if params.state.is_present() {
        let refetched = array
            .snapshot(&final_name)
            .await
            .map_err(|e| e.context(format!("Get details of Snapshot {final_name}")))?;
        refetched
            .and_then(|snapshot| serde_json::to_value(snapshot).ok())
            .unwrap_or_else(|| json!({}))
    } else {
        json!({})
    };

    Ok(SnapshotReport { changed, snapshot_details })
}

fn validate(params: &SnapshotParams) -> Result<(Option<Retention>, Option<i64>), TaskError> {
    if params.snapshot_name.trim().is_empty() {
        return Err(TaskError::validation("Please provide a valid snapshot name"));
    }
    if params.desired_retention.is_some() && params.expiration_timestamp.is_some() {
        return Err(TaskError::validation(
            "desired_retention and expiration_timestamp are mutually exclusive",
        ));
    }
    if params.expiration_timestamp.is_some() && params.retention_unit.is_some() {
        return Err(TaskError::validation(
            "expiration_timestamp and retention_unit are mutually exclusive",
        ));
    }
    if params.retention_unit.is_some() && params.desired_retention.is_none() {
        return Err(TaskError::validation(
            "Specify desired retention along with retention unit",
        ));
    }

    let retention = params.desired_retention.as_ref().map(parse_retention).transpose()?;
    let expiration_epoch = params
        .expiration_timestamp
        .as_deref()
        .map(|text| {
            parse_expiration_timestamp(text).map_err(|_| {
                TaskError::validation("Incorrect date format, should be YYYY-MM-DDTHH:MM:SSZ")
            })
        })
        .transpose()?;
    Ok((retention, expiration_epoch))
}

fn parse_retention(input: &RetentionInput) -> Result<Retention, TaskError> {
    match input {
        RetentionInput::Count(period) => Ok(Retention::Period(*period)),
        RetentionInput::Text(text) if text.eq_ignore_ascii_case("none") => Ok(Retention::NoExpiry),
        RetentionInput::Text(text) => text.trim().parse().map(Retention::Period).map_err(|_| {
            TaskError::validation("Please provide a valid integer as the desired retention")
        }),
    }
}

/// The expiration to submit on create, anchored at "now". `None` means the
/// snapshot never expires.
fn create_expiry(
    params: &SnapshotParams,
    retention: Option<Retention>,
    expiration_epoch: Option<i64>,
    now: i64,
) -> Result<Option<i64>, TaskError> {
    let name = &params.snapshot_name;
    if params.new_snapshot_name.is_some() {
        return Err(TaskError::failed(format!(
            "The given snapshot {name} does not exist. Invalid param: new_snapshot_name while creating a new snapshot"
        )));
    }
    if retention.is_none() && expiration_epoch.is_none() {
        return Err(TaskError::failed(format!(
            "The given snapshot {name} does not exist. Provide either desired_retention or expiration_timestamp for creating a snapshot"
        )));
    }
    Ok(match desired_expiry(retention, params.retention_unit, expiration_epoch, now) {
        Some(ExpiryIntent::Set(epoch)) => Some(epoch),
        Some(ExpiryIntent::Clear) | None => None,
    })
}

/// What the expiration should be, anchored at `anchor` for relative
/// retention. `None` means nothing was requested and no check happens.
fn desired_expiry(
    retention: Option<Retention>,
    unit: Option<RetentionUnit>,
    expiration_epoch: Option<i64>,
    anchor: i64,
) -> Option<ExpiryIntent> {
    match (retention, expiration_epoch) {
        (Some(Retention::Period(period)), _) => {
            Some(ExpiryIntent::Set(retention_expiry(anchor, period, unit.unwrap_or_default())))
        }
        (Some(Retention::NoExpiry), _) => Some(ExpiryIntent::Clear),
        (None, Some(epoch)) => Some(ExpiryIntent::Set(epoch)),
        (None, None) => None,
    }
}

/// The `expires` value to submit, or `None` when the observed expiration
/// already matches. `Some(None)` clears the expiration on the array.
fn expiry_divergence(observed: Option<i64>, intent: ExpiryIntent) -> Option<Option<i64>> {
    match (intent, observed) {
        (ExpiryIntent::Set(desired), Some(observed)) => {
            if expiry_within_tolerance(desired, observed) {
                None
            } else {
                Some(Some(desired))
            }
        }
        (ExpiryIntent::Set(desired), None) => Some(Some(desired)),
        (ExpiryIntent::Clear, Some(_)) => Some(None),
        (ExpiryIntent::Clear, None) => None,
    }
}

/// The alias currently pointing at a snapshot, from the alias-type listing.
fn current_alias(aliases: &[Snapshot], snapshot_name: &str) -> Option<String> {
    aliases
        .iter()
        .find(|entry| entry.target_name.as_deref() == Some(snapshot_name))
        .and_then(|entry| entry.name.clone())
}
