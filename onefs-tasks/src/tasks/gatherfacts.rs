// SPDX-License-Identifier: GPL-3.0-only

//! Gather-facts task: read-only collection of cluster and zone information
//!
//! The report always carries every category key; unrequested subsets stay
//! empty arrays so consumers can index them unconditionally.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use crate::error::TaskError;
use crate::ops::{AuthOps, ClusterOps, ZoneOps};
use crate::tasks::default_zone;

/// Fact categories a task file can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactSubset {
    Attributes,
    AccessZones,
    Nodes,
    Providers,
    Users,
    Groups,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatherFactsParams {
    #[serde(default = "default_zone")]
    pub access_zone: String,

    /// Categories to collect; must name at least one
    pub gather_subset: Vec<FactSubset>,
}

#[derive(Debug, Serialize)]
pub struct GatherFactsReport {
    /// Fact gathering never mutates the array
    pub changed: bool,

    #[serde(rename = "Attributes")]
    pub attributes: Value,

    #[serde(rename = "AccessZones")]
    pub access_zones: Value,

    #[serde(rename = "Nodes")]
    pub nodes: Value,

    #[serde(rename = "Providers")]
    pub providers: Value,

    #[serde(rename = "Users")]
    pub users: Value,

    #[serde(rename = "Groups")]
    pub groups: Value,
}

pub async fn run<A>(array: &A, params: &GatherFactsParams) -> Result<GatherFactsReport, TaskError>
where
    A: ZoneOps + ClusterOps + AuthOps,
{
    if params.gather_subset.is_empty() {
        return Err(TaskError::validation("Please specify gather_subset"));
    }
    let zone = &params.access_zone;
    let wanted = |subset| params.gather_subset.contains(&subset);

    let mut report = GatherFactsReport {
        changed: false,
        attributes: json!([]),
        access_zones: json!([]),
        nodes: json!([]),
        providers: json!([]),
        users: json!([]),
        groups: json!([]),
    };

    if wanted(FactSubset::Attributes) {
        info!("gathering cluster attributes");
        report.attributes = cluster_attributes(array).await?;
    }
    if wanted(FactSubset::AccessZones) {
        info!("gathering access zones");
        let zones = array
            .zones()
            .await
            .map_err(|e| e.context("Get access zone list for the cluster"))?;
        report.access_zones = serde_json::to_value(zones).unwrap_or_else(|_| json!([]));
    }
    if wanted(FactSubset::Nodes) {
        info!("gathering cluster nodes");
        report.nodes = array
            .cluster_nodes()
            .await
            .map_err(|e| e.context("Get node list for the cluster"))?;
    }
    if wanted(FactSubset::Providers) {
        info!(%zone, "gathering auth providers");
        report.providers = array.providers_summary(zone).await.map_err(|e| {
            e.context(format!("Get authentication provider list for access zone {zone}"))
        })?;
    }
    if wanted(FactSubset::Users) {
        info!(%zone, "gathering users");
        report.users = array
            .auth_users(zone)
            .await
            .map_err(|e| e.context(format!("Get user list for access zone {zone}")))?;
    }
    if wanted(FactSubset::Groups) {
        info!(%zone, "gathering groups");
        report.groups = array
            .auth_groups(zone)
            .await
            .map_err(|e| e.context(format!("Get group list for access zone {zone}")))?;
    }

    Ok(report)
}

/// Cluster-wide attributes: config, contact info, the external IPs joined
/// into one string, the logon banner and the version document.
async fn cluster_attributes<A: ClusterOps + ?Sized>(array: &A) -> Result<Value, TaskError> {
    let config = array
        .cluster_config()
        .await
        .map_err(|e| e.context("Get cluster config"))?;
    let ips = array
        .external_ips()
        .await
        .map_err(|e| e.context("Get cluster external IPs"))?;
    let identity = array
        .cluster_identity()
        .await
        .map_err(|e| e.context("Get cluster identity"))?;
    let owner = array
        .cluster_owner()
        .await
        .map_err(|e| e.context("Get cluster owner"))?;
    let version = array
        .cluster_version()
        .await
        .map_err(|e| e.context("Get cluster version"))?;
    Ok(json!({
        "Config": config,
        "Contact_Info": owner,
        "External_IP": {"External IPs": ips.join(",")},
        "Logon_msg": identity,
        "Cluster_Version": version,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subset_serde_spelling() {
        let subset: Vec<FactSubset> =
            serde_json::from_str(r#"["attributes", "access_zones", "nodes"]"#).unwrap();
        assert_eq!(
            subset,
            vec![FactSubset::Attributes, FactSubset::AccessZones, FactSubset::Nodes]
        );
        assert!(serde_json::from_str::<FactSubset>("\"zones\"").is_err());
    }

    #[test]
    fn test_params_default_zone() {
        let params: GatherFactsParams =
            serde_json::from_str(r#"{"gather_subset": ["users"]}"#).unwrap();
        assert_eq!(params.access_zone, "System");
    }

    #[test]
    fn test_report_keys_keep_original_spelling() {
        let report = GatherFactsReport {
            changed: false,
            attributes: json!([]),
            access_zones: json!([]),
            nodes: json!([]),
            providers: json!([]),
            users: json!([{"name": "ansible_user"}]),
            groups: json!([]),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("Attributes").is_some());
        assert!(value.get("AccessZones").is_some());
        assert_eq!(value["Users"][0]["name"], "ansible_user");
        assert_eq!(value["changed"], false);
    }
}
