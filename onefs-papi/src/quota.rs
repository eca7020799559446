// SPDX-License-Identifier: GPL-3.0-only

//! SmartQuotas endpoints

use onefs_types::{Quota, QuotaCreate, QuotaType, QuotaUpdate};
use serde::Deserialize;

use crate::client::PapiClient;
use crate::error::Result;

/// Server-side filter for listing quotas.
#[derive(Debug, Clone, Default)]
pub struct QuotaQuery {
    pub path: Option<String>,
    pub quota_type: Option<QuotaType>,
    pub include_snapshots: Option<bool>,
    pub persona: Option<String>,
    pub zone: Option<String>,
}

impl QuotaQuery {
    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(path) = &self.path {
            params.push(("path", path.clone()));
        }
        if let Some(quota_type) = self.quota_type {
            params.push(("type", quota_type.as_str().to_string()));
        }
        if let Some(include_snapshots) = self.include_snapshots {
            params.push(("include_snapshots", include_snapshots.to_string()));
        }
        if let Some(persona) = &self.persona {
            params.push(("persona", persona.clone()));
        }
        if let Some(zone) = &self.zone {
            params.push(("zone", zone.clone()));
        }
        params
    }
}

#[derive(Deserialize)]
struct QuotasWrapper {
    quotas: Vec<Quota>,
}

#[derive(Deserialize)]
struct CreatedQuota {
    id: String,
}

impl PapiClient {
    /// List quotas matching the query. An empty result is not an error.
    pub async fn list_quotas(&self, query: &QuotaQuery) -> Result<Vec<Quota>> {
        let wrapper: QuotasWrapper = self
            .get_json("/platform/1/quota/quotas", &query.to_params())
            .await?;
        Ok(wrapper.quotas)
    }

    /// Create a quota, optionally inside an access zone. Returns the id the
    /// array assigned.
    pub async fn create_quota(&self, body: &QuotaCreate, zone: Option<&str>) -> Result<String> {
        let query: Vec<(&str, String)> = match zone {
            Some(zone) => vec![("zone", zone.to_string())],
            None => Vec::new(),
        };
        let created: CreatedQuota = self
            .post_json("/platform/1/quota/quotas", &query, body)
            .await?;
        Ok(created.id)
    }

    /// Update a quota by id.
    pub async fn update_quota(&self, id: &str, body: &QuotaUpdate) -> Result<()> {
        self.put_json(&format!("/platform/1/quota/quotas/{id}"), &[], body)
            .await
    }

    /// Delete a quota by id.
    pub async fn delete_quota(&self, id: &str) -> Result<()> {
        self.delete(&format!("/platform/1/quota/quotas/{id}"), &[])
            .await
    }

    /// Delete every quota of one type on a path.
    pub async fn delete_quotas_matching(&self, path: &str, quota_type: QuotaType) -> Result<()> {
        let query = [
            ("path", path.to_string()),
            ("type", quota_type.as_str().to_string()),
        ];
        self.delete("/platform/1/quota/quotas", &query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_query_params() {
        let query = QuotaQuery {
            path: Some("/ifs/data/projects".into()),
            quota_type: Some(QuotaType::User),
            include_snapshots: Some(false),
            persona: Some("UID:2000".into()),
            zone: Some("System".into()),
        };
        assert_eq!(
            query.to_params(),
            vec![
                ("path", "/ifs/data/projects".to_string()),
                ("type", "user".to_string()),
                ("include_snapshots", "false".to_string()),
                ("persona", "UID:2000".to_string()),
                ("zone", "System".to_string()),
            ]
        );
    }

    #[test]
    fn test_quota_query_empty() {
        assert!(QuotaQuery::default().to_params().is_empty());
    }
}
