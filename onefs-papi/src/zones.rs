// SPDX-License-Identifier: GPL-3.0-only

//! Access zone endpoints

use onefs_types::{AccessZone, ZoneSummary};
use serde::Deserialize;

use crate::client::PapiClient;
use crate::error::{PapiError, Result};

#[derive(Deserialize)]
struct ZonesWrapper {
    zones: Vec<AccessZone>,
}

#[derive(Deserialize)]
struct ZoneSummaryWrapper {
    summary: ZoneSummary,
}

impl PapiClient {
    /// Fetch one access zone by name. 404 surfaces as [`PapiError::Api`].
    pub async fn get_zone(&self, name: &str) -> Result<AccessZone> {
        let wrapper: ZonesWrapper = self
            .get_json(&format!("/platform/3/zones/{name}"), &[])
            .await?;
        wrapper
            .zones
            .into_iter()
            .next()
            .ok_or_else(|| PapiError::UnexpectedBody("empty zones list".into()))
    }

    /// List every access zone on the array.
    pub async fn list_zones(&self) -> Result<Vec<AccessZone>> {
        let wrapper: ZonesWrapper = self.get_json("/platform/3/zones", &[]).await?;
        Ok(wrapper.zones)
    }

    /// Filesystem base path of an access zone, e.g. `/ifs/zone1`.
    pub async fn get_zone_base_path(&self, name: &str) -> Result<String> {
        let wrapper: ZoneSummaryWrapper = self
            .get_json(&format!("/platform/3/zones-summary/zone/{name}"), &[])
            .await?;
        Ok(wrapper.summary.path)
    }
}
