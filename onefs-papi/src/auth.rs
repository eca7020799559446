// SPDX-License-Identifier: GPL-3.0-only

//! Authentication provider endpoints
//!
//! User and group routes address principals as `USER:<name>` and
//! `GROUP:<name>`; the colon is legal in a path segment and the array expects
//! it unencoded.

use onefs_types::{AuthGroup, AuthUser};
use serde::Deserialize;
use serde_json::Value;

use crate::client::PapiClient;
use crate::error::{PapiError, Result};

#[derive(Deserialize)]
struct UsersWrapper {
    users: Vec<AuthUser>,
}

#[derive(Deserialize)]
struct GroupsWrapper {
    groups: Vec<AuthGroup>,
}

impl PapiClient {
    /// Look up a user in a zone through one auth provider.
    pub async fn get_auth_user(&self, name: &str, zone: &str, provider: &str) -> Result<AuthUser> {
        let query = [("zone", zone.to_string()), ("provider", provider.to_string())];
        let wrapper: UsersWrapper = self
            .get_json(&format!("/platform/1/auth/users/USER:{name}"), &query)
            .await?;
        wrapper
            .users
            .into_iter()
            .next()
            .ok_or_else(|| PapiError::UnexpectedBody("empty users list".into()))
    }

    /// Look up a group in a zone through one auth provider.
    pub async fn get_auth_group(
        &self,
        name: &str,
        zone: &str,
        provider: &str,
    ) -> Result<AuthGroup> {
        let query = [("zone", zone.to_string()), ("provider", provider.to_string())];
        let wrapper: GroupsWrapper = self
            .get_json(&format!("/platform/1/auth/groups/GROUP:{name}"), &query)
            .await?;
        wrapper
            .groups
            .into_iter()
            .next()
            .ok_or_else(|| PapiError::UnexpectedBody("empty groups list".into()))
    }

    /// All users visible in a zone, as the raw wrapper document.
    pub async fn list_auth_users(&self, zone: &str) -> Result<Value> {
        self.get_json("/platform/1/auth/users", &[("zone", zone.to_string())])
            .await
    }

    /// All groups visible in a zone, as the raw wrapper document.
    pub async fn list_auth_groups(&self, zone: &str) -> Result<Value> {
        self.get_json("/platform/1/auth/groups", &[("zone", zone.to_string())])
            .await
    }

    /// Summary of auth providers configured for a zone.
    pub async fn get_providers_summary(&self, zone: &str) -> Result<Value> {
        self.get_json("/platform/1/auth/providers/summary", &[("zone", zone.to_string())])
            .await
    }
}
