// SPDX-License-Identifier: GPL-3.0-only

//! RAN namespace endpoints for directories and their ACLs
//!
//! Namespace paths are given relative to the filesystem root, without a
//! leading slash (`ifs/data/sample`), because the slash separating them from
//! `/namespace` is part of the route.

use onefs_types::NamespaceAcl;
use reqwest::Method;
use serde_json::Value;

use crate::client::{PapiClient, decode_json, with_query};
use crate::error::Result;

const TARGET_TYPE_HEADER: &str = "x-isi-ifs-target-type";
const ACCESS_CONTROL_HEADER: &str = "x-isi-ifs-access-control";

impl PapiClient {
    /// Directory metadata, shaped as the array reports it (an `attrs` list).
    pub async fn get_directory_metadata(&self, path: &str) -> Result<Value> {
        self.get_json(&format!("/namespace/{path}"), &[("metadata", "true".to_string())])
            .await
    }

    /// Create a directory. `initial_acl` is a raw access control value for
    /// the creation headers; permissions can also be set afterwards through
    /// [`PapiClient::set_acl`].
    pub async fn create_directory(
        &self,
        path: &str,
        recursive: bool,
        initial_acl: Option<&str>,
    ) -> Result<()> {
        let route = format!("/namespace/{path}");
        let query = [
            ("recursive", recursive.to_string()),
            ("overwrite", "false".to_string()),
        ];
        let mut request = with_query(self.request(Method::PUT, &route), &query)
            .header(TARGET_TYPE_HEADER, "container");
        if let Some(acl) = initial_acl {
            request = request.header(ACCESS_CONTROL_HEADER, acl);
        }
        self.send(Method::PUT, &route, request).await?;
        Ok(())
    }

    /// Delete a directory. The array refuses to remove a non-empty one.
    pub async fn delete_directory(&self, path: &str) -> Result<()> {
        self.delete(&format!("/namespace/{path}"), &[]).await
    }

    /// Fetch the ACL document of a directory.
    pub async fn get_acl(&self, path: &str) -> Result<NamespaceAcl> {
        let route = format!("/namespace/{path}");
        let query = [("acl", "true".to_string())];
        let request = with_query(self.request(Method::GET, &route), &query);
        let response = self.send(Method::GET, &route, request).await?;
        decode_json(response).await
    }

    /// Replace the ACL document of a directory.
    pub async fn set_acl(&self, path: &str, acl: &NamespaceAcl) -> Result<()> {
        self.put_json(&format!("/namespace/{path}"), &[("acl", "true".to_string())], acl)
            .await
    }
}
