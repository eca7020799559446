// SPDX-License-Identifier: GPL-3.0-only

//! HTTP plumbing shared by every endpoint group

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use crate::config::ConnectionConfig;
use crate::error::{PapiError, Result, scrub_body};

/// Timeout for a single API round-trip.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one OneFS array.
///
/// Construction is cheap and never touches the network; the first API call
/// surfaces connectivity problems. All endpoint methods live in sibling
/// modules as `impl PapiClient` blocks, one per API area.
pub struct PapiClient {
    id: Uuid,
    base_url: String,
    client: reqwest::Client,
    username: String,
    password: String,
}

impl PapiClient {
    /// Build a client from connection parameters.
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.verify_ssl)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PapiError::Config(e.to_string()))?;
        let id = Uuid::new_v4();
        let base_url = config.base_url();
        debug!(client = %id, url = %base_url, "created OneFS API client");
        Ok(PapiClient {
            id,
            base_url,
            client,
            username: config.api_user.clone(),
            password: config.api_password.clone(),
        })
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .basic_auth(&self.username, Some(&self.password))
    }

    /// Issue a prepared request and map the status code. `path` is only for
    /// the log line; the builder already carries the full URL.
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
    ) -> Result<Response> {
        debug!(client = %self.id, %method, path, "OneFS API request");
        let response = request.send().await.map_err(PapiError::transport)?;
        handle_response(response).await
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let request = with_query(self.request(Method::GET, path), query);
        let response = self.send(Method::GET, path, request).await?;
        decode_json(response).await
    }

    pub(crate) async fn post_json<B, T>(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = with_query(self.request(Method::POST, path), query).json(body);
        let response = self.send(Method::POST, path, request).await?;
        decode_json(response).await
    }

    pub(crate) async fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<()> {
        let request = with_query(self.request(Method::PUT, path), query).json(body);
        self.send(Method::PUT, path, request).await?;
        Ok(())
    }

    pub(crate) async fn delete(&self, path: &str, query: &[(&str, String)]) -> Result<()> {
        let request = with_query(self.request(Method::DELETE, path), query);
        self.send(Method::DELETE, path, request).await?;
        Ok(())
    }
}

/// Append query parameters, leaving the URL untouched when there are none.
pub(crate) fn with_query(request: RequestBuilder, query: &[(&str, String)]) -> RequestBuilder {
    if query.is_empty() { request } else { request.query(query) }
}

async fn handle_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = match response.text().await {
        Ok(body) if !body.trim().is_empty() => scrub_body(&body),
        _ => status.canonical_reason().unwrap_or("request failed").to_string(),
    };
    Err(PapiError::Api { status: status.as_u16(), message })
}

pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| PapiError::UnexpectedBody(e.to_string()))
}
