// SPDX-License-Identifier: GPL-3.0-only

//! Client for the OneFS Platform API (PAPI) and the RAN namespace API.
//!
//! A deliberately thin, hand-written HTTP client: every method maps to one
//! API call, URLs are built with `format!`, and non-success responses become
//! [`PapiError::Api`] with the status code preserved so callers can tell
//! "absent" (404) apart from real failures. There is no retry, backoff or
//! caching layer; callers own those decisions.

pub mod client;
pub mod config;
pub mod error;

mod auth;
mod cluster;
mod namespace;
mod protocols;
mod quota;
mod snapshot;
mod zones;

pub use client::PapiClient;
pub use config::ConnectionConfig;
pub use error::{PapiError, Result};
pub use quota::QuotaQuery;
