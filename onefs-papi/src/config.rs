// SPDX-License-Identifier: GPL-3.0-only

//! Connection parameters for a OneFS array

use serde::{Deserialize, Serialize};

/// Everything needed to reach one array's API endpoint.
///
/// The password never appears in `Debug` output or logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Array address: IP or FQDN
    pub onefs_host: String,

    /// API port
    #[serde(default = "default_port")]
    pub port_no: u16,

    /// Whether to validate the array's SSL certificate
    pub verify_ssl: bool,

    /// Username for basic authentication
    pub api_user: String,

    /// Password for basic authentication
    pub api_password: String,
}

fn default_port() -> u16 {
    8080
}

impl ConnectionConfig {
    /// Base URL of the array API, e.g. `https://10.1.2.3:8080`.
    pub fn base_url(&self) -> String {
        format!("https://{}:{}", self.onefs_host, self.port_no)
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("onefs_host", &self.onefs_host)
            .field("port_no", &self.port_no)
            .field("verify_ssl", &self.verify_ssl)
            .field("api_user", &self.api_user)
            .field("api_password", &"<redacted>")
            .finish()
    }
}
