//! Access zone models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An access zone as reported by the array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessZone {
    /// Zone identifier (matches the name)
    pub id: Option<String>,

    /// Zone name
    pub name: Option<String>,

    /// Base path of the zone (e.g. "/ifs/sample-zone")
    pub path: Option<String>,

    /// Groupnet the zone is bound to
    pub groupnet: Option<String>,

    /// Numeric zone id
    pub zone_id: Option<i64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Summary entry for an access zone (base path lookup)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneSummary {
    /// Base path of the zone
    pub path: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
