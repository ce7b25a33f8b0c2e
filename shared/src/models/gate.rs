//! Gate Model

use serde::{Deserialize, Serialize};

/// Gate entity (physical entry point with its zones)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gate {
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub zone_ids: Vec<String>,
}
