//! Category Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rate category shared by zones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub rate_normal: Decimal,
    pub rate_special: Decimal,
}

/// Update rates payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRates {
    pub rate_normal: Decimal,
    pub rate_special: Decimal,
}
