//! Special-rate schedule models (rush hours, vacations)

use serde::{Deserialize, Serialize};

/// Weekly rush-hour window, `from`/`to` as `HH:MM`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RushHour {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// 0 = Sunday .. 6 = Saturday
    pub week_day: u8,
    pub from: String,
    pub to: String,
}

/// Vacation period, `from`/`to` as `YYYY-MM-DD`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vacation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub from: String,
    pub to: String,
}
