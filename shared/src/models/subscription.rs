//! Subscription Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Car registered on a subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    pub plate: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub color: String,
}

/// Subscription (read-only on the client)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub active: bool,
    /// Category id this subscription grants access to
    pub category: String,
    #[serde(default)]
    pub cars: Vec<Car>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_ts: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Find the registered car with this plate.
    ///
    /// Plates compare ignoring case and whitespace, the way operators type them.
    pub fn find_car(&self, plate: &str) -> Option<&Car> {
        let wanted = normalize_plate(plate);
        if wanted.is_empty() {
            return None;
        }
        self.cars.iter().find(|c| normalize_plate(&c.plate) == wanted)
    }
}

fn normalize_plate(plate: &str) -> String {
    plate
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription() -> Subscription {
        serde_json::from_str(
            r#"{
                "id": "sub_001",
                "userName": "Ali",
                "active": true,
                "category": "cat_premium",
                "cars": [
                    {"plate": "ABC-123", "brand": "Toyota", "model": "Corolla", "color": "white"},
                    {"plate": "XYZ 987", "brand": "Kia", "model": "Rio", "color": "red"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_find_car_ignores_case_and_separators() {
        let sub = subscription();
        assert_eq!(sub.find_car("abc123").map(|c| c.brand.as_str()), Some("Toyota"));
        assert_eq!(sub.find_car(" xyz-987 ").map(|c| c.model.as_str()), Some("Rio"));
    }

    #[test]
    fn test_find_car_rejects_unknown_and_empty_plates() {
        let sub = subscription();
        assert!(sub.find_car("QQQ-000").is_none());
        assert!(sub.find_car("   ").is_none());
    }
}
