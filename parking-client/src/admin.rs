//! Admin API and form validation
//!
//! Every admin endpoint needs a bearer token; a client without one fails with
//! [`ClientError::Unauthorized`] before anything is sent. Forms validate
//! locally and never reach the server when invalid.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use shared::client::ZoneOpenRequest;
use shared::models::{
    AdminZone, Category, CategoryRates, Employee, EmployeeCreate, RushHour, UserRole, Vacation,
};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{ClientResult, HttpClient};

const TIME_FORMAT: &str = "%H:%M";
const DATE_FORMAT: &str = "%Y-%m-%d";

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Rush hour form; `week_day` 0 is Sunday
#[derive(Debug, Clone, Default)]
pub struct RushHourForm {
    pub week_day: Option<u8>,
    pub from: String,
    pub to: String,
}

impl Validate for RushHourForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let Some(week_day) = self.week_day.filter(|_| !blank(&self.from) && !blank(&self.to))
        else {
            errors.add("form", error("required", "All fields are required"));
            return Err(errors);
        };

        if week_day > 6 {
            errors.add("week_day", error("week_day_range", "Week day must be between 0 and 6"));
        }

        let from = NaiveTime::parse_from_str(self.from.trim(), TIME_FORMAT);
        let to = NaiveTime::parse_from_str(self.to.trim(), TIME_FORMAT);
        if from.is_err() {
            errors.add("from", error("time_format", "Start time must be HH:MM"));
        }
        if to.is_err() {
            errors.add("to", error("time_format", "End time must be HH:MM"));
        }
        if let (Ok(from), Ok(to)) = (from, to) {
            if from >= to {
                errors.add("to", error("time_order", "End time must be after start time"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl RushHourForm {
    /// Validated payload for `POST /admin/rush-hours`
    pub fn to_rush_hour(&self) -> ClientResult<RushHour> {
        self.validate()?;
        Ok(RushHour {
            id: None,
            week_day: self.week_day.unwrap_or_default(),
            from: self.from.trim().to_string(),
            to: self.to.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct VacationForm {
    pub name: String,
    pub from: String,
    pub to: String,
}

impl Validate for VacationForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if blank(&self.name) || blank(&self.from) || blank(&self.to) {
            errors.add("form", error("required", "All fields are required"));
            return Err(errors);
        }

        let from = NaiveDate::parse_from_str(self.from.trim(), DATE_FORMAT);
        let to = NaiveDate::parse_from_str(self.to.trim(), DATE_FORMAT);
        if from.is_err() {
            errors.add("from", error("date_format", "Start date must be YYYY-MM-DD"));
        }
        if to.is_err() {
            errors.add("to", error("date_format", "End date must be YYYY-MM-DD"));
        }
        if let (Ok(from), Ok(to)) = (from, to) {
            if from >= to {
                errors.add("to", error("date_order", "End date must be after start date"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl VacationForm {
    /// Validated payload for `POST /admin/vacations`
    pub fn to_vacation(&self) -> ClientResult<Vacation> {
        self.validate()?;
        Ok(Vacation {
            id: None,
            name: self.name.trim().to_string(),
            from: self.from.trim().to_string(),
            to: self.to.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct RatesForm {
    pub rate_normal: Option<Decimal>,
    pub rate_special: Option<Decimal>,
}

impl Validate for RatesForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let (Some(normal), Some(special)) = (self.rate_normal, self.rate_special) else {
            errors.add("form", error("required", "All fields are required"));
            return Err(errors);
        };
        if normal.is_sign_negative() {
            errors.add("rate_normal", error("rate_range", "Rates must not be negative"));
        }
        if special.is_sign_negative() {
            errors.add("rate_special", error("rate_range", "Rates must not be negative"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl RatesForm {
    /// Validated payload for `PUT /admin/categories/{id}`
    pub fn to_rates(&self) -> ClientResult<CategoryRates> {
        self.validate()?;
        Ok(CategoryRates {
            rate_normal: self.rate_normal.unwrap_or_default(),
            rate_special: self.rate_special.unwrap_or_default(),
        })
    }
}

fn validate_credentials(form: &EmployeeForm) -> Result<(), ValidationError> {
    if blank(&form.username) || blank(&form.password) {
        return Err(error("required", "Username and password are required"));
    }
    Ok(())
}

#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_credentials"))]
pub struct EmployeeForm {
    pub username: String,
    pub password: String,
    pub role: UserRole,
}

impl Default for EmployeeForm {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            role: UserRole::Employee,
        }
    }
}

impl EmployeeForm {
    /// Validated payload for `POST /admin/users`
    pub fn to_employee(&self) -> ClientResult<EmployeeCreate> {
        self.validate()?;
        Ok(EmployeeCreate {
            username: self.username.clone(),
            password: self.password.clone(),
            role: self.role,
        })
    }
}

impl HttpClient {
    // ========== Admin API ==========

    /// Per-zone occupancy report
    pub async fn parking_state(&self) -> ClientResult<Vec<AdminZone>> {
        self.require_token()?;
        self.get("admin/reports/parking-state").await
    }

    /// Open or close a zone; returns the updated zone
    pub async fn set_zone_open(&self, zone_id: &str, open: bool) -> ClientResult<AdminZone> {
        self.require_token()?;
        tracing::info!(zone_id, open, "Setting zone open state");
        self.put(&format!("admin/zones/{zone_id}/open"), &ZoneOpenRequest { open })
            .await
    }

    /// Categories with their current rates (no token needed)
    pub async fn list_categories(&self) -> ClientResult<Vec<Category>> {
        self.get("master/categories").await
    }

    pub async fn update_category_rates(
        &self,
        category_id: &str,
        form: &RatesForm,
    ) -> ClientResult<Category> {
        self.require_token()?;
        let rates = form.to_rates()?;
        tracing::info!(
            category_id,
            rate_normal = %rates.rate_normal,
            rate_special = %rates.rate_special,
            "Updating category rates"
        );
        self.put(&format!("admin/categories/{category_id}"), &rates)
            .await
    }

    pub async fn add_rush_hour(&self, form: &RushHourForm) -> ClientResult<RushHour> {
        self.require_token()?;
        let rush_hour = form.to_rush_hour()?;
        self.post("admin/rush-hours", &rush_hour).await
    }

    pub async fn add_vacation(&self, form: &VacationForm) -> ClientResult<Vacation> {
        self.require_token()?;
        let vacation = form.to_vacation()?;
        self.post("admin/vacations", &vacation).await
    }

    pub async fn list_employees(&self) -> ClientResult<Vec<Employee>> {
        self.require_token()?;
        self.get("admin/users").await
    }

    pub async fn create_employee(&self, form: &EmployeeForm) -> ClientResult<Employee> {
        self.require_token()?;
        let employee = form.to_employee()?;
        tracing::info!(username = %employee.username, role = %employee.role, "Creating employee");
        self.post("admin/users", &employee).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClientConfig, ClientError};

    fn invalid_message(err: ClientError) -> String {
        match err {
            ClientError::Invalid(message) => message,
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_rush_hour_requires_all_fields() {
        let form = RushHourForm {
            week_day: Some(1),
            from: "08:00".into(),
            to: "  ".into(),
        };
        assert_eq!(
            invalid_message(form.to_rush_hour().unwrap_err()),
            "All fields are required"
        );

        let form = RushHourForm {
            week_day: None,
            from: "08:00".into(),
            to: "10:00".into(),
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_rush_hour_time_order() {
        let form = RushHourForm {
            week_day: Some(0),
            from: "10:00".into(),
            to: "10:00".into(),
        };
        assert_eq!(
            invalid_message(form.to_rush_hour().unwrap_err()),
            "End time must be after start time"
        );

        let form = RushHourForm {
            week_day: Some(0),
            from: "07:30".into(),
            to: "09:15".into(),
        };
        let rush_hour = form.to_rush_hour().unwrap();
        assert_eq!(rush_hour.week_day, 0);
        assert_eq!(
            serde_json::to_value(&rush_hour).unwrap(),
            serde_json::json!({"weekDay": 0, "from": "07:30", "to": "09:15"})
        );
    }

    #[test]
    fn test_rush_hour_rejects_bad_day_and_format() {
        let form = RushHourForm {
            week_day: Some(7),
            from: "7am".into(),
            to: "09:00".into(),
        };
        let message = invalid_message(form.to_rush_hour().unwrap_err());
        assert!(message.contains("Start time must be HH:MM"));
        assert!(message.contains("Week day must be between 0 and 6"));
    }

    #[test]
    fn test_vacation_date_order() {
        let form = VacationForm {
            name: "Eid".into(),
            from: "2025-04-02".into(),
            to: "2025-04-01".into(),
        };
        assert_eq!(
            invalid_message(form.to_vacation().unwrap_err()),
            "End date must be after start date"
        );

        let form = VacationForm {
            name: "Eid".into(),
            from: "2025-04-01".into(),
            to: "2025-04-04".into(),
        };
        assert_eq!(form.to_vacation().unwrap().name, "Eid");

        let form = VacationForm {
            name: "".into(),
            ..form
        };
        assert_eq!(
            invalid_message(form.to_vacation().unwrap_err()),
            "All fields are required"
        );
    }

    #[test]
    fn test_rates_must_be_present_and_non_negative() {
        let form = RatesForm {
            rate_normal: Some(Decimal::new(5, 0)),
            rate_special: None,
        };
        assert_eq!(
            invalid_message(form.to_rates().unwrap_err()),
            "All fields are required"
        );

        let form = RatesForm {
            rate_normal: Some(Decimal::new(-1, 0)),
            rate_special: Some(Decimal::new(8, 0)),
        };
        assert!(form.validate().is_err());

        let form = RatesForm {
            rate_normal: Some(Decimal::ZERO),
            rate_special: Some(Decimal::new(75, 1)),
        };
        assert_eq!(form.to_rates().unwrap().rate_special, Decimal::new(75, 1));
    }

    #[test]
    fn test_employee_credentials_required() {
        let form = EmployeeForm {
            username: "guard".into(),
            password: "   ".into(),
            ..Default::default()
        };
        assert_eq!(
            invalid_message(form.to_employee().unwrap_err()),
            "Username and password are required"
        );

        let form = EmployeeForm {
            password: "secret".into(),
            ..form
        };
        let employee = form.to_employee().unwrap();
        assert_eq!(employee.role, UserRole::Employee);
    }

    /// Answer one HTTP request with `body`; yields the raw request text
    async fn respond_once(body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/api/v1", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length || n == 0 {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });
        (base_url, handle)
    }

    #[tokio::test]
    async fn test_set_zone_open_returns_updated_zone() {
        let (base_url, server) = respond_once(
            r#"{"id":"zone_a","name":"Zone A","occupied":3,"free":7,"reserved":0,
                "availableForVisitors":7,"availableForSubscribers":0,"open":false}"#,
        )
        .await;
        let client = HttpClient::new(&ClientConfig::new(base_url))
            .unwrap()
            .with_token("jwt-admin");

        let zone = client.set_zone_open("zone_a", false).await.unwrap();
        assert_eq!(zone.id, "zone_a");
        assert!(!zone.open);

        let request = server.await.unwrap();
        assert!(request.starts_with("PUT /api/v1/admin/zones/zone_a/open "));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer jwt-admin"));
        assert!(request.ends_with(r#"{"open":false}"#));
    }

    #[tokio::test]
    async fn test_update_rates_returns_updated_category() {
        let (base_url, server) = respond_once(
            r#"{"id":"cat_premium","name":"Premium","rateNormal":6,"rateSpecial":9.5}"#,
        )
        .await;
        let client = HttpClient::new(&ClientConfig::new(base_url))
            .unwrap()
            .with_token("jwt-admin");
        let form = RatesForm {
            rate_normal: Some(Decimal::new(6, 0)),
            rate_special: Some(Decimal::new(95, 1)),
        };

        let category = client
            .update_category_rates("cat_premium", &form)
            .await
            .unwrap();
        assert_eq!(category.name, "Premium");
        assert_eq!(category.rate_special, Decimal::new(95, 1));

        let request = server.await.unwrap();
        assert!(request.starts_with("PUT /api/v1/admin/categories/cat_premium "));
    }

    #[tokio::test]
    async fn test_admin_calls_need_a_token() {
        // Unroutable address: the call must fail before any request is made
        let client = HttpClient::new(&ClientConfig::new("http://127.0.0.1:9/api/v1")).unwrap();

        assert!(matches!(
            client.parking_state().await,
            Err(ClientError::Unauthorized)
        ));
        assert!(matches!(
            client.set_zone_open("zone_a", false).await,
            Err(ClientError::Unauthorized)
        ));
        assert!(matches!(
            client.add_vacation(&VacationForm::default()).await,
            Err(ClientError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_invalid_form_is_not_sent() {
        let client = HttpClient::new(&ClientConfig::new("http://127.0.0.1:9/api/v1"))
            .unwrap()
            .with_token("token");

        let err = client
            .add_rush_hour(&RushHourForm::default())
            .await
            .unwrap_err();
        assert_eq!(invalid_message(err), "All fields are required");
    }
}
