use chrono::{DateTime, NaiveDate};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

use crate::error::ClientError;

/// Self-registration input as typed by the user
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub dob: String,
}

impl RegistrationForm {
    /// Check the fields the server is known to be strict about, then build the
    /// trimmed payload. The server may still reject it.
    pub fn to_payload(&self) -> Result<Value, ClientError> {
        let phone = self.phone.trim();
        let mut field_errors = HashMap::new();

        if !is_valid_phone(phone) {
            field_errors.insert("phone".to_string(), "Phone must be exactly 10 digits.".to_string());
        }
        if !is_valid_password(&self.password) {
            field_errors.insert(
                "password".to_string(),
                "Password must include at least one letter and one number.".to_string(),
            );
        }
        if !field_errors.is_empty() {
            return Err(ClientError::invalid_input(
                "Please fix the highlighted fields and try again.",
                field_errors,
            ));
        }

        let mut payload = Map::new();
        payload.insert("username".into(), json!(self.username.trim()));
        payload.insert("password".into(), json!(self.password));
        payload.insert("email".into(), json!(self.email.trim()));
        payload.insert("firstName".into(), json!(self.first_name.trim()));
        payload.insert("lastName".into(), json!(self.last_name.trim()));
        payload.insert("phone".into(), json!(phone));
        payload.insert("address".into(), json!(self.address.trim()));

        let dob = normalize_date(&self.dob);
        if !dob.is_empty() {
            payload.insert("dob".into(), json!(dob));
        }

        Ok(Value::Object(payload))
    }
}

pub fn is_valid_phone(value: &str) -> bool {
    value.len() == 10 && value.bytes().all(|b| b.is_ascii_digit())
}

/// At least one letter and one digit; anything else is allowed
pub fn is_valid_password(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_alphabetic()) && value.chars().any(|c| c.is_ascii_digit())
}

/// Normalize a date to `yyyy-MM-dd`.
///
/// Accepts ISO dates, `d/m/yyyy` and `d-m-yyyy`, and RFC 3339 timestamps.
/// Anything else is passed through untouched for the server to judge.
pub fn normalize_date(input: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        return String::new();
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }

    let parts: Vec<&str> = input.split(['/', '-']).collect();
    if let [dd, mm, yyyy] = parts.as_slice() {
        if yyyy.len() == 4 && dd.len() <= 2 && mm.len() <= 2 {
            let parsed = (yyyy.parse(), mm.parse(), dd.parse());
            if let (Ok(y), Ok(m), Ok(d)) = parsed {
                if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                    return date.format("%Y-%m-%d").to_string();
                }
            }
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return ts.date_naive().format("%Y-%m-%d").to_string();
    }

    input.to_string()
}
