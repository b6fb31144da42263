// Employee records (admin) and the caller's own profile
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{into_list, LinkedCreate, LinkedReference};
use crate::error::ClientError;
use crate::transport::Transport;
use crate::types::UserId;

pub const EMPLOYEES_PATH: &str = "/employees";
pub const PROFILE_PATH: &str = "/profile";

/// New employee profile attached to an existing user account
#[derive(Debug, Clone, Default)]
pub struct NewEmployee {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub dob: Option<NaiveDate>,
    pub phone: String,
    pub address: String,
    pub designation: String,
    pub department: String,
    pub base_salary: Option<Decimal>,
}

impl NewEmployee {
    pub fn to_linked_create(&self) -> Result<LinkedCreate, ClientError> {
        if self.user_id <= 0 {
            return Err(ClientError::invalid_field("userId", "userId must be a positive id"));
        }

        let mut fields = Map::new();
        fields.insert("firstName".into(), json!(self.first_name.trim()));
        fields.insert("lastName".into(), json!(self.last_name.trim()));
        fields.insert(
            "dob".into(),
            json!(self.dob.map(|d| d.format("%Y-%m-%d").to_string())),
        );
        fields.insert("phone".into(), json!(self.phone.trim()));
        fields.insert("address".into(), json!(self.address.trim()));
        fields.insert("designation".into(), json!(self.designation.trim()));
        fields.insert("department".into(), json!(self.department.trim()));
        // Sent as a JSON number, not the string form Decimal serializes to
        fields.insert(
            "baseSalary".into(),
            json!(self.base_salary.and_then(|s| s.to_f64())),
        );

        Ok(LinkedCreate::new(
            EMPLOYEES_PATH,
            LinkedReference::user(self.user_id),
            fields,
        ))
    }
}

/// Fields an employee may change on their own profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.phone.is_none()
            && self.address.is_none()
            && self.designation.is_none()
            && self.department.is_none()
    }
}

pub async fn list(transport: &Transport) -> Result<Vec<Value>, ClientError> {
    transport.get(EMPLOYEES_PATH).await.map(into_list)
}

pub async fn get(transport: &Transport, employee_id: i64) -> Result<Value, ClientError> {
    transport.get(&format!("{}/{}", EMPLOYEES_PATH, employee_id)).await
}

pub async fn update(transport: &Transport, employee_id: i64, payload: Value) -> Result<Value, ClientError> {
    transport
        .put(&format!("{}/{}", EMPLOYEES_PATH, employee_id), payload)
        .await
}

pub async fn delete(transport: &Transport, employee_id: i64) -> Result<(), ClientError> {
    // Many backends answer 204 with no body; nothing to return
    transport
        .delete(&format!("{}/{}", EMPLOYEES_PATH, employee_id))
        .await
        .map(|_| ())
}

pub async fn update_profile(transport: &Transport, update: &ProfileUpdate) -> Result<Value, ClientError> {
    if update.is_empty() {
        return Err(ClientError::invalid_field("profile", "nothing to update"));
    }
    transport.put(PROFILE_PATH, serde_json::to_value(update)?).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn linked_create_trims_and_encodes_numbers() {
        let employee = NewEmployee {
            user_id: 7,
            first_name: " Ann ".into(),
            dob: NaiveDate::from_ymd_opt(1990, 4, 2),
            base_salary: Some(Decimal::from_str("50000.50").unwrap()),
            ..Default::default()
        };
        let create = employee.to_linked_create().unwrap();
        let nested = create.nested_payload();

        assert_eq!(nested["user"], json!({ "id": 7 }));
        assert_eq!(nested["firstName"], "Ann");
        assert_eq!(nested["dob"], "1990-04-02");
        assert_eq!(nested["baseSalary"], json!(50000.5));
        assert_eq!(create.flat_payload()["userId"], 7);
    }

    #[test]
    fn missing_user_id_is_rejected_locally() {
        assert!(matches!(
            NewEmployee::default().to_linked_create(),
            Err(ClientError::InvalidInput { .. })
        ));
    }

    #[test]
    fn profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            phone: Some("0123456789".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "phone": "0123456789" }));
        assert!(ProfileUpdate::default().is_empty());
    }
}
