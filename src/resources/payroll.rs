// Payroll runs (admin) and the caller's own payslip
use serde_json::{json, Value};

use super::into_list;
use crate::error::ClientError;
use crate::transport::{ApiRequest, Transport};

pub const RUNS_PATH: &str = "/payroll/runs";

/// Reject periods the backend would refuse anyway
pub fn validate_period(year: i32, month: u32) -> Result<(), ClientError> {
    if !(2000..=3000).contains(&year) {
        return Err(ClientError::invalid_field("year", "year must be between 2000 and 3000"));
    }
    if !(1..=12).contains(&month) {
        return Err(ClientError::invalid_field("month", "month must be between 1 and 12"));
    }
    Ok(())
}

pub async fn my_payslip(transport: &Transport, year: i32, month: u32) -> Result<Value, ClientError> {
    validate_period(year, month)?;
    transport.get(&format!("/payroll/my/{}/{}", year, month)).await
}

pub async fn list_runs(transport: &Transport) -> Result<Vec<Value>, ClientError> {
    transport.get(RUNS_PATH).await.map(into_list)
}

pub async fn create_run(transport: &Transport, year: i32, month: u32) -> Result<Value, ClientError> {
    validate_period(year, month)?;
    transport
        .post(RUNS_PATH, json!({ "year": year, "month": month }))
        .await
}

pub async fn process_run(transport: &Transport, run_id: i64) -> Result<Value, ClientError> {
    transport
        .send(ApiRequest::post(format!("{}/{}/process", RUNS_PATH, run_id)))
        .await
}

pub async fn lock_run(transport: &Transport, run_id: i64) -> Result<Value, ClientError> {
    transport
        .send(ApiRequest::post(format!("{}/{}/lock", RUNS_PATH, run_id)))
        .await
}

pub async fn run_items(transport: &Transport, run_id: i64) -> Result<Vec<Value>, ClientError> {
    transport
        .get(&format!("{}/{}/items", RUNS_PATH, run_id))
        .await
        .map(into_list)
}

/// Only DRAFT runs can be deleted; the server answers 409 otherwise
pub async fn delete_run(transport: &Transport, run_id: i64) -> Result<(), ClientError> {
    transport
        .delete(&format!("{}/{}", RUNS_PATH, run_id))
        .await
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_bounds() {
        assert!(validate_period(2024, 1).is_ok());
        assert!(validate_period(2024, 12).is_ok());
        assert!(validate_period(2024, 0).is_err());
        assert!(validate_period(2024, 13).is_err());
        assert!(validate_period(1999, 6).is_err());
    }
}
