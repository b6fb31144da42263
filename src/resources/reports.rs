// Monthly payroll reports (admin)
use serde_json::Value;

use super::into_list;
use super::payroll::validate_period;
use crate::error::ClientError;
use crate::transport::{ApiRequest, Transport};

fn period_request(path: &str, year: i32, month: u32) -> Result<ApiRequest, ClientError> {
    validate_period(year, month)?;
    Ok(ApiRequest::get(path).query("year", year).query("month", month))
}

pub async fn payroll_summary(transport: &Transport, year: i32, month: u32) -> Result<Value, ClientError> {
    transport
        .send(period_request("/reports/payroll-summary", year, month)?)
        .await
}

pub async fn department_cost(transport: &Transport, year: i32, month: u32) -> Result<Vec<Value>, ClientError> {
    transport
        .send(period_request("/reports/department-cost", year, month)?)
        .await
        .map(into_list)
}
