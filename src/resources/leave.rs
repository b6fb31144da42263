// Leave requests: admin review, self-service application, client-side summaries
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

use super::into_list;
use crate::error::ClientError;
use crate::transport::{ApiRequest, Transport};

pub const LEAVE_PATH: &str = "/leave";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "PENDING",
            LeaveStatus::Approved => "APPROVED",
            LeaveStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeaveStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(LeaveStatus::Pending),
            "APPROVED" | "APPROVE" | "GRANTED" => Ok(LeaveStatus::Approved),
            "REJECTED" | "REJECT" => Ok(LeaveStatus::Rejected),
            other => Err(format!("unknown leave status '{}'", other)),
        }
    }
}

/// A leave request filed by the current employee
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveApplication {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: String,
    pub reason: Option<String>,
}

impl LeaveApplication {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            leave_type: "PAID".to_string(),
            reason: None,
        }
    }

    /// The backend takes the application as query parameters, not a body
    pub fn to_request(&self) -> Result<ApiRequest, ClientError> {
        if self.end_date < self.start_date {
            return Err(ClientError::invalid_field(
                "endDate",
                "end date must not be before start date",
            ));
        }

        let mut request = ApiRequest::post(LEAVE_PATH)
            .query("startDate", self.start_date.format("%Y-%m-%d"))
            .query("endDate", self.end_date.format("%Y-%m-%d"))
            .query("type", self.leave_type.trim().to_ascii_uppercase());

        if let Some(reason) = self.reason.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            request = request.query("reason", reason);
        }
        Ok(request)
    }
}

/// Counts shown next to a leave list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LeaveSummary {
    pub total: usize,
    pub approved: usize,
    pub pending: usize,
    pub rejected: usize,
    /// Approved leaves starting in the requested year
    pub approved_in_year: usize,
}

impl LeaveSummary {
    pub fn from_leaves(leaves: &[Value], year: i32) -> Self {
        let mut summary = LeaveSummary {
            total: leaves.len(),
            ..Default::default()
        };

        for leave in leaves {
            let status = leave
                .get("status")
                .or_else(|| leave.get("state"))
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<LeaveStatus>().ok());

            match status {
                Some(LeaveStatus::Approved) => {
                    summary.approved += 1;
                    // Undated leaves count toward the requested year
                    if start_year(leave).unwrap_or(year) == year {
                        summary.approved_in_year += 1;
                    }
                }
                Some(LeaveStatus::Pending) => summary.pending += 1,
                Some(LeaveStatus::Rejected) => summary.rejected += 1,
                None => {}
            }
        }

        summary
    }
}

fn start_year(leave: &Value) -> Option<i32> {
    let raw = ["fromDate", "startDate", "from", "dateFrom"]
        .iter()
        .find_map(|key| leave.get(*key).and_then(Value::as_str))?;
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok().map(|d| d.year())
}

pub async fn list_by_status(transport: &Transport, status: LeaveStatus) -> Result<Vec<Value>, ClientError> {
    transport
        .send(ApiRequest::get(LEAVE_PATH).query("status", status))
        .await
        .map(into_list)
}

pub async fn get(transport: &Transport, leave_id: i64) -> Result<Value, ClientError> {
    transport.get(&format!("{}/{}", LEAVE_PATH, leave_id)).await
}

/// Approve or reject. Last write wins: no version is sent.
pub async fn set_status(transport: &Transport, leave_id: i64, status: LeaveStatus) -> Result<Value, ClientError> {
    transport
        .patch(&format!("{}/{}", LEAVE_PATH, leave_id), json!({ "status": status }))
        .await
}

pub async fn apply(transport: &Transport, application: &LeaveApplication) -> Result<Value, ClientError> {
    transport.send(application.to_request()?).await
}
