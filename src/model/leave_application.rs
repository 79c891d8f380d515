use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::leave::{duration::LeaveDuration, status::LeaveStatus};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "employee_id": 7,
    "leave_type_id": 2,
    "start_date": "2025-08-04",
    "end_date": "2025-08-08",
    "leave_days_count": 5,
    "leave_months_count": "0.00",
    "reason": "Flu",
    "status": "Submitted",
    "rejection_reason": null,
    "protocol_number": null,
    "created_at": "2025-08-01T09:00:00Z",
    "updated_at": "2025-08-01T09:00:00Z"
}))]
pub struct LeaveApplication {
    pub id: u64,
    pub employee_id: u64,
    pub leave_type_id: u64,
    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,
    /// Derived, read-only
    pub leave_days_count: u32,
    /// Derived, read-only
    #[schema(value_type = String)]
    pub leave_months_count: Decimal,
    pub reason: String,
    pub status: LeaveStatus,
    pub rejection_reason: Option<String>,
    pub protocol_number: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

impl LeaveApplication {
    pub fn duration(&self) -> LeaveDuration {
        LeaveDuration {
            leave_days_count: self.leave_days_count,
            leave_months_count: self.leave_months_count,
        }
    }

    pub fn apply_duration(&mut self, duration: LeaveDuration) {
        self.leave_days_count = duration.leave_days_count;
        self.leave_months_count = duration.leave_months_count;
    }
}

/// A validated application that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewLeaveApplication {
    pub employee_id: u64,
    pub leave_type_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration: LeaveDuration,
    pub reason: String,
    pub status: LeaveStatus,
}

/// Row shape of `leave_applications`; status is stored as text.
#[derive(Debug, sqlx::FromRow)]
pub struct LeaveApplicationRow {
    pub id: u64,
    pub employee_id: u64,
    pub leave_type_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_days_count: u32,
    pub leave_months_count: Decimal,
    pub reason: String,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub protocol_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<LeaveApplicationRow> for LeaveApplication {
    type Error = sqlx::Error;

    fn try_from(row: LeaveApplicationRow) -> Result<Self, Self::Error> {
        let status =
            LeaveStatus::from_str(&row.status).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(LeaveApplication {
            id: row.id,
            employee_id: row.employee_id,
            leave_type_id: row.leave_type_id,
            start_date: row.start_date,
            end_date: row.end_date,
            leave_days_count: row.leave_days_count,
            leave_months_count: row.leave_months_count,
            reason: row.reason,
            status,
            rejection_reason: row.rejection_reason,
            protocol_number: row.protocol_number,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
