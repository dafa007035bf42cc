use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct LeaveType {
    pub id: Uuid,
    pub name: String,
    pub is_paid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveTypeInput {
    pub name: String,
    #[serde(default)]
    pub is_paid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct LeaveAllocation {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub leave_type_id: Uuid,
    pub allocated_days: f64,
    pub used_days: f64,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl LeaveAllocation {
    pub fn remaining_days(&self) -> f64 {
        self.allocated_days - self.used_days
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveAllocationInput {
    pub employee_id: Uuid,
    pub leave_type_id: Uuid,
    pub allocated_days: f64,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewLeaveAllocation {
    pub input: LeaveAllocationInput,
    pub created_by: Option<Uuid>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum LeaveRequestStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct LeaveRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub leave_type_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub notes: Option<String>,
    pub status: LeaveRequestStatus,
    pub reviewed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// Inclusive calendar-day span, weekends included.
    pub fn day_span(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date
            .iter_days()
            .take_while(move |date| *date <= self.end_date)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequestInput {
    /// Only honoured for admin/hr callers filing on someone's behalf.
    pub employee_id: Option<Uuid>,
    pub leave_type_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub employee_id: Uuid,
    pub leave_type_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaveRequestFilter {
    pub employee_id: Option<Uuid>,
    pub status: Option<LeaveRequestStatus>,
}

/// Outcome of approving a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveApproval {
    pub request: LeaveRequest,
    pub days_charged: i64,
    pub attendance_days_written: i64,
    pub allocation: Option<LeaveAllocation>,
}
