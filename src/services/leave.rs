//! Leave types, allocations and the request workflow.
//!
//! Approval is the only operation with side effects outside the request
//! row: it charges the matching allocation and rewrites the attendance
//! ledger across the leave span. A row that already carries a clock-in is
//! never overwritten.

use chrono::NaiveDate;
use uuid::Uuid;

use super::require_company_employee;
use crate::database::models::{
    AttendancePatch, AttendanceStatus, LeaveAllocation, LeaveAllocationInput, LeaveApproval,
    LeaveRequest, LeaveRequestFilter, LeaveRequestInput, LeaveRequestStatus, LeaveType,
    LeaveTypeInput, NewAttendanceRecord, NewLeaveAllocation, NewLeaveRequest,
};
use crate::database::store::Session;
use crate::error::AppError;

/// Longest leave span a single request may cover, in calendar days.
pub const MAX_LEAVE_DAYS: i64 = 366;

pub async fn list_leave_types<S: Session>(session: &mut S) -> Result<Vec<LeaveType>, AppError> {
    session.list_leave_types().await
}

pub async fn create_leave_type<S: Session>(
    session: &mut S,
    input: LeaveTypeInput,
) -> Result<LeaveType, AppError> {
    if input.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    session.insert_leave_type(input).await
}

pub async fn create_allocation<S: Session>(
    session: &mut S,
    company_id: Uuid,
    created_by: Uuid,
    input: LeaveAllocationInput,
) -> Result<LeaveAllocation, AppError> {
    if !input.allocated_days.is_finite() || input.allocated_days < 0.0 {
        return Err(AppError::Validation(
            "allocated_days must be a non-negative number".to_string(),
        ));
    }
    if let (Some(from), Some(to)) = (input.valid_from, input.valid_to) {
        if from > to {
            return Err(AppError::Validation(
                "valid_from must not be after valid_to".to_string(),
            ));
        }
    }
    require_company_employee(session, company_id, input.employee_id).await?;
    if session.find_leave_type(input.leave_type_id).await?.is_none() {
        return Err(AppError::Validation("Unknown leave type".to_string()));
    }

    session
        .insert_leave_allocation(NewLeaveAllocation {
            input,
            created_by: Some(created_by),
        })
        .await
}

pub async fn list_allocations<S: Session>(
    session: &mut S,
    company_id: Uuid,
    employee_id: Option<Uuid>,
) -> Result<Vec<LeaveAllocation>, AppError> {
    session.list_leave_allocations(company_id, employee_id).await
}

pub async fn create_request<S: Session>(
    session: &mut S,
    company_id: Uuid,
    employee_id: Uuid,
    input: LeaveRequestInput,
) -> Result<LeaveRequest, AppError> {
    if input.start_date > input.end_date {
        return Err(AppError::Validation(
            "start_date must not be after end_date".to_string(),
        ));
    }
    if (input.end_date - input.start_date).num_days() >= MAX_LEAVE_DAYS {
        return Err(AppError::Validation(format!(
            "Leave must not exceed {} days",
            MAX_LEAVE_DAYS
        )));
    }
    require_company_employee(session, company_id, employee_id).await?;
    if session.find_leave_type(input.leave_type_id).await?.is_none() {
        return Err(AppError::Validation("Unknown leave type".to_string()));
    }

    let request = session
        .insert_leave_request(NewLeaveRequest {
            employee_id,
            leave_type_id: input.leave_type_id,
            start_date: input.start_date,
            end_date: input.end_date,
            notes: input.notes,
        })
        .await?;

    log::info!(
        "Leave request {} filed for employee {} ({} to {})",
        request.id,
        employee_id,
        request.start_date,
        request.end_date
    );
    Ok(request)
}

pub async fn list_requests<S: Session>(
    session: &mut S,
    company_id: Uuid,
    filter: LeaveRequestFilter,
) -> Result<Vec<LeaveRequest>, AppError> {
    session.list_leave_requests(company_id, filter).await
}

/// Loads a pending request of the acting company, locking it for the session.
async fn pending_request<S: Session>(
    session: &mut S,
    company_id: Uuid,
    request_id: Uuid,
) -> Result<LeaveRequest, AppError> {
    let request = session
        .find_leave_request(request_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Leave request not found".to_string()))?;

    let in_company = session
        .find_employee(request.employee_id)
        .await?
        .is_some_and(|employee| employee.belongs_to(company_id));
    if !in_company {
        return Err(AppError::Forbidden(
            "Leave request belongs to another company".to_string(),
        ));
    }

    if request.status != LeaveRequestStatus::Pending {
        return Err(AppError::Conflict(format!(
            "Leave request is already {}",
            request.status
        )));
    }
    Ok(request)
}

/// Marks one day as leave unless a clock-in is already recorded. Returns
/// whether the ledger changed.
async fn write_leave_day<S: Session>(
    session: &mut S,
    employee_id: Uuid,
    date: NaiveDate,
) -> Result<bool, AppError> {
    let existing = match session.find_attendance(employee_id, date).await? {
        Some(existing) => existing,
        None => {
            let inserted = session
                .insert_attendance(NewAttendanceRecord::synthetic(
                    employee_id,
                    date,
                    AttendanceStatus::Leave,
                ))
                .await?;
            if inserted.is_some() {
                return Ok(true);
            }

            // A concurrent writer created the row between the lookup and the insert.
            match session.find_attendance(employee_id, date).await? {
                Some(existing) => existing,
                None => return Ok(false),
            }
        }
    };

    if existing.check_in.is_some() {
        return Ok(false);
    }
    session
        .update_attendance(existing.id, AttendancePatch::leave_day())
        .await?;
    Ok(true)
}

pub async fn approve<S: Session>(
    session: &mut S,
    company_id: Uuid,
    request_id: Uuid,
    reviewer: Uuid,
) -> Result<LeaveApproval, AppError> {
    let request = pending_request(session, company_id, request_id).await?;

    let request = session
        .set_leave_request_status(request.id, LeaveRequestStatus::Approved, reviewer)
        .await?;

    let days_charged = request.day_span();
    let allocation = match session
        .first_leave_allocation(request.employee_id, request.leave_type_id)
        .await?
    {
        Some(allocation) => Some(
            session
                .add_used_days(allocation.id, days_charged as f64)
                .await?,
        ),
        None => {
            log::debug!(
                "No allocation for employee {} and leave type {}; balance not charged",
                request.employee_id,
                request.leave_type_id
            );
            None
        }
    };

    let mut attendance_days_written = 0;
    for date in request.dates() {
        if write_leave_day(session, request.employee_id, date).await? {
            attendance_days_written += 1;
        }
    }

    log::info!(
        "Leave request {} approved by {}: {} days charged, {} attendance days written",
        request.id,
        reviewer,
        days_charged,
        attendance_days_written
    );

    Ok(LeaveApproval {
        request,
        days_charged,
        attendance_days_written,
        allocation,
    })
}

pub async fn reject<S: Session>(
    session: &mut S,
    company_id: Uuid,
    request_id: Uuid,
    reviewer: Uuid,
) -> Result<LeaveRequest, AppError> {
    let request = pending_request(session, company_id, request_id).await?;
    let request = session
        .set_leave_request_status(request.id, LeaveRequestStatus::Rejected, reviewer)
        .await?;

    log::info!("Leave request {} rejected by {}", request.id, reviewer);
    Ok(request)
}
