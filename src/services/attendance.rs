use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::{calendar, require_company_employee};
use crate::database::models::{
    AbsenceMarking, AttendanceDay, AttendancePatch, AttendanceRange, AttendanceRecord,
    AttendanceStatus, AttendanceSummary, NewAttendanceRecord, RosterEntry,
};
use crate::database::store::Session;
use crate::error::AppError;

const MAX_RANGE_DAYS: i64 = 366;

pub fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}

/// Work and overtime hours for a finished shift.
pub fn shift_hours(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    break_hours: f64,
    expected_daily_hours: f64,
) -> (f64, f64) {
    let elapsed = (check_out - check_in).num_milliseconds() as f64 / 3_600_000.0;
    let work_hours = round_hours(elapsed - break_hours).max(0.0);
    let extra_hours = round_hours(work_hours - expected_daily_hours).max(0.0);
    (work_hours, extra_hours)
}

async fn apply_check_in<S: Session>(
    session: &mut S,
    existing: AttendanceRecord,
    now: DateTime<Utc>,
) -> Result<AttendanceRecord, AppError> {
    if existing.check_in.is_some() {
        return Ok(existing);
    }
    session
        .update_attendance(existing.id, AttendancePatch::check_in(now))
        .await
}

/// Records the first clock-in of the day. Repeated calls return the stored row.
pub async fn check_in<S: Session>(
    session: &mut S,
    employee_id: Uuid,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<AttendanceRecord, AppError> {
    if let Some(existing) = session.find_attendance(employee_id, date).await? {
        return apply_check_in(session, existing, now).await;
    }

    let inserted = session
        .insert_attendance(NewAttendanceRecord::present(employee_id, date, now))
        .await?;
    if let Some(record) = inserted {
        log::info!("Employee {} checked in for {}", employee_id, date);
        return Ok(record);
    }

    // A concurrent writer created the row between the lookup and the insert.
    let existing = session
        .find_attendance(employee_id, date)
        .await?
        .ok_or_else(|| AppError::NotFound("Attendance record not found".to_string()))?;
    apply_check_in(session, existing, now).await
}

pub async fn check_out<S: Session>(
    session: &mut S,
    employee_id: Uuid,
    date: NaiveDate,
    now: DateTime<Utc>,
    expected_daily_hours: f64,
) -> Result<AttendanceRecord, AppError> {
    let no_check_in = || AppError::Validation(format!("No check-in recorded for {}", date));

    let record = session
        .find_attendance(employee_id, date)
        .await?
        .ok_or_else(no_check_in)?;
    let check_in = record.check_in.ok_or_else(no_check_in)?;

    if record.check_out.is_some() {
        return Ok(record);
    }

    let break_hours = session
        .find_salary_structure(employee_id)
        .await?
        .map(|structure| structure.break_hours)
        .unwrap_or(0.0);
    let (work_hours, extra_hours) = shift_hours(check_in, now, break_hours, expected_daily_hours);

    session
        .update_attendance(
            record.id,
            AttendancePatch::check_out(now, break_hours, work_hours, extra_hours),
        )
        .await
}

/// Inserts an absent row for every employee with nothing recorded on `date`.
/// Safe to re-run: rows that already exist are skipped.
pub async fn mark_absent<S: Session>(
    session: &mut S,
    company_id: Uuid,
    date: NaiveDate,
) -> Result<AbsenceMarking, AppError> {
    let employee_ids = session.find_unaccounted_employees(company_id, date).await?;

    let mut marked_absent = 0;
    for employee_id in employee_ids {
        let inserted = session
            .insert_attendance(NewAttendanceRecord::synthetic(
                employee_id,
                date,
                AttendanceStatus::Absent,
            ))
            .await?;
        if inserted.is_some() {
            marked_absent += 1;
        }
    }

    log::info!(
        "Marked {} employees absent for {} in company {}",
        marked_absent,
        date,
        company_id
    );

    Ok(AbsenceMarking {
        date,
        marked_absent,
    })
}

pub async fn attendance_range<S: Session>(
    session: &mut S,
    company_id: Uuid,
    employee_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<AttendanceRange, AppError> {
    if from > to {
        return Err(AppError::Validation(
            "from must not be after to".to_string(),
        ));
    }
    if (to - from).num_days() >= MAX_RANGE_DAYS {
        return Err(AppError::Validation(format!(
            "Range must not exceed {} days",
            MAX_RANGE_DAYS
        )));
    }
    require_company_employee(session, company_id, employee_id).await?;

    let records = session.list_attendance(employee_id, from, to).await?;

    let days: Vec<AttendanceDay> = if from == to {
        let day = records
            .into_iter()
            .next()
            .map(AttendanceDay::from)
            .unwrap_or_else(|| AttendanceDay::absent(from));
        vec![day]
    } else {
        let mut records = records.into_iter().peekable();
        let mut days = Vec::new();
        for date in from.iter_days().take_while(|date| *date <= to) {
            let stored = records.next_if(|record| record.date == date);
            if calendar::is_weekend(date) {
                continue;
            }
            days.push(stored.map_or_else(|| AttendanceDay::absent(date), AttendanceDay::from));
        }
        days
    };

    let mut summary = AttendanceSummary {
        present_days: 0,
        leave_days: 0,
        absent_days: 0,
        total_working_days: 0,
    };
    for day in days.iter().filter(|day| day.is_weekday()) {
        summary.total_working_days += 1;
        match day.status {
            AttendanceStatus::Present => summary.present_days += 1,
            AttendanceStatus::Leave => summary.leave_days += 1,
            AttendanceStatus::Absent => summary.absent_days += 1,
        }
    }

    Ok(AttendanceRange {
        from,
        to,
        summary,
        days,
    })
}

pub async fn roster<S: Session>(
    session: &mut S,
    company_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<RosterEntry>, AppError> {
    let employees = session.list_company_employees(company_id).await?;
    let mut records = session.list_attendance_on(company_id, date).await?;

    Ok(employees
        .into_iter()
        .map(|employee| {
            let attendance = records
                .iter()
                .position(|record| record.employee_id == employee.id)
                .map(|index| records.swap_remove(index));
            RosterEntry {
                employee_id: employee.id,
                employee_name: employee.full_name(),
                attendance,
            }
        })
        .collect())
}
