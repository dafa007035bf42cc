use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum AttendanceStatus {
        Present => "present",
        Leave => "leave",
        Absent => "absent",
    }
}

/// One row per (employee_id, date).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub date: NaiveDate,                   // DATE
    pub check_in: Option<DateTime<Utc>>,   // TIMESTAMPTZ
    pub check_out: Option<DateTime<Utc>>,  // TIMESTAMPTZ
    pub status: AttendanceStatus,
    pub work_hours: f64,
    pub break_hours: f64,
    pub extra_hours: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAttendanceRecord {
    pub employee_id: Uuid,
    pub date: NaiveDate,
    pub check_in: Option<DateTime<Utc>>,
    pub status: AttendanceStatus,
}

impl NewAttendanceRecord {
    pub fn present(employee_id: Uuid, date: NaiveDate, check_in: DateTime<Utc>) -> Self {
        Self {
            employee_id,
            date,
            check_in: Some(check_in),
            status: AttendanceStatus::Present,
        }
    }

    /// Synthetic row with all hour fields at zero.
    pub fn synthetic(employee_id: Uuid, date: NaiveDate, status: AttendanceStatus) -> Self {
        Self {
            employee_id,
            date,
            check_in: None,
            status,
        }
    }
}

/// Partial update of an attendance row. `None` leaves the column untouched;
/// for the timestamp columns `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendancePatch {
    pub check_in: Option<Option<DateTime<Utc>>>,
    pub check_out: Option<Option<DateTime<Utc>>>,
    pub status: Option<AttendanceStatus>,
    pub work_hours: Option<f64>,
    pub break_hours: Option<f64>,
    pub extra_hours: Option<f64>,
}

impl AttendancePatch {
    pub fn check_in(at: DateTime<Utc>) -> Self {
        Self {
            check_in: Some(Some(at)),
            status: Some(AttendanceStatus::Present),
            ..Default::default()
        }
    }

    pub fn check_out(at: DateTime<Utc>, break_hours: f64, work_hours: f64, extra_hours: f64) -> Self {
        Self {
            check_out: Some(Some(at)),
            break_hours: Some(break_hours),
            work_hours: Some(work_hours),
            extra_hours: Some(extra_hours),
            ..Default::default()
        }
    }

    /// Turns a row without a clock-in into a leave day.
    pub fn leave_day() -> Self {
        Self {
            check_in: Some(None),
            check_out: Some(None),
            status: Some(AttendanceStatus::Leave),
            work_hours: Some(0.0),
            break_hours: Some(0.0),
            extra_hours: Some(0.0),
        }
    }

    pub fn apply(&self, record: &mut AttendanceRecord) {
        if let Some(check_in) = self.check_in {
            record.check_in = check_in;
        }
        if let Some(check_out) = self.check_out {
            record.check_out = check_out;
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(work_hours) = self.work_hours {
            record.work_hours = work_hours;
        }
        if let Some(break_hours) = self.break_hours {
            record.break_hours = break_hours;
        }
        if let Some(extra_hours) = self.extra_hours {
            record.extra_hours = extra_hours;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceCounts {
    pub present: i64,
    pub leave: i64,
    pub absent: i64,
}

impl AttendanceCounts {
    pub fn tally(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Leave => self.leave += 1,
            AttendanceStatus::Absent => self.absent += 1,
        }
    }
}

/// A day in an attendance range: either a stored row or a synthetic absence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceDay {
    pub date: NaiveDate,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub status: AttendanceStatus,
    pub work_hours: f64,
    pub break_hours: f64,
    pub extra_hours: f64,
    pub recorded: bool,
}

impl AttendanceDay {
    pub fn absent(date: NaiveDate) -> Self {
        Self {
            date,
            check_in: None,
            check_out: None,
            status: AttendanceStatus::Absent,
            work_hours: 0.0,
            break_hours: 0.0,
            extra_hours: 0.0,
            recorded: false,
        }
    }

    pub fn is_weekday(&self) -> bool {
        !matches!(self.date.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

impl From<AttendanceRecord> for AttendanceDay {
    fn from(record: AttendanceRecord) -> Self {
        Self {
            date: record.date,
            check_in: record.check_in,
            check_out: record.check_out,
            status: record.status,
            work_hours: record.work_hours,
            break_hours: record.break_hours,
            extra_hours: record.extra_hours,
            recorded: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceSummary {
    pub present_days: i64,
    pub leave_days: i64,
    pub absent_days: i64,
    pub total_working_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub summary: AttendanceSummary,
    pub days: Vec<AttendanceDay>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub employee_id: Uuid,
    pub employee_name: String,
    pub attendance: Option<AttendanceRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbsenceMarking {
    pub date: NaiveDate,
    pub marked_absent: i64,
}
