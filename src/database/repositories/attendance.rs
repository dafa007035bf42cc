use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use super::PgSession;
use crate::database::{
    models::{
        AttendanceCounts, AttendancePatch, AttendanceRecord, AttendanceStatus,
        NewAttendanceRecord,
    },
    store::{AttendanceStore, StoreResult},
    utils::sql,
};

const ATTENDANCE_COLUMNS: &str = r#"
    id,
    employee_id,
    date,
    check_in,
    check_out,
    status,
    work_hours,
    break_hours,
    extra_hours,
    created_at,
    updated_at
"#;

#[async_trait]
impl AttendanceStore for PgSession {
    async fn find_attendance(
        &mut self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let record = sqlx::query_as::<_, AttendanceRecord>(&sql(&format!(
            r#"
            SELECT
                {ATTENDANCE_COLUMNS}
            FROM
                attendance
            WHERE
                employee_id = ?
                AND date = ?
            FOR UPDATE
            "#
        )))
        .bind(employee_id)
        .bind(date)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(record)
    }

    async fn insert_attendance(
        &mut self,
        record: NewAttendanceRecord,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let inserted = sqlx::query_as::<_, AttendanceRecord>(&sql(&format!(
            r#"
            INSERT INTO
                attendance (employee_id, date, check_in, status)
            VALUES
                (?, ?, ?, ?)
            ON CONFLICT (employee_id, date) DO NOTHING
            RETURNING
                {ATTENDANCE_COLUMNS}
            "#
        )))
        .bind(record.employee_id)
        .bind(record.date)
        .bind(record.check_in)
        .bind(record.status)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(inserted)
    }

    async fn update_attendance(
        &mut self,
        id: Uuid,
        patch: AttendancePatch,
    ) -> StoreResult<AttendanceRecord> {
        let record = sqlx::query_as::<_, AttendanceRecord>(&sql(&format!(
            r#"
            UPDATE
                attendance
            SET
                check_in = CASE WHEN ? THEN ? ELSE check_in END,
                check_out = CASE WHEN ? THEN ? ELSE check_out END,
                status = COALESCE(?, status),
                work_hours = COALESCE(?, work_hours),
                break_hours = COALESCE(?, break_hours),
                extra_hours = COALESCE(?, extra_hours),
                updated_at = NOW()
            WHERE
                id = ?
            RETURNING
                {ATTENDANCE_COLUMNS}
            "#
        )))
        .bind(patch.check_in.is_some())
        .bind(patch.check_in.flatten())
        .bind(patch.check_out.is_some())
        .bind(patch.check_out.flatten())
        .bind(patch.status)
        .bind(patch.work_hours)
        .bind(patch.break_hours)
        .bind(patch.extra_hours)
        .bind(id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(record)
    }

    async fn list_attendance(
        &mut self,
        employee_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(&sql(&format!(
            r#"
            SELECT
                {ATTENDANCE_COLUMNS}
            FROM
                attendance
            WHERE
                employee_id = ?
                AND date BETWEEN ? AND ?
            ORDER BY
                date
            "#
        )))
        .bind(employee_id)
        .bind(from)
        .bind(to)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(records)
    }

    async fn count_attendance_by_status(
        &mut self,
        employee_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<AttendanceCounts> {
        let rows = sqlx::query_as::<_, (AttendanceStatus, i64)>(&sql(r#"
            SELECT
                status,
                COUNT(*)
            FROM
                attendance
            WHERE
                employee_id = ?
                AND date BETWEEN ? AND ?
            GROUP BY
                status
        "#))
        .bind(employee_id)
        .bind(from)
        .bind(to)
        .fetch_all(&mut *self.tx)
        .await?;

        let mut counts = AttendanceCounts::default();
        for (status, count) in rows {
            match status {
                AttendanceStatus::Present => counts.present = count,
                AttendanceStatus::Leave => counts.leave = count,
                AttendanceStatus::Absent => counts.absent = count,
            }
        }

        Ok(counts)
    }

    async fn list_attendance_on(
        &mut self,
        company_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(&sql(r#"
            SELECT
                a.id,
                a.employee_id,
                a.date,
                a.check_in,
                a.check_out,
                a.status,
                a.work_hours,
                a.break_hours,
                a.extra_hours,
                a.created_at,
                a.updated_at
            FROM
                attendance a
                INNER JOIN employees e ON e.id = a.employee_id
            WHERE
                e.company_id = ?
                AND a.date = ?
        "#))
        .bind(company_id)
        .bind(date)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(records)
    }

    async fn find_unaccounted_employees(
        &mut self,
        company_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(&sql(r#"
            SELECT
                e.id
            FROM
                employees e
            WHERE
                e.company_id = ?
                AND NOT EXISTS (
                    SELECT 1
                    FROM attendance a
                    WHERE a.employee_id = e.id
                      AND a.date = ?
                )
                AND NOT EXISTS (
                    SELECT 1
                    FROM leave_requests lr
                    WHERE lr.employee_id = e.id
                      AND lr.status = 'approved'
                      AND ? BETWEEN lr.start_date AND lr.end_date
                )
            ORDER BY
                e.id
        "#))
        .bind(company_id)
        .bind(date)
        .bind(date)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(ids)
    }
}
