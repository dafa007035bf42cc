use async_trait::async_trait;
use uuid::Uuid;

use super::PgSession;
use crate::database::{
    models::{
        LeaveAllocation, LeaveRequest, LeaveRequestFilter, LeaveRequestStatus, LeaveType,
        LeaveTypeInput, NewLeaveAllocation, NewLeaveRequest,
    },
    store::{LeaveStore, StoreResult},
    utils::sql,
};

const ALLOCATION_COLUMNS: &str = r#"
    id,
    employee_id,
    leave_type_id,
    allocated_days,
    used_days,
    valid_from,
    valid_to,
    notes,
    created_by,
    created_at
"#;

const REQUEST_COLUMNS: &str = r#"
    id,
    employee_id,
    leave_type_id,
    start_date,
    end_date,
    notes,
    status,
    reviewed_by,
    created_at,
    updated_at
"#;

#[async_trait]
impl LeaveStore for PgSession {
    async fn list_leave_types(&mut self) -> StoreResult<Vec<LeaveType>> {
        let types = sqlx::query_as::<_, LeaveType>(
            "SELECT id, name, is_paid FROM leave_types ORDER BY name",
        )
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(types)
    }

    async fn find_leave_type(&mut self, id: Uuid) -> StoreResult<Option<LeaveType>> {
        let leave_type = sqlx::query_as::<_, LeaveType>(
            "SELECT id, name, is_paid FROM leave_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(leave_type)
    }

    async fn insert_leave_type(&mut self, input: LeaveTypeInput) -> StoreResult<LeaveType> {
        let leave_type = sqlx::query_as::<_, LeaveType>(&sql(r#"
            INSERT INTO
                leave_types (name, is_paid)
            VALUES
                (?, ?)
            RETURNING
                id,
                name,
                is_paid
        "#))
        .bind(input.name.trim())
        .bind(input.is_paid)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(leave_type)
    }

    async fn insert_leave_allocation(
        &mut self,
        allocation: NewLeaveAllocation,
    ) -> StoreResult<LeaveAllocation> {
        let input = allocation.input;
        let inserted = sqlx::query_as::<_, LeaveAllocation>(&sql(&format!(
            r#"
            INSERT INTO
                leave_allocations (
                    employee_id,
                    leave_type_id,
                    allocated_days,
                    valid_from,
                    valid_to,
                    notes,
                    created_by
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?)
            RETURNING
                {ALLOCATION_COLUMNS}
            "#
        )))
        .bind(input.employee_id)
        .bind(input.leave_type_id)
        .bind(input.allocated_days)
        .bind(input.valid_from)
        .bind(input.valid_to)
        .bind(input.notes)
        .bind(allocation.created_by)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(inserted)
    }

    async fn list_leave_allocations(
        &mut self,
        company_id: Uuid,
        employee_id: Option<Uuid>,
    ) -> StoreResult<Vec<LeaveAllocation>> {
        let allocations = sqlx::query_as::<_, LeaveAllocation>(&sql(r#"
            SELECT
                la.id,
                la.employee_id,
                la.leave_type_id,
                la.allocated_days,
                la.used_days,
                la.valid_from,
                la.valid_to,
                la.notes,
                la.created_by,
                la.created_at
            FROM
                leave_allocations la
                INNER JOIN employees e ON e.id = la.employee_id
            WHERE
                e.company_id = ?
                AND (?::uuid IS NULL OR la.employee_id = ?)
            ORDER BY
                la.created_at,
                la.id
        "#))
        .bind(company_id)
        .bind(employee_id)
        .bind(employee_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(allocations)
    }

    async fn first_leave_allocation(
        &mut self,
        employee_id: Uuid,
        leave_type_id: Uuid,
    ) -> StoreResult<Option<LeaveAllocation>> {
        let allocation = sqlx::query_as::<_, LeaveAllocation>(&sql(&format!(
            r#"
            SELECT
                {ALLOCATION_COLUMNS}
            FROM
                leave_allocations
            WHERE
                employee_id = ?
                AND leave_type_id = ?
            ORDER BY
                created_at,
                id
            LIMIT 1
            FOR UPDATE
            "#
        )))
        .bind(employee_id)
        .bind(leave_type_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(allocation)
    }

    async fn add_used_days(
        &mut self,
        allocation_id: Uuid,
        days: f64,
    ) -> StoreResult<LeaveAllocation> {
        let allocation = sqlx::query_as::<_, LeaveAllocation>(&sql(&format!(
            r#"
            UPDATE
                leave_allocations
            SET
                used_days = used_days + ?
            WHERE
                id = ?
            RETURNING
                {ALLOCATION_COLUMNS}
            "#
        )))
        .bind(days)
        .bind(allocation_id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(allocation)
    }

    async fn insert_leave_request(
        &mut self,
        request: NewLeaveRequest,
    ) -> StoreResult<LeaveRequest> {
        let inserted = sqlx::query_as::<_, LeaveRequest>(&sql(&format!(
            r#"
            INSERT INTO
                leave_requests (employee_id, leave_type_id, start_date, end_date, notes, status)
            VALUES
                (?, ?, ?, ?, ?, ?)
            RETURNING
                {REQUEST_COLUMNS}
            "#
        )))
        .bind(request.employee_id)
        .bind(request.leave_type_id)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.notes)
        .bind(LeaveRequestStatus::Pending)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(inserted)
    }

    async fn find_leave_request(&mut self, id: Uuid) -> StoreResult<Option<LeaveRequest>> {
        let request = sqlx::query_as::<_, LeaveRequest>(&sql(&format!(
            r#"
            SELECT
                {REQUEST_COLUMNS}
            FROM
                leave_requests
            WHERE
                id = ?
            FOR UPDATE
            "#
        )))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(request)
    }

    async fn list_leave_requests(
        &mut self,
        company_id: Uuid,
        filter: LeaveRequestFilter,
    ) -> StoreResult<Vec<LeaveRequest>> {
        let requests = sqlx::query_as::<_, LeaveRequest>(&sql(r#"
            SELECT
                lr.id,
                lr.employee_id,
                lr.leave_type_id,
                lr.start_date,
                lr.end_date,
                lr.notes,
                lr.status,
                lr.reviewed_by,
                lr.created_at,
                lr.updated_at
            FROM
                leave_requests lr
                INNER JOIN employees e ON e.id = lr.employee_id
            WHERE
                e.company_id = ?
                AND (?::uuid IS NULL OR lr.employee_id = ?)
                AND (?::varchar IS NULL OR lr.status = ?)
            ORDER BY
                lr.start_date DESC,
                lr.created_at DESC
        "#))
        .bind(company_id)
        .bind(filter.employee_id)
        .bind(filter.employee_id)
        .bind(filter.status)
        .bind(filter.status)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(requests)
    }

    async fn set_leave_request_status(
        &mut self,
        id: Uuid,
        status: LeaveRequestStatus,
        reviewed_by: Uuid,
    ) -> StoreResult<LeaveRequest> {
        let request = sqlx::query_as::<_, LeaveRequest>(&sql(&format!(
            r#"
            UPDATE
                leave_requests
            SET
                status = ?,
                reviewed_by = ?,
                updated_at = NOW()
            WHERE
                id = ?
            RETURNING
                {REQUEST_COLUMNS}
            "#
        )))
        .bind(status)
        .bind(reviewed_by)
        .bind(id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(request)
    }
}
