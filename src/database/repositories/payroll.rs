use async_trait::async_trait;
use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::PgSession;
use crate::database::{
    models::{
        NewPayrun, NewPayslip, Page, PageRequest, PayLine, Payrun, PayrunStatus, Payslip,
        PayslipComponent, PayslipFigures, PayslipStatus,
    },
    store::{PayrunStore, StoreResult},
    utils::sql,
};

const PAYRUN_COLUMNS: &str = r#"
    id,
    company_id,
    period_month,
    period_year,
    employee_count,
    total_employer_cost,
    status,
    created_by,
    created_at,
    updated_at
"#;

const PAYSLIP_COLUMNS: &str = r#"
    id,
    payrun_id,
    employee_id,
    payable_days,
    total_worked_days,
    total_leaves,
    basic_wage,
    gross_wage,
    net_wage,
    employer_cost,
    status,
    created_at,
    updated_at
"#;

#[async_trait]
impl PayrunStore for PgSession {
    async fn find_payrun_for_period(
        &mut self,
        company_id: Uuid,
        period_month: i32,
        period_year: i32,
    ) -> StoreResult<Option<Payrun>> {
        let payrun = sqlx::query_as::<_, Payrun>(&sql(&format!(
            r#"
            SELECT
                {PAYRUN_COLUMNS}
            FROM
                payruns
            WHERE
                company_id = ?
                AND period_month = ?
                AND period_year = ?
            "#
        )))
        .bind(company_id)
        .bind(period_month)
        .bind(period_year)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(payrun)
    }

    async fn insert_payrun(&mut self, payrun: NewPayrun) -> StoreResult<Payrun> {
        // Unique violations on (company_id, period_month, period_year)
        // surface as AppError::Conflict.
        let inserted = sqlx::query_as::<_, Payrun>(&sql(&format!(
            r#"
            INSERT INTO
                payruns (company_id, period_month, period_year, status, created_by)
            VALUES
                (?, ?, ?, ?, ?)
            RETURNING
                {PAYRUN_COLUMNS}
            "#
        )))
        .bind(payrun.company_id)
        .bind(payrun.period_month)
        .bind(payrun.period_year)
        .bind(PayrunStatus::Completed)
        .bind(payrun.created_by)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(inserted)
    }

    async fn find_payrun(&mut self, id: Uuid) -> StoreResult<Option<Payrun>> {
        let payrun = sqlx::query_as::<_, Payrun>(&sql(&format!(
            r#"
            SELECT
                {PAYRUN_COLUMNS}
            FROM
                payruns
            WHERE
                id = ?
            FOR UPDATE
            "#
        )))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(payrun)
    }

    async fn list_payruns(&mut self, company_id: Uuid) -> StoreResult<Vec<Payrun>> {
        let payruns = sqlx::query_as::<_, Payrun>(&sql(&format!(
            r#"
            SELECT
                {PAYRUN_COLUMNS}
            FROM
                payruns
            WHERE
                company_id = ?
            ORDER BY
                period_year DESC,
                period_month DESC
            "#
        )))
        .bind(company_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(payruns)
    }

    async fn page_payruns(
        &mut self,
        company_id: Uuid,
        page: PageRequest,
    ) -> StoreResult<Page<Payrun>> {
        let total = sqlx::query_scalar::<_, i64>(&sql(r#"
            SELECT
                COUNT(*)
            FROM
                payruns
            WHERE
                company_id = ?
        "#))
        .bind(company_id)
        .fetch_one(&mut *self.tx)
        .await?;

        let payruns = sqlx::query_as::<_, Payrun>(&sql(&format!(
            r#"
            SELECT
                {PAYRUN_COLUMNS}
            FROM
                payruns
            WHERE
                company_id = ?
            ORDER BY
                period_year DESC,
                period_month DESC
            LIMIT ?
            OFFSET ?
            "#
        )))
        .bind(company_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(Page::new(payruns, page, total))
    }

    async fn update_payrun_totals(
        &mut self,
        id: Uuid,
        employee_count: i32,
        total_employer_cost: BigDecimal,
    ) -> StoreResult<Payrun> {
        let payrun = sqlx::query_as::<_, Payrun>(&sql(&format!(
            r#"
            UPDATE
                payruns
            SET
                employee_count = ?,
                total_employer_cost = ?,
                updated_at = NOW()
            WHERE
                id = ?
            RETURNING
                {PAYRUN_COLUMNS}
            "#
        )))
        .bind(employee_count)
        .bind(total_employer_cost)
        .bind(id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(payrun)
    }

    async fn set_payrun_status(&mut self, id: Uuid, status: PayrunStatus) -> StoreResult<Payrun> {
        let payrun = sqlx::query_as::<_, Payrun>(&sql(&format!(
            r#"
            UPDATE
                payruns
            SET
                status = ?,
                updated_at = NOW()
            WHERE
                id = ?
            RETURNING
                {PAYRUN_COLUMNS}
            "#
        )))
        .bind(status)
        .bind(id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(payrun)
    }

    async fn insert_payslip(&mut self, payslip: NewPayslip) -> StoreResult<Payslip> {
        let figures = payslip.figures;
        let inserted = sqlx::query_as::<_, Payslip>(&sql(&format!(
            r#"
            INSERT INTO
                payslips (
                    payrun_id,
                    employee_id,
                    payable_days,
                    total_worked_days,
                    total_leaves,
                    basic_wage,
                    gross_wage,
                    net_wage,
                    employer_cost,
                    status
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING
                {PAYSLIP_COLUMNS}
            "#
        )))
        .bind(payslip.payrun_id)
        .bind(payslip.employee_id)
        .bind(figures.payable_days)
        .bind(figures.total_worked_days)
        .bind(figures.total_leaves)
        .bind(figures.basic_wage)
        .bind(figures.gross_wage)
        .bind(figures.net_wage)
        .bind(figures.employer_cost)
        .bind(PayslipStatus::Generated)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(inserted)
    }

    async fn find_payslip(&mut self, id: Uuid) -> StoreResult<Option<Payslip>> {
        let payslip = sqlx::query_as::<_, Payslip>(&sql(&format!(
            r#"
            SELECT
                {PAYSLIP_COLUMNS}
            FROM
                payslips
            WHERE
                id = ?
            FOR UPDATE
            "#
        )))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(payslip)
    }

    async fn list_payslips_for_payrun(&mut self, payrun_id: Uuid) -> StoreResult<Vec<Payslip>> {
        let payslips = sqlx::query_as::<_, Payslip>(&sql(&format!(
            r#"
            SELECT
                {PAYSLIP_COLUMNS}
            FROM
                payslips
            WHERE
                payrun_id = ?
            ORDER BY
                created_at,
                id
            "#
        )))
        .bind(payrun_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(payslips)
    }

    async fn page_payslips_for_payrun(
        &mut self,
        payrun_id: Uuid,
        page: PageRequest,
    ) -> StoreResult<Page<Payslip>> {
        let total = sqlx::query_scalar::<_, i64>(&sql(r#"
            SELECT
                COUNT(*)
            FROM
                payslips
            WHERE
                payrun_id = ?
        "#))
        .bind(payrun_id)
        .fetch_one(&mut *self.tx)
        .await?;

        let payslips = sqlx::query_as::<_, Payslip>(&sql(&format!(
            r#"
            SELECT
                {PAYSLIP_COLUMNS}
            FROM
                payslips
            WHERE
                payrun_id = ?
            ORDER BY
                created_at,
                id
            LIMIT ?
            OFFSET ?
            "#
        )))
        .bind(payrun_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(Page::new(payslips, page, total))
    }

    async fn page_payslips_for_employee(
        &mut self,
        employee_id: Uuid,
        company_id: Uuid,
        page: PageRequest,
    ) -> StoreResult<Page<Payslip>> {
        let total = sqlx::query_scalar::<_, i64>(&sql(r#"
            SELECT
                COUNT(*)
            FROM
                payslips ps
                INNER JOIN payruns pr ON pr.id = ps.payrun_id
            WHERE
                ps.employee_id = ?
                AND pr.company_id = ?
        "#))
        .bind(employee_id)
        .bind(company_id)
        .fetch_one(&mut *self.tx)
        .await?;

        let payslips = sqlx::query_as::<_, Payslip>(&sql(r#"
            SELECT
                ps.id,
                ps.payrun_id,
                ps.employee_id,
                ps.payable_days,
                ps.total_worked_days,
                ps.total_leaves,
                ps.basic_wage,
                ps.gross_wage,
                ps.net_wage,
                ps.employer_cost,
                ps.status,
                ps.created_at,
                ps.updated_at
            FROM
                payslips ps
                INNER JOIN payruns pr ON pr.id = ps.payrun_id
            WHERE
                ps.employee_id = ?
                AND pr.company_id = ?
            ORDER BY
                pr.period_year DESC,
                pr.period_month DESC
            LIMIT ?
            OFFSET ?
        "#))
        .bind(employee_id)
        .bind(company_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(Page::new(payslips, page, total))
    }

    async fn overwrite_payslip(
        &mut self,
        id: Uuid,
        figures: PayslipFigures,
    ) -> StoreResult<Payslip> {
        let payslip = sqlx::query_as::<_, Payslip>(&sql(&format!(
            r#"
            UPDATE
                payslips
            SET
                payable_days = ?,
                total_worked_days = ?,
                total_leaves = ?,
                basic_wage = ?,
                gross_wage = ?,
                net_wage = ?,
                employer_cost = ?,
                status = ?,
                updated_at = NOW()
            WHERE
                id = ?
            RETURNING
                {PAYSLIP_COLUMNS}
            "#
        )))
        .bind(figures.payable_days)
        .bind(figures.total_worked_days)
        .bind(figures.total_leaves)
        .bind(figures.basic_wage)
        .bind(figures.gross_wage)
        .bind(figures.net_wage)
        .bind(figures.employer_cost)
        .bind(PayslipStatus::Generated)
        .bind(id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(payslip)
    }

    async fn set_payslip_status(
        &mut self,
        id: Uuid,
        status: PayslipStatus,
    ) -> StoreResult<Payslip> {
        let payslip = sqlx::query_as::<_, Payslip>(&sql(&format!(
            r#"
            UPDATE
                payslips
            SET
                status = ?,
                updated_at = NOW()
            WHERE
                id = ?
            RETURNING
                {PAYSLIP_COLUMNS}
            "#
        )))
        .bind(status)
        .bind(id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(payslip)
    }

    async fn replace_payslip_components(
        &mut self,
        payslip_id: Uuid,
        lines: &[PayLine],
    ) -> StoreResult<Vec<PayslipComponent>> {
        sqlx::query("DELETE FROM payslip_components WHERE payslip_id = $1")
            .bind(payslip_id)
            .execute(&mut *self.tx)
            .await?;

        let mut components = Vec::with_capacity(lines.len());
        for (position, line) in lines.iter().enumerate() {
            let component = sqlx::query_as::<_, PayslipComponent>(&sql(r#"
                INSERT INTO
                    payslip_components (payslip_id, position, component_name, amount, is_deduction)
                VALUES
                    (?, ?, ?, ?, ?)
                RETURNING
                    id,
                    payslip_id,
                    component_name,
                    amount,
                    is_deduction
            "#))
            .bind(payslip_id)
            .bind(position as i32)
            .bind(&line.name)
            .bind(&line.amount)
            .bind(line.is_deduction)
            .fetch_one(&mut *self.tx)
            .await?;
            components.push(component);
        }

        Ok(components)
    }

    async fn list_payslip_components(
        &mut self,
        payslip_id: Uuid,
    ) -> StoreResult<Vec<PayslipComponent>> {
        let components = sqlx::query_as::<_, PayslipComponent>(&sql(r#"
            SELECT
                id,
                payslip_id,
                component_name,
                amount,
                is_deduction
            FROM
                payslip_components
            WHERE
                payslip_id = ?
            ORDER BY
                position
        "#))
        .bind(payslip_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(components)
    }
}
