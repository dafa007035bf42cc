use async_trait::async_trait;
use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::PgSession;
use crate::database::{
    models::{
        NewSalaryComponent, SalaryComponent, SalaryComponentPatch, SalaryStructure,
        SalaryStructureUpsert,
    },
    store::{SalaryStore, StoreResult},
    utils::sql,
};

const STRUCTURE_COLUMNS: &str = r#"
    id,
    employee_id,
    monthly_wage,
    working_days_per_week,
    break_hours,
    pf_employee_rate,
    pf_employer_rate,
    professional_tax_override,
    created_at,
    updated_at
"#;

const COMPONENT_COLUMNS: &str = r#"
    id,
    employee_id,
    name,
    computation_type,
    value,
    amount,
    is_deduction,
    created_at
"#;

#[async_trait]
impl SalaryStore for PgSession {
    async fn find_salary_structure(
        &mut self,
        employee_id: Uuid,
    ) -> StoreResult<Option<SalaryStructure>> {
        let structure = sqlx::query_as::<_, SalaryStructure>(&sql(&format!(
            r#"
            SELECT
                {STRUCTURE_COLUMNS}
            FROM
                salary_structure
            WHERE
                employee_id = ?
            "#
        )))
        .bind(employee_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(structure)
    }

    async fn upsert_salary_structure(
        &mut self,
        upsert: SalaryStructureUpsert,
    ) -> StoreResult<SalaryStructure> {
        let structure = sqlx::query_as::<_, SalaryStructure>(&sql(&format!(
            r#"
            INSERT INTO
                salary_structure (
                    employee_id,
                    monthly_wage,
                    working_days_per_week,
                    break_hours,
                    pf_employee_rate,
                    pf_employer_rate,
                    professional_tax_override
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (employee_id) DO UPDATE
            SET
                monthly_wage = EXCLUDED.monthly_wage,
                working_days_per_week = EXCLUDED.working_days_per_week,
                break_hours = EXCLUDED.break_hours,
                pf_employee_rate = EXCLUDED.pf_employee_rate,
                pf_employer_rate = EXCLUDED.pf_employer_rate,
                professional_tax_override = EXCLUDED.professional_tax_override,
                updated_at = NOW()
            RETURNING
                {STRUCTURE_COLUMNS}
            "#
        )))
        .bind(upsert.employee_id)
        .bind(upsert.monthly_wage)
        .bind(upsert.working_days_per_week)
        .bind(upsert.break_hours)
        .bind(upsert.pf_employee_rate)
        .bind(upsert.pf_employer_rate)
        .bind(upsert.professional_tax_override)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(structure)
    }

    async fn list_salary_structures(
        &mut self,
        company_id: Uuid,
    ) -> StoreResult<Vec<SalaryStructure>> {
        let structures = sqlx::query_as::<_, SalaryStructure>(&sql(r#"
            SELECT
                s.id,
                s.employee_id,
                s.monthly_wage,
                s.working_days_per_week,
                s.break_hours,
                s.pf_employee_rate,
                s.pf_employer_rate,
                s.professional_tax_override,
                s.created_at,
                s.updated_at
            FROM
                salary_structure s
                INNER JOIN employees e ON e.id = s.employee_id
            WHERE
                e.company_id = ?
            ORDER BY
                e.last_name,
                e.first_name
        "#))
        .bind(company_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(structures)
    }

    async fn list_salary_components(
        &mut self,
        employee_id: Uuid,
    ) -> StoreResult<Vec<SalaryComponent>> {
        let components = sqlx::query_as::<_, SalaryComponent>(&sql(&format!(
            r#"
            SELECT
                {COMPONENT_COLUMNS}
            FROM
                salary_components
            WHERE
                employee_id = ?
            ORDER BY
                created_at,
                id
            "#
        )))
        .bind(employee_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(components)
    }

    async fn find_salary_component(
        &mut self,
        employee_id: Uuid,
        component_id: Uuid,
    ) -> StoreResult<Option<SalaryComponent>> {
        let component = sqlx::query_as::<_, SalaryComponent>(&sql(&format!(
            r#"
            SELECT
                {COMPONENT_COLUMNS}
            FROM
                salary_components
            WHERE
                id = ?
                AND employee_id = ?
            "#
        )))
        .bind(component_id)
        .bind(employee_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(component)
    }

    async fn insert_salary_component(
        &mut self,
        component: NewSalaryComponent,
    ) -> StoreResult<SalaryComponent> {
        let inserted = sqlx::query_as::<_, SalaryComponent>(&sql(&format!(
            r#"
            INSERT INTO
                salary_components (
                    employee_id,
                    name,
                    computation_type,
                    value,
                    amount,
                    is_deduction
                )
            VALUES
                (?, ?, ?, ?, ?, ?)
            RETURNING
                {COMPONENT_COLUMNS}
            "#
        )))
        .bind(component.employee_id)
        .bind(component.name)
        .bind(component.computation_type)
        .bind(component.value)
        .bind(component.amount)
        .bind(component.is_deduction)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(inserted)
    }

    async fn update_salary_component(
        &mut self,
        component_id: Uuid,
        patch: SalaryComponentPatch,
        amount: BigDecimal,
    ) -> StoreResult<SalaryComponent> {
        let updated = sqlx::query_as::<_, SalaryComponent>(&sql(&format!(
            r#"
            UPDATE
                salary_components
            SET
                name = COALESCE(?, name),
                computation_type = COALESCE(?, computation_type),
                value = COALESCE(?, value),
                is_deduction = COALESCE(?, is_deduction),
                amount = ?
            WHERE
                id = ?
            RETURNING
                {COMPONENT_COLUMNS}
            "#
        )))
        .bind(patch.name)
        .bind(patch.computation_type)
        .bind(patch.value)
        .bind(patch.is_deduction)
        .bind(amount)
        .bind(component_id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(updated)
    }

    async fn delete_salary_component(
        &mut self,
        employee_id: Uuid,
        component_id: Uuid,
    ) -> StoreResult<bool> {
        let result = sqlx::query(&sql(r#"
            DELETE FROM
                salary_components
            WHERE
                id = ?
                AND employee_id = ?
        "#))
        .bind(component_id)
        .bind(employee_id)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
