use async_trait::async_trait;
use uuid::Uuid;

use super::PgSession;
use crate::database::{
    models::Employee,
    store::{EmployeeDirectory, StoreResult},
    utils::sql,
};

#[async_trait]
impl EmployeeDirectory for PgSession {
    async fn find_employee(&mut self, employee_id: Uuid) -> StoreResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(&sql(r#"
            SELECT
                id,
                company_id,
                user_id,
                first_name,
                last_name
            FROM
                employees
            WHERE
                id = ?
        "#))
        .bind(employee_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(employee)
    }

    async fn list_company_employees(&mut self, company_id: Uuid) -> StoreResult<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>(&sql(r#"
            SELECT
                id,
                company_id,
                user_id,
                first_name,
                last_name
            FROM
                employees
            WHERE
                company_id = ?
            ORDER BY
                last_name,
                first_name,
                id
        "#))
        .bind(company_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(employees)
    }

    async fn list_company_ids(&mut self) -> StoreResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(&sql(r#"
            SELECT DISTINCT
                company_id
            FROM
                employees
            ORDER BY
                company_id
        "#))
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(ids)
    }
}
