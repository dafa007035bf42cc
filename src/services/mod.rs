use uuid::Uuid;

use crate::database::models::Employee;
use crate::database::store::Session;
use crate::error::AppError;

pub mod absence_job;
pub mod attendance;
pub mod auth;
pub mod calendar;
pub mod leave;
pub mod payroll;
pub mod payslip;
pub mod salary;

pub use absence_job::AbsenceJob;
pub use auth::{Claims, Role};

/// Loads an employee and checks it belongs to `company_id`.
pub async fn require_company_employee<S: Session>(
    session: &mut S,
    company_id: Uuid,
    employee_id: Uuid,
) -> Result<Employee, AppError> {
    let employee = session
        .find_employee(employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;
    if !employee.belongs_to(company_id) {
        return Err(AppError::Forbidden(
            "Employee belongs to another company".to_string(),
        ));
    }
    Ok(employee)
}
