use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::payslip::round_money;
use super::require_company_employee;
use crate::database::models::{
    ComputationType, NewSalaryComponent, SalaryComponent, SalaryComponentInput,
    SalaryComponentPatch, SalaryOverview, SalaryStructure, SalaryStructureInput,
    SalaryStructureUpsert,
};
use crate::database::store::Session;
use crate::error::AppError;

pub async fn upsert_structure<S: Session>(
    session: &mut S,
    company_id: Uuid,
    employee_id: Uuid,
    input: SalaryStructureInput,
) -> Result<SalaryStructure, AppError> {
    input.validate()?;
    require_company_employee(session, company_id, employee_id).await?;

    let structure = session
        .upsert_salary_structure(SalaryStructureUpsert::new(employee_id, input))
        .await?;
    log::info!(
        "Salary structure saved for employee {} (monthly wage {})",
        employee_id,
        structure.monthly_wage
    );
    Ok(structure)
}

pub async fn overview<S: Session>(
    session: &mut S,
    company_id: Uuid,
    employee_id: Uuid,
) -> Result<SalaryOverview, AppError> {
    require_company_employee(session, company_id, employee_id).await?;
    let structure = session.find_salary_structure(employee_id).await?;
    let components = session.list_salary_components(employee_id).await?;
    Ok(SalaryOverview {
        structure,
        components,
    })
}

pub async fn list_structures<S: Session>(
    session: &mut S,
    company_id: Uuid,
) -> Result<Vec<SalaryStructure>, AppError> {
    session.list_salary_structures(company_id).await
}

/// Display snapshot of a component against the nominal monthly wage.
async fn snapshot_amount<S: Session>(
    session: &mut S,
    employee_id: Uuid,
    computation_type: ComputationType,
    value: &BigDecimal,
) -> Result<BigDecimal, AppError> {
    let amount = match computation_type {
        ComputationType::Fixed => value.clone(),
        ComputationType::Percentage => {
            let structure = session
                .find_salary_structure(employee_id)
                .await?
                .ok_or_else(|| {
                    AppError::Validation(
                        "A salary structure is required for percentage components".to_string(),
                    )
                })?;
            computation_type.evaluate(value, &structure.monthly_wage)
        }
    };
    Ok(round_money(&amount))
}

pub async fn add_component<S: Session>(
    session: &mut S,
    company_id: Uuid,
    employee_id: Uuid,
    input: SalaryComponentInput,
) -> Result<SalaryComponent, AppError> {
    input.validate()?;
    require_company_employee(session, company_id, employee_id).await?;

    let amount = snapshot_amount(session, employee_id, input.computation_type, &input.value).await?;
    session
        .insert_salary_component(NewSalaryComponent {
            employee_id,
            name: input.name.trim().to_string(),
            computation_type: input.computation_type,
            value: input.value,
            amount,
            is_deduction: input.is_deduction,
        })
        .await
}

pub async fn update_component<S: Session>(
    session: &mut S,
    company_id: Uuid,
    employee_id: Uuid,
    component_id: Uuid,
    mut patch: SalaryComponentPatch,
) -> Result<SalaryComponent, AppError> {
    if patch.is_empty() {
        return Err(AppError::Validation("No fields to update".to_string()));
    }
    if let Some(name) = patch.name.as_mut() {
        *name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("name must not be empty".to_string()));
        }
    }
    if patch
        .value
        .as_ref()
        .is_some_and(|value| *value < BigDecimal::from(0))
    {
        return Err(AppError::Validation("value must not be negative".to_string()));
    }
    require_company_employee(session, company_id, employee_id).await?;

    let mut merged = session
        .find_salary_component(employee_id, component_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Salary component not found".to_string()))?;
    patch.apply(&mut merged);

    let amount =
        snapshot_amount(session, employee_id, merged.computation_type, &merged.value).await?;
    session
        .update_salary_component(component_id, patch, amount)
        .await
}

pub async fn delete_component<S: Session>(
    session: &mut S,
    company_id: Uuid,
    employee_id: Uuid,
    component_id: Uuid,
) -> Result<(), AppError> {
    require_company_employee(session, company_id, employee_id).await?;
    if !session
        .delete_salary_component(employee_id, component_id)
        .await?
    {
        return Err(AppError::NotFound("Salary component not found".to_string()));
    }
    Ok(())
}
