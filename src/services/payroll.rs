//! Payrun orchestration, payslip recompute and payrun re-aggregation.

use bigdecimal::{BigDecimal, Zero};
use uuid::Uuid;

use super::calendar;
use super::payslip::{compute_for_employee, round_money};
use crate::config::EmployerCostPolicy;
use crate::database::models::{
    EmployerCostReport, MonthlyEmployerCost, NewPayrun, NewPayslip, Page, PageRequest, Payrun,
    PayrunCreated,
    PayrunInput, PayrunStatus, PayrunWarnings, Payslip, PayslipDetail, PayslipStatus,
    PayslipSummary, PayslipView,
};
use crate::database::store::Session;
use crate::error::AppError;

fn period(payrun: &Payrun) -> (i32, u32) {
    (payrun.period_year, payrun.period_month.clamp(1, 12) as u32)
}

async fn scoped_payrun<S: Session>(
    session: &mut S,
    company_id: Uuid,
    payrun_id: Uuid,
) -> Result<Payrun, AppError> {
    let payrun = session
        .find_payrun(payrun_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Payrun not found".to_string()))?;
    if payrun.company_id != company_id {
        return Err(AppError::Forbidden(
            "Payrun belongs to another company".to_string(),
        ));
    }
    Ok(payrun)
}

async fn scoped_payslip<S: Session>(
    session: &mut S,
    company_id: Uuid,
    payslip_id: Uuid,
) -> Result<(Payslip, Payrun), AppError> {
    let payslip = session
        .find_payslip(payslip_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Payslip not found".to_string()))?;
    let payrun = session
        .find_payrun(payslip.payrun_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Payrun not found".to_string()))?;
    if payrun.company_id != company_id {
        return Err(AppError::Forbidden(
            "Payslip belongs to another company".to_string(),
        ));
    }
    Ok((payslip, payrun))
}

async fn payslip_view<S: Session>(
    session: &mut S,
    payslip: Payslip,
    payrun: &Payrun,
) -> Result<PayslipView, AppError> {
    let employee_name = session
        .find_employee(payslip.employee_id)
        .await?
        .map(|employee| employee.full_name())
        .unwrap_or_default();
    let working_days_per_week = session
        .find_salary_structure(payslip.employee_id)
        .await?
        .map(|structure| structure.working_days_per_week)
        .unwrap_or(5);

    let (year, month) = period(payrun);
    let expected = calendar::expected_working_days(year, month, working_days_per_week) as i32;
    let absent_days = (expected - (payslip.total_worked_days + payslip.total_leaves)).max(0);

    Ok(PayslipView {
        payslip,
        period_month: payrun.period_month,
        period_year: payrun.period_year,
        employee_name,
        expected_working_days: expected,
        absent_days,
    })
}

/// Creates the payrun of a period and one payslip per employee with a
/// salary structure. Employees without one are reported, not failed.
pub async fn create_payrun<S: Session>(
    session: &mut S,
    company_id: Uuid,
    created_by: Uuid,
    input: PayrunInput,
    policy: EmployerCostPolicy,
) -> Result<PayrunCreated, AppError> {
    input.validate()?;

    if session
        .find_payrun_for_period(company_id, input.period_month, input.period_year)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "Payrun already exists for {}/{}",
            input.period_month, input.period_year
        )));
    }

    let payrun = session
        .insert_payrun(NewPayrun {
            company_id,
            period_month: input.period_month,
            period_year: input.period_year,
            created_by: Some(created_by),
        })
        .await?;
    let (year, month) = period(&payrun);

    let mut employee_count = 0;
    let mut total_employer_cost = BigDecimal::zero();
    let mut employees_without_salary = Vec::new();

    for employee in session.list_company_employees(company_id).await? {
        let Some(computation) =
            compute_for_employee(session, employee.id, year, month, policy).await?
        else {
            log::warn!(
                "Skipping employee {} in payrun {}: no salary structure",
                employee.id,
                payrun.id
            );
            employees_without_salary.push(employee.id);
            continue;
        };

        let payslip = session
            .insert_payslip(NewPayslip {
                payrun_id: payrun.id,
                employee_id: employee.id,
                figures: computation.figures(),
            })
            .await?;
        session
            .replace_payslip_components(payslip.id, &computation.lines())
            .await?;

        employee_count += 1;
        total_employer_cost += &computation.employer_cost;
    }

    let payrun = session
        .update_payrun_totals(payrun.id, employee_count, round_money(&total_employer_cost))
        .await?;

    log::info!(
        "Payrun {} created for {}/{}: {} payslips, {} skipped",
        payrun.id,
        payrun.period_month,
        payrun.period_year,
        employee_count,
        employees_without_salary.len()
    );

    let warnings = (!employees_without_salary.is_empty()).then(|| PayrunWarnings {
        employees_without_salary,
    });
    Ok(PayrunCreated { payrun, warnings })
}

pub async fn list_payruns<S: Session>(
    session: &mut S,
    company_id: Uuid,
    page: PageRequest,
) -> Result<Page<Payrun>, AppError> {
    session.page_payruns(company_id, page).await
}

pub async fn get_payrun<S: Session>(
    session: &mut S,
    company_id: Uuid,
    payrun_id: Uuid,
) -> Result<Payrun, AppError> {
    scoped_payrun(session, company_id, payrun_id).await
}

pub async fn list_payslips<S: Session>(
    session: &mut S,
    company_id: Uuid,
    payrun_id: Uuid,
    page: PageRequest,
) -> Result<Page<PayslipView>, AppError> {
    let payrun = scoped_payrun(session, company_id, payrun_id).await?;
    let payslips = session.page_payslips_for_payrun(payrun.id, page).await?;

    let mut views = Vec::with_capacity(payslips.items.len());
    for payslip in payslips.items {
        views.push(payslip_view(session, payslip, &payrun).await?);
    }
    Ok(Page::new(views, page, payslips.total))
}

pub async fn list_own_payslips<S: Session>(
    session: &mut S,
    company_id: Uuid,
    employee_id: Uuid,
    page: PageRequest,
) -> Result<Page<PayslipView>, AppError> {
    let payslips = session
        .page_payslips_for_employee(employee_id, company_id, page)
        .await?;

    let mut views = Vec::with_capacity(payslips.items.len());
    for payslip in payslips.items {
        let payrun = session
            .find_payrun(payslip.payrun_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Payrun not found".to_string()))?;
        views.push(payslip_view(session, payslip, &payrun).await?);
    }
    Ok(Page::new(views, page, payslips.total))
}

pub async fn get_payslip<S: Session>(
    session: &mut S,
    company_id: Uuid,
    payslip_id: Uuid,
) -> Result<PayslipDetail, AppError> {
    let (payslip, payrun) = scoped_payslip(session, company_id, payslip_id).await?;
    let components = session.list_payslip_components(payslip.id).await?;
    let view = payslip_view(session, payslip, &payrun).await?;

    let (deductions, earnings): (Vec<_>, Vec<_>) = components
        .iter()
        .cloned()
        .partition(|component| component.is_deduction);

    Ok(PayslipDetail {
        payslip: view,
        components,
        summary: PayslipSummary {
            earnings,
            deductions,
        },
    })
}

pub async fn validate_payrun<S: Session>(
    session: &mut S,
    company_id: Uuid,
    payrun_id: Uuid,
) -> Result<Payrun, AppError> {
    let payrun = scoped_payrun(session, company_id, payrun_id).await?;
    let payrun = session
        .set_payrun_status(payrun.id, PayrunStatus::Validated)
        .await?;
    log::info!("Payrun {} validated", payrun.id);
    Ok(payrun)
}

pub async fn validate_payslip<S: Session>(
    session: &mut S,
    company_id: Uuid,
    payslip_id: Uuid,
) -> Result<Payslip, AppError> {
    let (payslip, _) = scoped_payslip(session, company_id, payslip_id).await?;
    if payslip.status == PayslipStatus::Cancelled {
        return Err(AppError::Conflict(
            "A cancelled payslip cannot be validated".to_string(),
        ));
    }
    session
        .set_payslip_status(payslip.id, PayslipStatus::Validated)
        .await
}

/// Cancels a payslip. Payrun totals change only on the next re-aggregation.
pub async fn cancel_payslip<S: Session>(
    session: &mut S,
    company_id: Uuid,
    payslip_id: Uuid,
) -> Result<Payslip, AppError> {
    let (payslip, _) = scoped_payslip(session, company_id, payslip_id).await?;
    let payslip = session
        .set_payslip_status(payslip.id, PayslipStatus::Cancelled)
        .await?;
    log::info!("Payslip {} cancelled", payslip.id);
    Ok(payslip)
}

/// Re-derives one payslip from current attendance and salary data. The
/// payslip returns to `generated` whatever its previous status was.
pub async fn recompute_payslip<S: Session>(
    session: &mut S,
    company_id: Uuid,
    payslip_id: Uuid,
    policy: EmployerCostPolicy,
) -> Result<Payslip, AppError> {
    let (payslip, payrun) = scoped_payslip(session, company_id, payslip_id).await?;
    let (year, month) = period(&payrun);

    let computation = compute_for_employee(session, payslip.employee_id, year, month, policy)
        .await?
        .ok_or_else(|| AppError::Validation("Salary structure missing".to_string()))?;

    let updated = session
        .overwrite_payslip(payslip.id, computation.figures())
        .await?;
    session
        .replace_payslip_components(payslip.id, &computation.lines())
        .await?;

    log::info!("Payslip {} recomputed", payslip.id);
    Ok(updated)
}

/// Rebuilds the payrun totals by recomputing every non-cancelled payslip
/// from source data. Stored payslip figures are not read or rewritten.
pub async fn reaggregate_payrun<S: Session>(
    session: &mut S,
    company_id: Uuid,
    payrun_id: Uuid,
    policy: EmployerCostPolicy,
) -> Result<Payrun, AppError> {
    let payrun = scoped_payrun(session, company_id, payrun_id).await?;
    let (year, month) = period(&payrun);

    let mut employee_count = 0;
    let mut total_employer_cost = BigDecimal::zero();

    for payslip in session.list_payslips_for_payrun(payrun.id).await? {
        if payslip.status == PayslipStatus::Cancelled {
            continue;
        }
        match compute_for_employee(session, payslip.employee_id, year, month, policy).await? {
            Some(computation) => {
                employee_count += 1;
                total_employer_cost += &computation.employer_cost;
            }
            None => log::warn!(
                "Payslip {} excluded from payrun {} totals: no salary structure",
                payslip.id,
                payrun.id
            ),
        }
    }

    let payrun = session
        .update_payrun_totals(payrun.id, employee_count, round_money(&total_employer_cost))
        .await?;
    log::info!(
        "Payrun {} re-aggregated: {} payslips, employer cost {}",
        payrun.id,
        payrun.employee_count,
        payrun.total_employer_cost
    );
    Ok(payrun)
}

pub async fn employer_cost_report<S: Session>(
    session: &mut S,
    company_id: Uuid,
    year: i32,
) -> Result<EmployerCostReport, AppError> {
    if !(1970..=9999).contains(&year) {
        return Err(AppError::Validation("year is out of range".to_string()));
    }

    let mut months: Vec<MonthlyEmployerCost> = (1..=12)
        .map(|month| MonthlyEmployerCost {
            month,
            employer_cost: BigDecimal::zero(),
        })
        .collect();

    for payrun in session.list_payruns(company_id).await? {
        if payrun.period_year != year {
            continue;
        }
        let (_, month) = period(&payrun);
        if let Some(bucket) = months.get_mut(month as usize - 1) {
            bucket.employer_cost = payrun.total_employer_cost;
        }
    }

    Ok(EmployerCostReport { year, months })
}
