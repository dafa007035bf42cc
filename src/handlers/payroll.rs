use actix_web::{
    HttpResponse,
    web::{self, Data},
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    config::Config,
    database::{
        models::{PageQuery, PageRequest, PayrunInput, RecomputeOutcome},
        store::Database,
        transaction,
    },
    error::AppError,
    handlers::shared::ApiResponse,
    services::{Claims, auth::PAYROLL_OPERATORS, payroll},
};

pub async fn create_payrun<D: Database>(
    db: Data<D>,
    config: Data<Config>,
    claims: Claims,
    input: web::Json<PayrunInput>,
) -> Result<HttpResponse, AppError> {
    claims.require_any(PAYROLL_OPERATORS)?;
    let company_id = claims.company_id;
    let created_by = claims.user_id();
    let policy = config.employer_cost_policy;
    let input = input.into_inner();

    let created = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move {
            payroll::create_payrun(session, company_id, created_by, input, policy).await
        })
    })
    .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(created)))
}

pub async fn list_payruns<D: Database>(
    db: Data<D>,
    claims: Claims,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    claims.require_any(PAYROLL_OPERATORS)?;
    let company_id = claims.company_id;
    let page = PageRequest::from(query.into_inner());

    let payruns = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move { payroll::list_payruns(session, company_id, page).await })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(payruns)))
}

pub async fn get_payrun<D: Database>(
    db: Data<D>,
    claims: Claims,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    claims.require_any(PAYROLL_OPERATORS)?;
    let payrun_id = path.into_inner();
    let company_id = claims.company_id;

    let payrun = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move { payroll::get_payrun(session, company_id, payrun_id).await })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(payrun)))
}

pub async fn list_payrun_payslips<D: Database>(
    db: Data<D>,
    claims: Claims,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    claims.require_any(PAYROLL_OPERATORS)?;
    let payrun_id = path.into_inner();
    let company_id = claims.company_id;
    let page = PageRequest::from(query.into_inner());

    let payslips = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move { payroll::list_payslips(session, company_id, payrun_id, page).await })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(payslips)))
}

pub async fn validate_payrun<D: Database>(
    db: Data<D>,
    claims: Claims,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    claims.require_any(PAYROLL_OPERATORS)?;
    let payrun_id = path.into_inner();
    let company_id = claims.company_id;

    let payrun = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move { payroll::validate_payrun(session, company_id, payrun_id).await })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(payrun)))
}

pub async fn reaggregate_payrun<D: Database>(
    db: Data<D>,
    config: Data<Config>,
    claims: Claims,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    claims.require_any(PAYROLL_OPERATORS)?;
    let payrun_id = path.into_inner();
    let company_id = claims.company_id;
    let policy = config.employer_cost_policy;

    let payrun = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move {
            payroll::reaggregate_payrun(session, company_id, payrun_id, policy).await
        })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(payrun)))
}

/// Payslip detail. Operators see any payslip of the company, other callers
/// only their own.
pub async fn get_payslip<D: Database>(
    db: Data<D>,
    claims: Claims,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let payslip_id = path.into_inner();
    let company_id = claims.company_id;
    let own_employee = if claims.has_any_role(PAYROLL_OPERATORS) {
        None
    } else {
        Some(claims.require_employee()?)
    };

    let detail = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move {
            let detail = payroll::get_payslip(session, company_id, payslip_id).await?;
            match own_employee {
                Some(employee_id) if detail.payslip.payslip.employee_id != employee_id => Err(
                    AppError::Forbidden("Payslip belongs to another employee".to_string()),
                ),
                _ => Ok(detail),
            }
        })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(detail)))
}

pub async fn my_payslips<D: Database>(
    db: Data<D>,
    claims: Claims,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = claims.require_employee()?;
    let company_id = claims.company_id;
    let page = PageRequest::from(query.into_inner());

    let payslips = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move {
            payroll::list_own_payslips(session, company_id, employee_id, page).await
        })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(payslips)))
}

pub async fn validate_payslip<D: Database>(
    db: Data<D>,
    claims: Claims,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    claims.require_any(PAYROLL_OPERATORS)?;
    let payslip_id = path.into_inner();
    let company_id = claims.company_id;

    let payslip = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move { payroll::validate_payslip(session, company_id, payslip_id).await })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(payslip)))
}

pub async fn cancel_payslip<D: Database>(
    db: Data<D>,
    claims: Claims,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    claims.require_any(PAYROLL_OPERATORS)?;
    let payslip_id = path.into_inner();
    let company_id = claims.company_id;

    let payslip = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move { payroll::cancel_payslip(session, company_id, payslip_id).await })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(payslip)))
}

/// Recomputes the payslip and re-aggregates its payrun in one transaction.
pub async fn recompute_payslip<D: Database>(
    db: Data<D>,
    config: Data<Config>,
    claims: Claims,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    claims.require_any(PAYROLL_OPERATORS)?;
    let payslip_id = path.into_inner();
    let company_id = claims.company_id;
    let policy = config.employer_cost_policy;

    let outcome = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move {
            let payslip =
                payroll::recompute_payslip(session, company_id, payslip_id, policy).await?;
            let payrun =
                payroll::reaggregate_payrun(session, company_id, payslip.payrun_id, policy)
                    .await?;
            Ok(RecomputeOutcome {
                id: payslip.id,
                status: payslip.status,
                payrun,
            })
        })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(outcome)))
}

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

/// Monthly employer cost for `?year=` (defaults to the current year)
pub async fn employer_cost<D: Database>(
    db: Data<D>,
    claims: Claims,
    query: web::Query<YearQuery>,
) -> Result<HttpResponse, AppError> {
    claims.require_any(PAYROLL_OPERATORS)?;
    let company_id = claims.company_id;
    let year = query.year.unwrap_or_else(|| Utc::now().year());

    let report = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move { payroll::employer_cost_report(session, company_id, year).await })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(report)))
}
