use actix_web::{
    HttpResponse,
    web::{self, Data},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    database::{
        models::{LeaveAllocationInput, LeaveRequestFilter, LeaveRequestInput, LeaveTypeInput},
        store::Database,
        transaction,
    },
    error::AppError,
    handlers::shared::ApiResponse,
    services::{
        Claims, leave,
        auth::{LEAVE_ADMINS, LEAVE_REVIEWERS},
    },
};

pub async fn list_leave_types<D: Database>(
    db: Data<D>,
    _claims: Claims,
) -> Result<HttpResponse, AppError> {
    let types = transaction::run(db.get_ref(), |session| {
        Box::pin(async move { leave::list_leave_types(session).await })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(types)))
}

pub async fn create_leave_type<D: Database>(
    db: Data<D>,
    claims: Claims,
    input: web::Json<LeaveTypeInput>,
) -> Result<HttpResponse, AppError> {
    claims.require_any(LEAVE_ADMINS)?;
    let input = input.into_inner();

    let leave_type = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move { leave::create_leave_type(session, input).await })
    })
    .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(leave_type)))
}

pub async fn create_allocation<D: Database>(
    db: Data<D>,
    claims: Claims,
    input: web::Json<LeaveAllocationInput>,
) -> Result<HttpResponse, AppError> {
    claims.require_any(LEAVE_ADMINS)?;
    let company_id = claims.company_id;
    let created_by = claims.user_id();
    let input = input.into_inner();

    let allocation = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move { leave::create_allocation(session, company_id, created_by, input).await })
    })
    .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(allocation)))
}

#[derive(Debug, Deserialize)]
pub struct AllocationQuery {
    pub employee_id: Option<Uuid>,
}

pub async fn list_allocations<D: Database>(
    db: Data<D>,
    claims: Claims,
    query: web::Query<AllocationQuery>,
) -> Result<HttpResponse, AppError> {
    claims.require_any(LEAVE_ADMINS)?;
    allocations_for(db, claims.company_id, query.employee_id).await
}

pub async fn my_allocations<D: Database>(
    db: Data<D>,
    claims: Claims,
) -> Result<HttpResponse, AppError> {
    let employee_id = claims.require_employee()?;
    allocations_for(db, claims.company_id, Some(employee_id)).await
}

async fn allocations_for<D: Database>(
    db: Data<D>,
    company_id: Uuid,
    employee_id: Option<Uuid>,
) -> Result<HttpResponse, AppError> {
    let allocations = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move { leave::list_allocations(session, company_id, employee_id).await })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(allocations)))
}

/// File a leave request. Admin/hr may file on behalf of another employee;
/// everyone else files for themselves.
pub async fn create_request<D: Database>(
    db: Data<D>,
    claims: Claims,
    input: web::Json<LeaveRequestInput>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();
    let employee_id = match input.employee_id {
        Some(employee_id) if claims.employee_id != Some(employee_id) => {
            claims.require_any(LEAVE_ADMINS)?;
            employee_id
        }
        _ => claims.require_employee()?,
    };
    let company_id = claims.company_id;

    let request = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move { leave::create_request(session, company_id, employee_id, input).await })
    })
    .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(request)))
}

/// Reviewers see the whole company; other callers only their own requests.
pub async fn list_requests<D: Database>(
    db: Data<D>,
    claims: Claims,
    query: web::Query<LeaveRequestFilter>,
) -> Result<HttpResponse, AppError> {
    let mut filter = query.into_inner();
    if !claims.has_any_role(LEAVE_REVIEWERS) {
        filter.employee_id = Some(claims.require_employee()?);
    }
    let company_id = claims.company_id;

    let requests = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move { leave::list_requests(session, company_id, filter).await })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(requests)))
}

pub async fn approve_request<D: Database>(
    db: Data<D>,
    claims: Claims,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    claims.require_any(LEAVE_REVIEWERS)?;
    let request_id = path.into_inner();
    let company_id = claims.company_id;
    let reviewer = claims.user_id();

    let approval = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move { leave::approve(session, company_id, request_id, reviewer).await })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        Some(approval),
        "Leave request approved",
    )))
}

pub async fn reject_request<D: Database>(
    db: Data<D>,
    claims: Claims,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    claims.require_any(LEAVE_REVIEWERS)?;
    let request_id = path.into_inner();
    let company_id = claims.company_id;
    let reviewer = claims.user_id();

    let request = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move { leave::reject(session, company_id, request_id, reviewer).await })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        Some(request),
        "Leave request rejected",
    )))
}
