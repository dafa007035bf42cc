use actix_web::{
    HttpResponse,
    web::{self, Data},
};
use uuid::Uuid;

use crate::{
    database::{
        models::{SalaryComponentInput, SalaryComponentPatch, SalaryStructureInput},
        store::Database,
        transaction,
    },
    error::AppError,
    handlers::shared::ApiResponse,
    services::{Claims, auth::SALARY_MANAGERS, salary},
};

/// The caller's own structure and components
pub async fn my_salary<D: Database>(
    db: Data<D>,
    claims: Claims,
) -> Result<HttpResponse, AppError> {
    let employee_id = claims.require_employee()?;
    let company_id = claims.company_id;

    let overview = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move { salary::overview(session, company_id, employee_id).await })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(overview)))
}

pub async fn list_structures<D: Database>(
    db: Data<D>,
    claims: Claims,
) -> Result<HttpResponse, AppError> {
    claims.require_any(SALARY_MANAGERS)?;
    let company_id = claims.company_id;

    let structures = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move { salary::list_structures(session, company_id).await })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(structures)))
}

pub async fn employee_salary<D: Database>(
    db: Data<D>,
    claims: Claims,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    claims.require_any(SALARY_MANAGERS)?;
    let employee_id = path.into_inner();
    let company_id = claims.company_id;

    let overview = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move { salary::overview(session, company_id, employee_id).await })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(overview)))
}

pub async fn upsert_structure<D: Database>(
    db: Data<D>,
    claims: Claims,
    path: web::Path<Uuid>,
    input: web::Json<SalaryStructureInput>,
) -> Result<HttpResponse, AppError> {
    claims.require_any(SALARY_MANAGERS)?;
    let employee_id = path.into_inner();
    let company_id = claims.company_id;
    let input = input.into_inner();

    let structure = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move {
            salary::upsert_structure(session, company_id, employee_id, input).await
        })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(structure)))
}

pub async fn add_component<D: Database>(
    db: Data<D>,
    claims: Claims,
    path: web::Path<Uuid>,
    input: web::Json<SalaryComponentInput>,
) -> Result<HttpResponse, AppError> {
    claims.require_any(SALARY_MANAGERS)?;
    let employee_id = path.into_inner();
    let company_id = claims.company_id;
    let input = input.into_inner();

    let component = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move { salary::add_component(session, company_id, employee_id, input).await })
    })
    .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(component)))
}

pub async fn update_component<D: Database>(
    db: Data<D>,
    claims: Claims,
    path: web::Path<(Uuid, Uuid)>,
    patch: web::Json<SalaryComponentPatch>,
) -> Result<HttpResponse, AppError> {
    claims.require_any(SALARY_MANAGERS)?;
    let (employee_id, component_id) = path.into_inner();
    let company_id = claims.company_id;
    let patch = patch.into_inner();

    let component = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move {
            salary::update_component(session, company_id, employee_id, component_id, patch)
                .await
        })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(component)))
}

pub async fn delete_component<D: Database>(
    db: Data<D>,
    claims: Claims,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    claims.require_any(SALARY_MANAGERS)?;
    let (employee_id, component_id) = path.into_inner();
    let company_id = claims.company_id;

    transaction::run(db.get_ref(), move |session| {
        Box::pin(async move {
            salary::delete_component(session, company_id, employee_id, component_id).await
        })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        None,
        "Salary component deleted",
    )))
}
