use actix_web::{
    HttpResponse,
    web::{self, Data},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    config::Config,
    database::{store::Database, transaction},
    error::AppError,
    handlers::shared::{ApiResponse, DateQuery},
    services::{
        Claims, attendance,
        auth::ATTENDANCE_ADMINS,
        require_company_employee,
    },
};

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl RangeQuery {
    /// `from` defaults to today and `to` to `from`.
    fn resolve(&self) -> (NaiveDate, NaiveDate) {
        let from = self.from.unwrap_or_else(|| Utc::now().date_naive());
        (from, self.to.unwrap_or(from))
    }
}

/// Clock in for the caller's own employee profile
pub async fn check_in<D: Database>(
    db: Data<D>,
    claims: Claims,
    query: web::Query<DateQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = claims.require_employee()?;
    let company_id = claims.company_id;
    let date = query.or_today();
    let now = Utc::now();

    let record = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move {
            require_company_employee(session, company_id, employee_id).await?;
            attendance::check_in(session, employee_id, date, now).await
        })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(record)))
}

/// Clock out for the caller's own employee profile
pub async fn check_out<D: Database>(
    db: Data<D>,
    config: Data<Config>,
    claims: Claims,
    query: web::Query<DateQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = claims.require_employee()?;
    let company_id = claims.company_id;
    let date = query.or_today();
    let now = Utc::now();
    let expected_daily_hours = config.expected_daily_hours;

    let record = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move {
            require_company_employee(session, company_id, employee_id).await?;
            attendance::check_out(session, employee_id, date, now, expected_daily_hours).await
        })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(record)))
}

pub async fn my_attendance<D: Database>(
    db: Data<D>,
    claims: Claims,
    query: web::Query<RangeQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = claims.require_employee()?;
    range_for(db, claims.company_id, employee_id, query.resolve()).await
}

/// Attendance of one employee; admin/hr or the employee themself
pub async fn employee_attendance<D: Database>(
    db: Data<D>,
    claims: Claims,
    path: web::Path<Uuid>,
    query: web::Query<RangeQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();
    if claims.employee_id != Some(employee_id) {
        claims.require_any(ATTENDANCE_ADMINS)?;
    }
    range_for(db, claims.company_id, employee_id, query.resolve()).await
}

async fn range_for<D: Database>(
    db: Data<D>,
    company_id: Uuid,
    employee_id: Uuid,
    (from, to): (NaiveDate, NaiveDate),
) -> Result<HttpResponse, AppError> {
    let range = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move {
            attendance::attendance_range(session, company_id, employee_id, from, to).await
        })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(range)))
}

pub async fn roster<D: Database>(
    db: Data<D>,
    claims: Claims,
    query: web::Query<DateQuery>,
) -> Result<HttpResponse, AppError> {
    claims.require_any(ATTENDANCE_ADMINS)?;
    let company_id = claims.company_id;
    let date = query.or_today();

    let entries = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move { attendance::roster(session, company_id, date).await })
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(entries)))
}

/// Mark absences for a date (defaults to today)
pub async fn mark_absents<D: Database>(
    db: Data<D>,
    claims: Claims,
    query: web::Query<DateQuery>,
) -> Result<HttpResponse, AppError> {
    claims.require_any(ATTENDANCE_ADMINS)?;
    let company_id = claims.company_id;
    let date = query.or_today();

    let marking = transaction::run(db.get_ref(), move |session| {
        Box::pin(async move { attendance::mark_absent(session, company_id, date).await })
    })
    .await
    .map_err(|err| {
        log::error!("Error marking absences for {}: {}", date, err);
        err
    })?;

    log::info!(
        "Absences for {} marked by user {} ({} rows)",
        date,
        claims.user_id(),
        marking.marked_absent
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(marking)))
}
