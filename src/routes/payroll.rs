use actix_web::web;

use crate::database::store::Database;
use crate::handlers::payroll;

pub fn configure<D: Database>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payroll")
            .route("/payruns", web::post().to(payroll::create_payrun::<D>))
            .route("/payruns", web::get().to(payroll::list_payruns::<D>))
            .route("/payruns/{id}", web::get().to(payroll::get_payrun::<D>))
            .route(
                "/payruns/{id}/payslips",
                web::get().to(payroll::list_payrun_payslips::<D>),
            )
            .route(
                "/payruns/{id}/validate",
                web::post().to(payroll::validate_payrun::<D>),
            )
            .route(
                "/payruns/{id}/reaggregate",
                web::post().to(payroll::reaggregate_payrun::<D>),
            )
            .route("/payslips/{id}", web::get().to(payroll::get_payslip::<D>))
            .route(
                "/payslips/{id}/validate",
                web::post().to(payroll::validate_payslip::<D>),
            )
            .route(
                "/payslips/{id}/cancel",
                web::post().to(payroll::cancel_payslip::<D>),
            )
            .route(
                "/payslips/{id}/recompute",
                web::patch().to(payroll::recompute_payslip::<D>),
            )
            .route("/me/payslips", web::get().to(payroll::my_payslips::<D>))
            .route(
                "/metrics/employer-cost",
                web::get().to(payroll::employer_cost::<D>),
            ),
    );
}
