use actix_web::web;

use crate::database::store::Database;

pub mod attendance;
pub mod leave;
pub mod payroll;
pub mod salary;

pub fn configure<D: Database>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(attendance::configure::<D>)
            .configure(leave::configure::<D>)
            .configure(salary::configure::<D>)
            .configure(payroll::configure::<D>),
    );
}
