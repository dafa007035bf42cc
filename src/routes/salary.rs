use actix_web::web;

use crate::database::store::Database;
use crate::handlers::salary;

pub fn configure<D: Database>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/salary")
            .route("/me", web::get().to(salary::my_salary::<D>))
            .route("/structures", web::get().to(salary::list_structures::<D>))
            .route(
                "/employees/{employee_id}",
                web::get().to(salary::employee_salary::<D>),
            )
            .route(
                "/employees/{employee_id}/structure",
                web::put().to(salary::upsert_structure::<D>),
            )
            .route(
                "/employees/{employee_id}/components",
                web::post().to(salary::add_component::<D>),
            )
            .service(
                web::resource("/employees/{employee_id}/components/{component_id}")
                    .route(web::patch().to(salary::update_component::<D>))
                    .route(web::delete().to(salary::delete_component::<D>)),
            ),
    );
}
