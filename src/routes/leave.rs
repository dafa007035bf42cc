use actix_web::web;

use crate::database::store::Database;
use crate::handlers::leave;

pub fn configure<D: Database>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/leave")
            .route("/types", web::get().to(leave::list_leave_types::<D>))
            .route("/types", web::post().to(leave::create_leave_type::<D>))
            .route("/allocations", web::get().to(leave::list_allocations::<D>))
            .route("/allocations", web::post().to(leave::create_allocation::<D>))
            .route("/allocations/me", web::get().to(leave::my_allocations::<D>))
            .route("/requests", web::get().to(leave::list_requests::<D>))
            .route("/requests", web::post().to(leave::create_request::<D>))
            .route(
                "/requests/{id}/approve",
                web::patch().to(leave::approve_request::<D>),
            )
            .route(
                "/requests/{id}/reject",
                web::patch().to(leave::reject_request::<D>),
            ),
    );
}
