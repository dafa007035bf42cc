use actix_web::web;

use crate::database::store::Database;
use crate::handlers::attendance;

pub fn configure<D: Database>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/attendance")
            .route("/check-in", web::post().to(attendance::check_in::<D>))
            .route("/check-out", web::post().to(attendance::check_out::<D>))
            .route("/me", web::get().to(attendance::my_attendance::<D>))
            .route("/roster", web::get().to(attendance::roster::<D>))
            .route(
                "/mark-absents",
                web::post().to(attendance::mark_absents::<D>),
            )
            .route(
                "/employees/{employee_id}",
                web::get().to(attendance::employee_attendance::<D>),
            ),
    );
}
