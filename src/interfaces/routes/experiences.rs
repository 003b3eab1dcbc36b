use actix_web::web;

use crate::handlers::experiences;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/experiences")
            .service(
                web::resource("")
                    .route(web::get().to(experiences::get_all_experiences))
                    .route(web::post().to(experiences::store_experience))
                    .route(web::delete().to(experiences::delete_experiences))
            )
            // Registered before `/{id}` so "paginate" is not taken as an id.
            .service(
                web::resource("/paginate")
                    .route(web::get().to(experiences::paginate_experiences))
            )
            .service(
                web::resource("/{experience_id}")
                    .route(web::get().to(experiences::get_experience))
            )
    );
}
