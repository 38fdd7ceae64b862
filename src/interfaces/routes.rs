use actix_web::web;

use crate::handlers::system::health_check;

mod contact;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check);

    cfg.service(
        web::scope("/api")
            .configure(contact::config_routes)
    );
}
