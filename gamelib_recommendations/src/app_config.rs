use paperclip::actix::web;

use crate::handlers;

/// Read-only surface over the last exported recommendation set
pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(
            web::scope("/api").service(
                web::resource("/recommendations/{user_id}")
                    .route(web::get().to(handlers::get_recommendations_for_user)),
            ),
        );
}
