use crate::{
    api::{self, employee, leave_application, leave_type, organization},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

/// Per-IP limiter allowing `requests_per_min` with an equal burst.
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("period and burst size are non-zero");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    // Public routes
    cfg.route("/health", web::get().to(api::health));

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(build_limiter(config.rate_protected_per_min)) // rate limiting
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_application::list_leaves))
                            .route(web::post().to(leave_application::submit_leave)),
                    )
                    // fixed segments before /leave/{id}
                    .service(
                        web::resource("/mine").route(web::get().to(leave_application::my_leaves)),
                    )
                    .service(
                        web::resource("/duration")
                            .route(web::get().to(leave_application::leave_duration)),
                    )
                    // /leave/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(leave_application::get_leave))
                            .route(web::put().to(leave_application::update_leave)),
                    )
                    .service(
                        web::resource("/{id}/receive")
                            .route(web::put().to(leave_application::receive_leave)),
                    )
                    .service(
                        web::resource("/{id}/request-documents")
                            .route(web::put().to(leave_application::request_documents)),
                    )
                    .service(
                        web::resource("/{id}/ready")
                            .route(web::put().to(leave_application::mark_ready)),
                    )
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_application::approve_leave)),
                    )
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_application::reject_leave)),
                    )
                    .service(
                        web::resource("/{id}/cancel")
                            .route(web::put().to(leave_application::cancel_leave)),
                    )
                    .service(
                        web::resource("/{id}/protocol")
                            .route(web::put().to(leave_application::assign_protocol)),
                    ),
            )
            .service(
                web::scope("/leave-types")
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_type::list_leave_types))
                            .route(web::post().to(leave_type::create_leave_type)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(leave_type::get_leave_type))
                            .route(web::put().to(leave_type::update_leave_type))
                            .route(web::delete().to(leave_type::delete_leave_type)),
                    ),
            )
            .service(
                web::scope("/organizations")
                    .service(
                        web::resource("")
                            .route(web::get().to(organization::list_organizations))
                            .route(web::post().to(organization::create_organization)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(organization::get_organization))
                            .route(web::put().to(organization::update_organization))
                            .route(web::delete().to(organization::delete_organization)),
                    ),
            )
            .service(
                web::scope("/employees")
                    .service(
                        web::resource("")
                            .route(web::get().to(employee::list_employees))
                            .route(web::post().to(employee::create_employee)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_accepts_zero_rate() {
        // must not panic
        let _ = build_limiter(0);
        let _ = build_limiter(1000);
        let _ = build_limiter(120_000);
    }
}
