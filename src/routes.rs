use crate::{
    api::{export, reference, stats, time_entry, user},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = 60_000 / requests_per_min as u64;

    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms.max(1))
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // extractor failures answer with the same {"error": ...} body as handlers
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::bad_request(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::bad_request(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::bad_request(err.to_string()).into()),
    );

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(web::resource("/me").route(web::get().to(handlers::me)))
            .service(
                web::resource("/users")
                    .route(web::get().to(user::list_users))
                    .route(web::post().to(user::create_user)),
            )
            .service(
                web::resource("/projects")
                    .route(web::get().to(reference::list_reference))
                    .route(web::post().to(reference::create_project)),
            )
            .service(
                web::resource("/activities").route(web::post().to(reference::create_activity)),
            )
            .service(
                web::scope("/time-entries")
                    // /time-entries
                    .service(
                        web::resource("")
                            .route(web::get().to(time_entry::list_entries))
                            .route(web::post().to(time_entry::create_entry)),
                    )
                    // /time-entries/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(time_entry::get_entry))
                            .route(web::put().to(time_entry::update_entry))
                            .route(web::delete().to(time_entry::delete_entry)),
                    ),
            )
            .service(
                web::scope("/stats")
                    .service(web::resource("/dashboard").route(web::get().to(stats::dashboard)))
                    .service(web::resource("/team").route(web::get().to(stats::team))),
            )
            .service(web::resource("/export").route(web::get().to(export::export_xlsx))),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh_token
//       └─ returns new access_token + rotated refresh_token
