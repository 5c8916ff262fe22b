use crate::{api::presence, auth::middleware::auth_middleware, error::AppError};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub type Limiter = Governor<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiter allowing `requests_per_min` with an equal burst.
pub fn build_limiter(requests_per_min: u32) -> Option<Limiter> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()?;
    Some(Governor::new(&cfg))
}

/// Maps malformed JSON bodies, query strings and path segments to `InvalidInput`.
pub fn input_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
    );
}

pub fn presence_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/presence")
            // /presence
            .service(web::resource("").route(web::post().to(presence::record_presence)))
            // /presence/history?user_id=
            .service(web::resource("/history").route(web::get().to(presence::history)))
            // /presence/history/{user_id}
            .service(
                web::resource("/history/{user_id}")
                    .route(web::get().to(presence::history_by_user_id)),
            )
            // /presence/summary/{user_id}
            .service(
                web::resource("/summary/{user_id}").route(web::get().to(presence::monthly_summary)),
            )
            // /presence/analysis
            .service(
                web::resource("/analysis").route(web::post().to(presence::analyze_presence)),
            ),
    );
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, limiter: Arc<Limiter>) {
    cfg.configure(input_configs);

    // Protected routes
    cfg.service(
        web::scope(api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(limiter) // rate limiting
            .configure(presence_routes),
    );
}

// API REQUEST
//  └─ Authorization: Bearer access_token   (issued by the identity provider)
//       └─ auth_middleware → Actor in request extensions
//            └─ handler → PresenceService(actor, ...)
