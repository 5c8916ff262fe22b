use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

mod api;
mod auth;
mod clock;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod service;
mod store;
mod utils;

use config::Config;
use db::init_db;

use crate::clock::SystemClock;
use crate::docs::ApiDoc;
use crate::service::PresenceService;
use crate::store::mysql::MySqlStore;
use crate::utils::user_cache::CachedUserDirectory;
use tracing::info;
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const USER_CACHE_CAPACITY: u64 = 50_000;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(EnvFilter::new(&config.log_level))
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to connect to database")?;

    let store = Arc::new(MySqlStore::new(pool));
    let users = Arc::new(CachedUserDirectory::new(
        store.clone(),
        USER_CACHE_CAPACITY,
        Duration::from_secs(config.user_cache_ttl_secs),
    ));
    let service = Data::new(PresenceService::new(store, users, Arc::new(SystemClock)));

    let limiter = Arc::new(
        routes::build_limiter(config.rate_protected_per_min)
            .context("Invalid rate limit configuration")?,
    );

    let server_addr = config.server_addr.clone();
    let config_data = Data::new(config.clone());

    info!(addr = %server_addr, prefix = %config.api_prefix, "Listening");

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(config_data.clone())
            .app_data(service.clone())
            .configure(|cfg| routes::configure(cfg, &config.api_prefix, limiter.clone()))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
