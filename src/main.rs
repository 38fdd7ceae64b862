use std::time::Duration;

use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use contact_relay::{
    background_task::start_purge_task,
    constants::{MEMORY_STORE_PURGE_SECS, START_TIME},
    db::redis_pool::create_pool,
    graceful_shutdown::shutdown_signal,
    routes::configure_routes,
    settings::AppConfig, AppState
};
use once_cell::sync::Lazy;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    Lazy::force(&START_TIME);

    let config = match AppConfig::new() {
        Ok(cfg) => {
            init_tracing(cfg.is_production());
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        },
        Err(e) => {
            init_tracing(false);
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let redis_pool = match config.redis_url.as_deref() {
        Some(url) => Some(create_pool(url).await?),
        None => {
            if config.is_production() {
                tracing::warn!("APP_REDIS_URL not set; rate limits are per-process and reset on restart");
            }
            None
        }
    };

    let app_state = web::Data::new(AppState::new(&config, redis_pool)?);

    if let Some(memory_repo) = app_state.contact_handler.rate_limit_repo.as_memory() {
        tokio::spawn(start_purge_task(
            memory_repo.clone(),
            Duration::from_secs(MEMORY_STORE_PURGE_SECS),
        ));
    }

    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .workers(config.worker_count)
    .bind(server_addr)?
    .run();

    tokio::select! {
        res = server => res?,
        _ = shutdown_signal() => {},
    }

    Ok(())
}
