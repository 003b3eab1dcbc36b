use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use once_cell::sync::Lazy;
use portfolio_experience::{
    constants::START_TIME,
    graceful_shutdown::stop_on_signal,
    routes::configure_routes,
    settings::{AppConfig, LogFormat},
    telemetry::init_tracing,
    web::build_cors,
    AppState,
};
use tracing_actix_web::TracingLogger;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match AppConfig::new() {
        Ok(cfg) => cfg,
        Err(e) => {
            init_tracing(LogFormat::Pretty);
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.log_format);
    Lazy::force(&START_TIME);
    tracing::info!("Loaded configuration: {:?}", config);

    let app_state = match AppState::connect(&config).await {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            tracing::error!("Failed to initialise storage: {}", e);
            std::process::exit(1);
        }
    };

    let server_addr = config.server_addr();
    let cors_origins = config.cors_origins();

    tracing::info!(
        "🚀 Starting {} v{} on {} ({} storage)",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr,
        config.storage
    );

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(build_cors(&cors_origins))
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .workers(config.worker_count)
    .bind(server_addr)?
    .run();

    tokio::spawn(stop_on_signal(server.handle()));

    server.await
}
