//! PDRE Server - recreational carrying capacity of protected areas

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use pdre_server::{
    api,
    config::{AppConfig, LoggingConfig},
    repository::Repository,
    services::{redis::RedisService, Services},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    init_tracing(&config.logging);

    tracing::info!("Starting PDRE Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    let redis_service = RedisService::new(&config.redis.url)
        .await
        .expect("Failed to connect to Redis");

    tracing::info!("Connected to Redis");

    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, config.calculation.clone(), redis_service)
        .await
        .expect("Failed to create services");

    tracing::info!(
        method = %config.calculation.method,
        serialize_runs = config.calculation.serialize_runs,
        "Calculation engine ready"
    );

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = create_router(state);

    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Console output in `pretty` or `json` format, plus daily JSON files when a
/// log directory is configured
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("pdre_server={},tower_http=debug", logging.level).into());

    let json = logging.format.eq_ignore_ascii_case("json");
    let console_json = json.then(|| fmt::layer().json());
    let console_pretty = (!json).then(|| fmt::layer());
    let file = logging.directory.as_ref().map(|dir| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(tracing_appender::rolling::daily(dir, "pdre-server.log"))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_json)
        .with(console_pretty)
        .with(file)
        .init();
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Protected areas
        .route(
            "/protected-areas",
            get(api::protected_areas::list_areas).post(api::protected_areas::create_area),
        )
        .route(
            "/protected-areas/:id",
            get(api::protected_areas::get_area)
                .put(api::protected_areas::update_area)
                .delete(api::protected_areas::delete_area),
        )
        .route(
            "/protected-areas/:id/tourism-objects",
            get(api::protected_areas::list_area_objects),
        )
        .route(
            "/protected-areas/:id/calculations",
            get(api::protected_areas::list_area_calculations),
        )
        .route(
            "/protected-areas/:id/calculate",
            post(api::protected_areas::calculate_area),
        )
        .route(
            "/protected-areas/:id/quick-calculate",
            post(api::protected_areas::quick_calculate),
        )
        // Tourism objects
        .route(
            "/tourism-objects",
            get(api::tourism_objects::list_objects).post(api::tourism_objects::create_object),
        )
        .route(
            "/tourism-objects/:id",
            get(api::tourism_objects::get_object)
                .put(api::tourism_objects::update_object)
                .delete(api::tourism_objects::delete_object),
        )
        .route(
            "/tourism-objects/:id/recalculate",
            post(api::tourism_objects::recalculate_object),
        )
        // Limiting factors
        .route(
            "/limiting-factors",
            get(api::limiting_factors::list_factors).post(api::limiting_factors::create_factor),
        )
        .route(
            "/limiting-factors/:id",
            get(api::limiting_factors::get_factor)
                .put(api::limiting_factors::update_factor)
                .delete(api::limiting_factors::delete_factor),
        )
        // Calculation results
        .route("/calculations/:id", get(api::calculations::get_calculation))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
}
