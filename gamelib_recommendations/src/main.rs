use std::sync::Arc;

use actix_web::{App, HttpServer};
use anyhow::Context;
use opentelemetry::global;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::runtime::TokioCurrentThread;
use paperclip::actix::{web, OpenApiExt};
use tracing_actix_web::TracingLogger;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use gamelib_recommendations::app_config::config_app;
use gamelib_recommendations::batch_exporter::BatchExporter;
use gamelib_recommendations::recommendations_repository::{
    InMemoryRecommendationsRepository, PostgresRecommendationsRepository,
    RecommendationsRepository,
};
use gamelib_recommendations::settings::Settings;
use gamelib_repository::games_repository::{
    GamesRepository, InMemoryGamesRepository, PostgresGamesRepository,
};
use gamelib_repository::library_repository::{
    InMemoryLibraryRepository, LibraryRepository, PostgresLibraryRepository,
};

// Based on https://github.com/LukeMathWalker/tracing-actix-web/blob/main/examples/opentelemetry/src/main.rs#L15
fn init_telemetry() -> anyhow::Result<()> {
    let app_name = "gamelib_recommendations";

    // Start a new Jaeger trace pipeline.
    // Spans are exported in batch - recommended setup for a production application.
    global::set_text_map_propagator(TraceContextPropagator::new());
    #[allow(deprecated)]
    let tracer = opentelemetry_jaeger::new_agent_pipeline()
        .with_service_name(app_name)
        .install_batch(TokioCurrentThread)
        .context("Failed to install OpenTelemetry tracer.")?;

    // Filter based on level - trace, debug, info, warn, error
    // Tunable via `RUST_LOG` env variable
    let env_filter = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("info"));
    // Create a `tracing` layer using the Jaeger tracer
    let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);
    // Create a `tracing` layer to emit spans as structured logs to stdout
    let formatting_layer = BunyanFormattingLayer::new(app_name.into(), std::io::stdout);
    // Combined them all together in a `tracing` subscriber
    let subscriber = Registry::default()
        .with(env_filter)
        .with(telemetry)
        .with(JsonStorageLayer)
        .with(formatting_layer);
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install `tracing` subscriber.")
}

struct Repositories {
    games: Arc<dyn GamesRepository>,
    libraries: Arc<dyn LibraryRepository>,
    recommendations: Arc<dyn RecommendationsRepository>,
}

async fn init_repositories(settings: &Settings) -> anyhow::Result<Repositories> {
    if settings.use_in_memory_db {
        tracing::warn!("Using in memory repositories, the catalog and libraries start empty");
        return Ok(Repositories {
            games: Arc::new(InMemoryGamesRepository::default()),
            libraries: Arc::new(InMemoryLibraryRepository::default()),
            recommendations: Arc::new(InMemoryRecommendationsRepository::default()),
        });
    }

    let pg_config = settings.postgres_config();
    Ok(Repositories {
        games: Arc::new(
            PostgresGamesRepository::init(&pg_config)
                .await
                .context("Failed to init games repository")?,
        ),
        libraries: Arc::new(
            PostgresLibraryRepository::init(&pg_config)
                .await
                .context("Failed to init library repository")?,
        ),
        recommendations: Arc::new(
            PostgresRecommendationsRepository::init(&pg_config)
                .await
                .context("Failed to init recommendations repository")?,
        ),
    })
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_telemetry()?;
    let settings = Settings::load()?;
    let repositories = init_repositories(&settings).await?;

    let exporter = BatchExporter::new(
        repositories.games.clone(),
        repositories.libraries.clone(),
        repositories.recommendations.clone(),
        settings.recommender.clone(),
    );
    exporter.run().await.context("Recommendations batch failed")?;

    if !settings.serve_api {
        return Ok(());
    }

    tracing::info!("starting HTTP server at http://localhost:{}", settings.port);
    let recommendations_repository = repositories.recommendations.clone();
    HttpServer::new(move || {
        App::new()
            .wrap_api()
            .app_data(web::Data::new(recommendations_repository.clone()))
            .wrap(TracingLogger::default())
            .configure(config_app)
            .with_json_spec_at("/apispec/v2")
            .build()
    })
    .bind(("0.0.0.0", settings.port))?
    .run()
    .await?;
    Ok(())
}
