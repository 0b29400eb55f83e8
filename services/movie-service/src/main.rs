use std::{process::ExitCode, sync::Arc};

use catalog_common::{bind_listener, init_tracing, shutdown_signal};
use movie_service::{
    app,
    config::ServiceConfig,
    db::PgMovieStore,
    error::StartupError,
    seed,
    state::AppState,
    store::{MemoryMovieStore, MovieStore},
};

#[tokio::main]
async fn main() -> ExitCode {
    let guards = init_tracing("movie-service");
    let config = ServiceConfig::from_env();
    tracing::info!(
        port = config.port,
        postgres = config.database_url.is_some(),
        seed_data = config.seed_data,
        file_logging = guards.writes_file(),
        "starting movie-service"
    );

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "movie-service stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ServiceConfig) -> Result<(), StartupError> {
    let store = build_store(&config).await?;
    if config.seed_data {
        seed::seed_movies(store.as_ref()).await?;
    }

    let app = app::build_router(AppState::new(store));
    let listener = bind_listener(config.port)
        .await
        .map_err(StartupError::Bind)?;
    tracing::info!(port = config.port, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)
}

async fn build_store(config: &ServiceConfig) -> Result<Arc<dyn MovieStore>, StartupError> {
    match config.database_url.as_deref() {
        Some(database_url) => {
            let store = PgMovieStore::connect(database_url).await?;
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, movies are kept in memory only");
            Ok(Arc::new(MemoryMovieStore::new()))
        }
    }
}
