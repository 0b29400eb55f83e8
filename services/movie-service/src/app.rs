use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    create_movie, delete_movie, get_movie, healthz, list_movies, readyz, update_movie,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/movies", get(list_movies).post(create_movie))
        .route("/movies/:id", get(get_movie).put(update_movie).delete(delete_movie))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
