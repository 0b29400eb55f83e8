use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::catalog;
use crate::error::{CatalogError, ServiceError};
use crate::models::{ListParams, MovieForm, UpdateMovieRequest};
use crate::service;
use crate::state::AppState;

/// Ids that do not parse name no movie at all.
fn movie_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ServiceError> {
    match path {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable movie id");
            Err(ServiceError::from(CatalogError::NotFound))
        }
    }
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ServiceError> {
    body.map(|Json(payload)| payload).map_err(ServiceError::from)
}

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    match state.store.count_movies().await {
        Ok(_) => StatusCode::OK,
        Err(err) => {
            tracing::warn!(error = %err, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

pub async fn list_movies(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let genre = params.movie_genre.as_deref();
    let search = params.search_string.as_deref();
    match catalog::assemble(state.store.as_ref(), genre, search).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => ServiceError::from(err).into_response(),
    }
}

pub async fn get_movie(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> impl IntoResponse {
    let id = match movie_id(path) {
        Ok(id) => id,
        Err(err) => return err.into_response(),
    };
    match service::get_movie(state.store.as_ref(), id).await {
        Ok(Some(movie)) => (StatusCode::OK, Json(movie)).into_response(),
        Ok(None) => ServiceError::from(CatalogError::NotFound).into_response(),
        Err(err) => ServiceError::from(err).into_response(),
    }
}

pub async fn create_movie(
    State(state): State<AppState>,
    body: Result<Json<MovieForm>, JsonRejection>,
) -> impl IntoResponse {
    let payload = match json_body(body) {
        Ok(payload) => payload,
        Err(err) => return err.into_response(),
    };
    match service::create_movie(state.store.as_ref(), &payload).await {
        Ok(movie) => (StatusCode::CREATED, Json(movie)).into_response(),
        Err(err) => ServiceError::from(err).into_response(),
    }
}

pub async fn update_movie(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateMovieRequest>, JsonRejection>,
) -> impl IntoResponse {
    let id = match movie_id(path) {
        Ok(id) => id,
        Err(err) => return err.into_response(),
    };
    let payload = match json_body(body) {
        Ok(payload) => payload,
        Err(err) => return err.into_response(),
    };
    match service::update_movie(state.store.as_ref(), id, &payload).await {
        Ok(movie) => (StatusCode::OK, Json(movie)).into_response(),
        Err(err) => ServiceError::from(err).into_response(),
    }
}

pub async fn delete_movie(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> impl IntoResponse {
    // Nothing to delete under an unreadable id.
    let Ok(Path(id)) = path else {
        return StatusCode::NO_CONTENT.into_response();
    };
    match service::delete_movie(state.store.as_ref(), id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => ServiceError::from(err).into_response(),
    }
}
