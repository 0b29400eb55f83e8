use std::sync::Arc;

use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use movie_service::app::build_router;
use movie_service::error::StoreError;
use movie_service::models::{Movie, MovieDraft, MovieListView};
use movie_service::seed::seed_movies;
use movie_service::state::AppState;
use movie_service::store::{MemoryMovieStore, MovieStore};
use tower::ServiceExt;

/// Every call fails the way a dropped database connection does.
struct OfflineStore;

fn offline<T>() -> Result<T, StoreError> {
    Err(StoreError::Unavailable("db error: connection closed".to_string()))
}

#[async_trait::async_trait]
impl MovieStore for OfflineStore {
    async fn list_movies(&self) -> Result<Vec<Movie>, StoreError> {
        offline()
    }

    async fn get_movie(&self, _id: i64) -> Result<Option<Movie>, StoreError> {
        offline()
    }

    async fn insert_movie(&self, _draft: &MovieDraft) -> Result<Movie, StoreError> {
        offline()
    }

    async fn update_movie(
        &self,
        _id: i64,
        _expected_version: i64,
        _draft: &MovieDraft,
    ) -> Result<Option<Movie>, StoreError> {
        offline()
    }

    async fn delete_movie(&self, _id: i64) -> Result<bool, StoreError> {
        offline()
    }

    async fn movie_exists(&self, _id: i64) -> Result<bool, StoreError> {
        offline()
    }

    async fn count_movies(&self) -> Result<u64, StoreError> {
        offline()
    }
}

fn app() -> Router {
    build_router(AppState::new(Arc::new(MemoryMovieStore::new())))
}

async fn seeded_app() -> Router {
    let store = Arc::new(MemoryMovieStore::new());
    seed_movies(store.as_ref()).await.unwrap();
    build_router(AppState::new(store))
}

fn error_fields(body: &serde_json::Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|error| error["field"].as_str().unwrap().to_string())
        .collect()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn delete(uri: &str) -> Request<String> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- health ---

#[tokio::test]
async fn health_and_readiness() {
    let resp = app().oneshot(get("/healthz")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = app().oneshot(get("/readyz")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// --- list ---

#[tokio::test]
async fn list_empty_store() {
    let resp = app().oneshot(get("/movies")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let view: MovieListView = body_json(resp).await;
    assert!(view.movies.is_empty());
    assert!(view.genres.is_empty());
    assert!(view.movie_genre.is_none());
}

#[tokio::test]
async fn list_filters_by_genre_but_keeps_all_genres() {
    let resp = seeded_app()
        .await
        .oneshot(get("/movies?movieGenre=Comedy&searchString="))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let view: MovieListView = body_json(resp).await;
    let titles: Vec<_> = view.movies.iter().map(|movie| movie.title.as_str()).collect();
    assert_eq!(titles, vec!["Ghostbusters", "Ghostbusters 2"]);
    assert_eq!(view.genres, vec!["Comedy", "Romantic Comedy", "Western"]);
    assert_eq!(view.movie_genre.as_deref(), Some("Comedy"));
}

#[tokio::test]
async fn list_search_is_case_insensitive() {
    let resp = seeded_app()
        .await
        .oneshot(get("/movies?searchString=RIO"))
        .await
        .unwrap();
    let view: MovieListView = body_json(resp).await;
    assert_eq!(view.movies.len(), 1);
    assert_eq!(view.movies[0].title, "Rio Bravo");
    assert_eq!(view.genres.len(), 3);
    assert_eq!(view.search_string.as_deref(), Some("RIO"));
}

#[tokio::test]
async fn list_decodes_spaces_in_genre() {
    let resp = seeded_app()
        .await
        .oneshot(get("/movies?movieGenre=Romantic%20Comedy"))
        .await
        .unwrap();
    let view: MovieListView = body_json(resp).await;
    assert_eq!(view.movies.len(), 1);
    assert_eq!(view.movies[0].title, "When Harry Met Sally");
}

// --- create ---

#[tokio::test]
async fn create_returns_201_with_assigned_id() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/movies",
            r#"{"title":"Heat","release_date":"1995-12-15","genre":"Crime","price":"9.49","rating":"R"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let movie: Movie = body_json(resp).await;
    assert!(movie.id > 0);
    assert_eq!(movie.title, "Heat");
    assert_eq!(movie.price.to_string(), "9.49");
    assert_eq!(movie.version, 1);
}

#[tokio::test]
async fn create_reports_every_invalid_field() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/movies",
            r#"{"title":"","release_date":"yesterday","price":"-3"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["code"], "validation_failed");
    assert_eq!(error_fields(&body), vec!["title", "release_date", "price"]);
}

#[tokio::test]
async fn create_with_wrongly_typed_field_lists_it_among_field_errors() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/movies",
            r#"{"title":"","release_date":"1984-03-13","price":true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["code"], "validation_failed");
    assert_eq!(error_fields(&body), vec!["title", "price"]);
}

#[tokio::test]
async fn create_with_out_of_range_date_is_a_field_error() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/movies",
            r#"{"title":"Nul\u0000","release_date":"-5000-01-01","price":"1"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(error_fields(&body), vec!["title", "release_date"]);
}

#[tokio::test]
async fn create_with_malformed_json_is_invalid_body() {
    let resp = app()
        .oneshot(json_request("POST", "/movies", r#"{"title":"Heat","#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["code"], "invalid_body");
}

// --- details ---

#[tokio::test]
async fn get_unknown_movie_returns_404() {
    let resp = app().oneshot(get("/movies/42")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn get_non_numeric_id_returns_404() {
    let resp = seeded_app().await.oneshot(get("/movies/abc")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["code"], "not_found");
}

// --- update ---

#[tokio::test]
async fn update_with_mismatched_body_id_returns_404() {
    let resp = seeded_app()
        .await
        .oneshot(json_request(
            "PUT",
            "/movies/1",
            r#"{"id":2,"version":1,"title":"X","release_date":"2000-01-01","price":"1"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_without_version_is_a_field_error() {
    let resp = seeded_app()
        .await
        .oneshot(json_request(
            "PUT",
            "/movies/1",
            r#"{"id":1,"title":"X","release_date":"2000-01-01","price":"1"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["code"], "validation_failed");
    assert_eq!(error_fields(&body), vec!["version"]);
}

#[tokio::test]
async fn update_of_non_numeric_id_returns_404() {
    let resp = seeded_app()
        .await
        .oneshot(json_request(
            "PUT",
            "/movies/abc",
            r#"{"id":1,"version":1,"title":"X","release_date":"2000-01-01","price":"1"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_of_deleted_movie_returns_404() {
    let resp = app()
        .oneshot(json_request(
            "PUT",
            "/movies/5",
            r#"{"id":5,"version":1,"title":"Gone","release_date":"2000-01-01","price":"1"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- delete ---

#[tokio::test]
async fn delete_unknown_movie_is_204() {
    let resp = app().oneshot(delete("/movies/77")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = app().oneshot(delete("/movies/abc")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

// --- store outage ---

#[tokio::test]
async fn list_with_unavailable_store_returns_503() {
    let app = build_router(AppState::new(Arc::new(OfflineStore)));
    let resp = app.oneshot(get("/movies?searchString=rio")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["code"], "store_unavailable");
    assert_eq!(body["message"], "service unavailable");
}

// --- full lifecycle ---

#[tokio::test]
async fn crud_lifecycle_with_stale_edit() {
    let app = app();

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/movies",
            r#"{"title":"Ghostbusters","release_date":"1984-03-13","genre":"Comedy","price":8.99,"rating":"R"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Movie = body_json(resp).await;
    let id = created.id;

    let resp = app.clone().oneshot(get(&format!("/movies/{id}"))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let loaded: Movie = body_json(resp).await;
    assert_eq!(loaded, created);

    let edit = |title: &str, version: i64| {
        format!(
            r#"{{"id":{id},"version":{version},"title":"{title}","release_date":"1984-06-08","genre":"Comedy","price":"7.50","rating":"PG"}}"#
        )
    };

    let resp = app
        .clone()
        .oneshot(json_request("PUT", &format!("/movies/{id}"), &edit("Ghostbusters!", loaded.version)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Movie = body_json(resp).await;
    assert_eq!(updated.title, "Ghostbusters!");
    assert_eq!(updated.rating, "PG");
    assert_eq!(updated.version, loaded.version + 1);

    // Second edit still carries the revision it originally loaded.
    let resp = app
        .clone()
        .oneshot(json_request("PUT", &format!("/movies/{id}"), &edit("Stale", loaded.version)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["code"], "concurrent_modification");

    let resp = app.clone().oneshot(delete(&format!("/movies/{id}"))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app
        .clone()
        .oneshot(json_request("PUT", &format!("/movies/{id}"), &edit("Late", updated.version)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app.clone().oneshot(get("/movies")).await.unwrap();
    let view: MovieListView = body_json(resp).await;
    assert!(view.movies.is_empty());
}
