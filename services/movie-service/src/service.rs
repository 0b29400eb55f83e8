use crate::error::CatalogError;
use crate::models::{Movie, MovieForm, UpdateMovieRequest};
use crate::store::MovieStore;

/// Point lookup. A missing movie is a normal outcome, hence `Option`.
pub async fn get_movie(store: &dyn MovieStore, id: i64) -> Result<Option<Movie>, CatalogError> {
    Ok(store.get_movie(id).await?)
}

pub async fn movie_exists(store: &dyn MovieStore, id: i64) -> Result<bool, CatalogError> {
    Ok(store.movie_exists(id).await?)
}

pub async fn create_movie(store: &dyn MovieStore, form: &MovieForm) -> Result<Movie, CatalogError> {
    let draft = form.validate().map_err(|errors| {
        tracing::info!(invalid_fields = errors.len(), "movie create rejected");
        CatalogError::ValidationFailed(errors)
    })?;

    let movie = store.insert_movie(&draft).await?;
    tracing::info!(movie_id = movie.id, title = movie.title.as_str(), "movie created");
    Ok(movie)
}

/// Overwrites every editable field of `id`, provided nobody committed a change
/// since the caller loaded the revision named in `request`.
///
/// A failed commit is disambiguated by re-checking existence: a vanished row
/// is `NotFound`, a row that is still there but changed is
/// `ConcurrentModification`. Nothing is retried or merged.
pub async fn update_movie(
    store: &dyn MovieStore,
    id: i64,
    request: &UpdateMovieRequest,
) -> Result<Movie, CatalogError> {
    if let Some(body_id) = request.body_id() {
        if body_id != id {
            tracing::info!(movie_id = id, body_id = body_id, "movie update id mismatch");
            return Err(CatalogError::NotFound);
        }
    }

    let edit = request.validate().map_err(|errors| {
        tracing::info!(movie_id = id, invalid_fields = errors.len(), "movie update rejected");
        CatalogError::ValidationFailed(errors)
    })?;

    if let Some(movie) = store.update_movie(id, edit.version, &edit.draft).await? {
        tracing::info!(movie_id = id, version = movie.version, "movie updated");
        return Ok(movie);
    }

    if !movie_exists(store, id).await? {
        tracing::info!(movie_id = id, "movie update target gone");
        return Err(CatalogError::NotFound);
    }

    tracing::warn!(
        movie_id = id,
        expected_version = edit.version,
        "movie update conflict"
    );
    Err(CatalogError::ConcurrentModification)
}

/// Idempotent: removing an unknown id succeeds without touching the store.
pub async fn delete_movie(store: &dyn MovieStore, id: i64) -> Result<(), CatalogError> {
    let removed = store.delete_movie(id).await?;
    tracing::info!(movie_id = id, removed = removed, "movie delete");
    Ok(())
}
