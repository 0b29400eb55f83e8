use async_trait::async_trait;
use tokio_postgres::{Client, NoTls, Row};

use crate::error::StoreError;
use crate::models::{Movie, MovieDraft};
use crate::store::MovieStore;

const SQL_CREATE_MOVIES: &str = "CREATE TABLE IF NOT EXISTS movies ( \
id BIGSERIAL PRIMARY KEY, \
title TEXT NOT NULL, \
release_date DATE NOT NULL, \
genre TEXT NOT NULL DEFAULT '', \
price NUMERIC(18, 2) NOT NULL CHECK (price >= 0), \
rating TEXT NOT NULL DEFAULT '', \
version BIGINT NOT NULL DEFAULT 1)";
const SQL_LIST_MOVIES: &str =
    "SELECT id, title, release_date, genre, price, rating, version FROM movies ORDER BY id";
const SQL_SELECT_MOVIE: &str =
    "SELECT id, title, release_date, genre, price, rating, version FROM movies WHERE id = $1";
const SQL_INSERT_MOVIE: &str = "INSERT INTO movies (title, release_date, genre, price, rating) \
VALUES ($1, $2, $3, $4, $5) \
RETURNING id, title, release_date, genre, price, rating, version";
// Compare-and-swap on the row revision; zero rows means gone or stale.
const SQL_UPDATE_MOVIE: &str = "UPDATE movies \
SET title = $3, release_date = $4, genre = $5, price = $6, rating = $7, version = version + 1 \
WHERE id = $1 AND version = $2 \
RETURNING id, title, release_date, genre, price, rating, version";
const SQL_DELETE_MOVIE: &str = "DELETE FROM movies WHERE id = $1";
const SQL_MOVIE_EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM movies WHERE id = $1)";
const SQL_COUNT_MOVIES: &str = "SELECT COUNT(*) FROM movies";

/// PostgreSQL-backed movie store.
pub struct PgMovieStore {
    db: Client,
}

impl PgMovieStore {
    pub async fn connect(database_url: &str) -> Result<Self, tokio_postgres::Error> {
        let (db, connection) = tokio_postgres::connect(database_url, NoTls).await?;
        tokio::spawn(async move {
            // Drive the connection in the background.
            if let Err(err) = connection.await {
                tracing::error!(error = %err, "database connection error");
            }
        });
        Ok(Self { db })
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.db
            .batch_execute(SQL_CREATE_MOVIES)
            .await
            .map_err(|err| unavailable("create movies table", err))
    }
}

fn unavailable(action: &str, err: tokio_postgres::Error) -> StoreError {
    StoreError::Unavailable(format!("{action} failed: {err}"))
}

fn movie_from_row(row: &Row) -> Movie {
    Movie {
        id: row.get("id"),
        title: row.get("title"),
        release_date: row.get("release_date"),
        genre: row.get("genre"),
        price: row.get("price"),
        rating: row.get("rating"),
        version: row.get("version"),
    }
}

#[async_trait]
impl MovieStore for PgMovieStore {
    async fn list_movies(&self) -> Result<Vec<Movie>, StoreError> {
        let rows = self
            .db
            .query(SQL_LIST_MOVIES, &[])
            .await
            .map_err(|err| unavailable("list movies", err))?;
        Ok(rows.iter().map(movie_from_row).collect())
    }

    async fn get_movie(&self, id: i64) -> Result<Option<Movie>, StoreError> {
        let row = self
            .db
            .query_opt(SQL_SELECT_MOVIE, &[&id])
            .await
            .map_err(|err| unavailable("select movie", err))?;
        Ok(row.as_ref().map(movie_from_row))
    }

    async fn insert_movie(&self, draft: &MovieDraft) -> Result<Movie, StoreError> {
        let row = self
            .db
            .query_one(
                SQL_INSERT_MOVIE,
                &[
                    &draft.title,
                    &draft.release_date,
                    &draft.genre,
                    &draft.price,
                    &draft.rating,
                ],
            )
            .await
            .map_err(|err| unavailable("insert movie", err))?;
        Ok(movie_from_row(&row))
    }

    async fn update_movie(
        &self,
        id: i64,
        expected_version: i64,
        draft: &MovieDraft,
    ) -> Result<Option<Movie>, StoreError> {
        let row = self
            .db
            .query_opt(
                SQL_UPDATE_MOVIE,
                &[
                    &id,
                    &expected_version,
                    &draft.title,
                    &draft.release_date,
                    &draft.genre,
                    &draft.price,
                    &draft.rating,
                ],
            )
            .await
            .map_err(|err| unavailable("update movie", err))?;
        Ok(row.as_ref().map(movie_from_row))
    }

    async fn delete_movie(&self, id: i64) -> Result<bool, StoreError> {
        let removed = self
            .db
            .execute(SQL_DELETE_MOVIE, &[&id])
            .await
            .map_err(|err| unavailable("delete movie", err))?;
        Ok(removed > 0)
    }

    async fn movie_exists(&self, id: i64) -> Result<bool, StoreError> {
        let row = self
            .db
            .query_one(SQL_MOVIE_EXISTS, &[&id])
            .await
            .map_err(|err| unavailable("movie exists", err))?;
        Ok(row.get(0))
    }

    async fn count_movies(&self) -> Result<u64, StoreError> {
        let row = self
            .db
            .query_one(SQL_COUNT_MOVIES, &[])
            .await
            .map_err(|err| unavailable("count movies", err))?;
        let count: i64 = row.get(0);
        Ok(count.max(0) as u64)
    }
}
