use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::{Movie, MovieDraft};

/// Persistent collection of movie rows.
///
/// `update_movie` is a compare-and-swap on the row revision: it commits only
/// when a row with `id` exists at `expected_version`, and returns `None`
/// otherwise without touching the store.
#[async_trait]
pub trait MovieStore: Send + Sync {
    /// All movies, ordered by id.
    async fn list_movies(&self) -> Result<Vec<Movie>, StoreError>;

    async fn get_movie(&self, id: i64) -> Result<Option<Movie>, StoreError>;

    /// Persists a new row at version 1 with a store-assigned id.
    async fn insert_movie(&self, draft: &MovieDraft) -> Result<Movie, StoreError>;

    async fn update_movie(
        &self,
        id: i64,
        expected_version: i64,
        draft: &MovieDraft,
    ) -> Result<Option<Movie>, StoreError>;

    /// Returns whether a row was removed.
    async fn delete_movie(&self, id: i64) -> Result<bool, StoreError>;

    async fn movie_exists(&self, id: i64) -> Result<bool, StoreError>;

    async fn count_movies(&self) -> Result<u64, StoreError>;
}

#[derive(Default)]
struct MemoryTable {
    rows: BTreeMap<i64, Movie>,
    last_id: i64,
}

/// Process-local store used when no database is configured.
#[derive(Default)]
pub struct MemoryMovieStore {
    table: RwLock<MemoryTable>,
}

impl MemoryMovieStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MovieStore for MemoryMovieStore {
    async fn list_movies(&self) -> Result<Vec<Movie>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn get_movie(&self, id: i64) -> Result<Option<Movie>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn insert_movie(&self, draft: &MovieDraft) -> Result<Movie, StoreError> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let movie = draft.clone().into_movie(table.last_id, 1);
        table.rows.insert(movie.id, movie.clone());
        Ok(movie)
    }

    async fn update_movie(
        &self,
        id: i64,
        expected_version: i64,
        draft: &MovieDraft,
    ) -> Result<Option<Movie>, StoreError> {
        let mut table = self.table.write().await;
        let Some(row) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        if row.version != expected_version {
            return Ok(None);
        }
        *row = draft.clone().into_movie(id, expected_version + 1);
        Ok(Some(row.clone()))
    }

    async fn delete_movie(&self, id: i64) -> Result<bool, StoreError> {
        let mut table = self.table.write().await;
        Ok(table.rows.remove(&id).is_some())
    }

    async fn movie_exists(&self, id: i64) -> Result<bool, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.contains_key(&id))
    }

    async fn count_movies(&self) -> Result<u64, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.len() as u64)
    }
}
