//! Filtering and assembly of the movie listing.

use std::collections::BTreeSet;

use crate::error::CatalogError;
use crate::models::{Movie, MovieListView};
use crate::store::MovieStore;

/// AND-composition of the title search and the exact genre match. Empty
/// filter values are treated as absent.
#[derive(Debug, Clone, Default)]
pub struct MovieFilter {
    search: Option<String>,
    genre: Option<String>,
}

impl MovieFilter {
    pub fn new(genre: Option<&str>, search: Option<&str>) -> Self {
        Self {
            search: non_empty(search).map(fold_case),
            genre: non_empty(genre).map(str::to_string),
        }
    }

    pub fn matches(&self, movie: &Movie) -> bool {
        self.matches_search(movie) && self.matches_genre(movie)
    }

    fn matches_search(&self, movie: &Movie) -> bool {
        match &self.search {
            Some(needle) => fold_case(&movie.title).contains(needle.as_str()),
            None => true,
        }
    }

    fn matches_genre(&self, movie: &Movie) -> bool {
        match &self.genre {
            Some(genre) => movie.genre == *genre,
            None => true,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// Locale-independent case folding for title search. Uppercase mapping is
/// context free, unlike the final-sigma rule of `to_lowercase`.
pub fn fold_case(text: &str) -> String {
    text.to_uppercase()
}

/// Deduplicated genres of `movies` in ordinal order.
pub fn distinct_genres(movies: &[Movie]) -> Vec<String> {
    movies
        .iter()
        .map(|movie| movie.genre.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Builds the listing from the full collection. Genres always come from every
/// movie, not just the ones that survive the filters.
pub fn build_view(all: Vec<Movie>, genre: Option<&str>, search: Option<&str>) -> MovieListView {
    let genres = distinct_genres(&all);
    let filter = MovieFilter::new(genre, search);
    let movies = all.into_iter().filter(|movie| filter.matches(movie)).collect();

    MovieListView {
        movies,
        genres,
        movie_genre: genre.map(str::to_string),
        search_string: search.map(str::to_string),
    }
}

pub async fn assemble(
    store: &dyn MovieStore,
    genre: Option<&str>,
    search: Option<&str>,
) -> Result<MovieListView, CatalogError> {
    let all = store.list_movies().await.map_err(|err| {
        tracing::warn!(error = %err, "movie listing unavailable");
        CatalogError::from(err)
    })?;
    let total = all.len();
    let view = build_view(all, genre, search);
    tracing::debug!(
        movie_genre = genre.unwrap_or(""),
        search_string = search.unwrap_or(""),
        total = total,
        matched = view.movies.len(),
        genres = view.genres.len(),
        "movie listing assembled"
    );
    Ok(view)
}
