use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::StoreError;
use crate::models::MovieDraft;
use crate::store::MovieStore;

fn sample(
    title: &str,
    (year, month, day): (i32, u32, u32),
    genre: &str,
    cents: i64,
) -> Option<MovieDraft> {
    Some(MovieDraft {
        title: title.to_string(),
        release_date: NaiveDate::from_ymd_opt(year, month, day)?,
        genre: genre.to_string(),
        price: Decimal::new(cents, 2),
        rating: "R".to_string(),
    })
}

pub fn sample_movies() -> Vec<MovieDraft> {
    [
        sample("When Harry Met Sally", (1989, 2, 12), "Romantic Comedy", 799),
        sample("Ghostbusters", (1984, 3, 13), "Comedy", 899),
        sample("Ghostbusters 2", (1986, 2, 23), "Comedy", 999),
        sample("Rio Bravo", (1959, 4, 15), "Western", 399),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Inserts the sample catalog into an empty store. A store that already holds
/// movies is left alone. Returns how many rows were inserted.
pub async fn seed_movies(store: &dyn MovieStore) -> Result<usize, StoreError> {
    let existing = store.count_movies().await?;
    if existing > 0 {
        tracing::info!(existing = existing, "store already seeded");
        return Ok(0);
    }

    let samples = sample_movies();
    for draft in &samples {
        store.insert_movie(draft).await?;
    }
    tracing::info!(inserted = samples.len(), "seeded sample movies");
    Ok(samples.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryMovieStore;

    #[test]
    fn samples_pass_validation_rules() {
        let samples = sample_movies();
        assert_eq!(samples.len(), 4);
        assert!(samples
            .iter()
            .all(|draft| !draft.title.is_empty() && draft.price >= Decimal::ZERO));
    }

    #[tokio::test]
    async fn seeding_runs_once() {
        let store = MemoryMovieStore::new();
        assert_eq!(seed_movies(&store).await.unwrap(), 4);
        assert_eq!(seed_movies(&store).await.unwrap(), 0);
        assert_eq!(store.count_movies().await.unwrap(), 4);
    }
}
