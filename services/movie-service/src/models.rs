use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Largest price a `NUMERIC(18, 2)` column can hold.
pub fn max_price() -> Decimal {
    Decimal::new(999_999_999_999_999_999, 2)
}

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Years a release date may fall in; PostgreSQL `DATE` cannot store all of
/// chrono's signed range.
const RELEASE_YEARS: RangeInclusive<i32> = 1..=9999;

/// A stored movie row. `version` is the row revision used for optimistic
/// concurrency; it starts at 1 and is bumped on every committed update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub release_date: NaiveDate,
    pub genre: String,
    pub price: Decimal,
    pub rating: String,
    pub version: i64,
}

/// Validated editable fields of a movie, without store-assigned identity.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDraft {
    pub title: String,
    pub release_date: NaiveDate,
    pub genre: String,
    pub price: Decimal,
    pub rating: String,
}

impl MovieDraft {
    pub fn into_movie(self, id: i64, version: i64) -> Movie {
        Movie {
            id,
            title: self.title,
            release_date: self.release_date,
            genre: self.genre,
            price: self.price,
            rating: self.rating,
            version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Candidate movie fields as submitted by a client. Fields are kept as raw
/// JSON so that a wrongly typed value becomes a field error in `validate`
/// instead of rejecting the whole body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieForm {
    pub title: Option<Value>,
    pub release_date: Option<Value>,
    pub genre: Option<Value>,
    /// Decimal text (`"7.99"`) or a JSON number.
    pub price: Option<Value>,
    pub rating: Option<Value>,
}

impl MovieForm {
    pub fn validate(&self) -> Result<MovieDraft, Vec<FieldError>> {
        let mut errors = Vec::new();

        let title = text_field("title", &self.title, &mut errors);
        if matches!(title, Some(title) if title.is_empty()) {
            errors.push(FieldError::new("title", "title is required"));
        }
        let genre = text_field("genre", &self.genre, &mut errors);
        let rating = text_field("rating", &self.rating, &mut errors);

        let release_date = match text_field("release_date", &self.release_date, &mut errors) {
            None => None,
            Some("") => {
                errors.push(FieldError::new("release_date", "release date is required"));
                None
            }
            Some(raw) => match parse_release_date(raw) {
                Ok(date) => Some(date),
                Err(message) => {
                    errors.push(FieldError::new("release_date", message));
                    None
                }
            },
        };

        let price = match parse_price(self.price.as_ref()) {
            Ok(price) => Some(price),
            Err(message) => {
                errors.push(FieldError::new("price", message));
                None
            }
        };

        match (title, release_date, price) {
            (Some(title), Some(release_date), Some(price)) if errors.is_empty() => Ok(MovieDraft {
                title: title.to_string(),
                release_date,
                genre: genre.unwrap_or("").to_string(),
                price,
                rating: rating.unwrap_or("").to_string(),
            }),
            _ => Err(errors),
        }
    }
}

/// Trimmed text of an optional string field. Absent and `null` read as empty;
/// other JSON types and NUL characters are reported against `field`.
fn text_field<'a>(
    field: &'static str,
    value: &'a Option<Value>,
    errors: &mut Vec<FieldError>,
) -> Option<&'a str> {
    match value {
        None | Some(Value::Null) => Some(""),
        Some(Value::String(text)) if text.contains('\0') => {
            errors.push(FieldError::new(field, format!("{field} must not contain NUL characters")));
            None
        }
        Some(Value::String(text)) => Some(text.trim()),
        Some(_) => {
            errors.push(FieldError::new(field, format!("{field} must be text")));
            None
        }
    }
}

fn parse_release_date(raw: &str) -> Result<NaiveDate, String> {
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| format!("'{raw}' is not a valid date (expected YYYY-MM-DD)"))?;
    if !RELEASE_YEARS.contains(&date.year()) {
        return Err(format!(
            "release year must be between {} and {}",
            RELEASE_YEARS.start(),
            RELEASE_YEARS.end()
        ));
    }
    Ok(date)
}

fn parse_price(value: Option<&Value>) -> Result<Decimal, String> {
    let parsed = match value {
        None | Some(Value::Null) => return Err("price is required".to_string()),
        Some(Value::String(text)) if text.trim().is_empty() => {
            return Err("price is required".to_string())
        }
        Some(Value::String(text)) => Decimal::from_str(text.trim()).ok(),
        Some(Value::Number(number)) => {
            let text = number.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        Some(_) => None,
    };
    let Some(price) = parsed else {
        return Err("price must be a decimal number".to_string());
    };
    if price < Decimal::ZERO {
        return Err("price must not be negative".to_string());
    }
    let price = price.round_dp(2);
    if price > max_price() {
        return Err(format!("price must not exceed {}", max_price()));
    }
    Ok(price)
}

/// Reads an integer field that may arrive as a JSON number or digit text.
pub fn integer_field(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Body of an edit: the edited row's identity and the revision it was loaded
/// at, alongside the new field values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMovieRequest {
    pub id: Option<Value>,
    pub version: Option<Value>,
    #[serde(flatten)]
    pub form: MovieForm,
}

/// A fully validated edit.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieEdit {
    pub id: i64,
    pub version: i64,
    pub draft: MovieDraft,
}

impl UpdateMovieRequest {
    /// The id embedded in the body, when it is a readable integer.
    pub fn body_id(&self) -> Option<i64> {
        integer_field(self.id.as_ref())
    }

    pub fn validate(&self) -> Result<MovieEdit, Vec<FieldError>> {
        let mut errors = Vec::new();
        let id = self.body_id();
        if id.is_none() {
            errors.push(FieldError::new("id", "id must be an integer"));
        }
        let version = integer_field(self.version.as_ref());
        if version.is_none() {
            errors.push(FieldError::new("version", "version must be an integer"));
        }
        let draft = match self.form.validate() {
            Ok(draft) => Some(draft),
            Err(form_errors) => {
                errors.extend(form_errors);
                None
            }
        };

        match (id, version, draft) {
            (Some(id), Some(version), Some(draft)) => Ok(MovieEdit { id, version, draft }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    #[serde(rename = "movieGenre", alias = "movie_genre")]
    pub movie_genre: Option<String>,
    #[serde(rename = "searchString", alias = "search_string")]
    pub search_string: Option<String>,
}

/// Request-scoped listing: the filtered movies, every genre known to the
/// store, and the filters that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieListView {
    pub movies: Vec<Movie>,
    pub genres: Vec<String>,
    pub movie_genre: Option<String>,
    pub search_string: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}
