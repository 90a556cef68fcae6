//! Movie record model and the field sets used to create and patch it.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// Earliest release year the catalog accepts.
pub const MIN_YEAR: i32 = 1888;

/// How many years past the current one a release may be scheduled.
pub const MAX_YEARS_AHEAD: i32 = 5;

/// Shortest accepted running time, in minutes.
pub const MIN_DURATION: i32 = 1;

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 10.0;

/// A stored movie record.
///
/// `id` and `created_at` are set once by storage. `updated_at` is refreshed on
/// every successful mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub year: i32,
    pub genre: String,
    /// Running time in minutes.
    pub duration: i32,
    pub rating: Option<f64>,
    pub director: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A validated field set for a new record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovie {
    pub title: String,
    pub description: Option<String>,
    pub year: i32,
    pub genre: String,
    pub duration: i32,
    pub rating: Option<f64>,
    pub director: Option<String>,
}

impl NewMovie {
    /// Materialize the record storage will hold for this field set.
    pub fn into_movie(self, id: DbId, now: Timestamp) -> Movie {
        Movie {
            id,
            title: self.title,
            description: self.description,
            year: self.year,
            genre: self.genre,
            duration: self.duration,
            rating: self.rating,
            director: self.director,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A validated partial update.
///
/// Required fields are `None` when omitted. Optional fields use a nested
/// `Option`: the outer `None` keeps the stored value, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoviePatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub duration: Option<i32>,
    pub rating: Option<Option<f64>>,
    pub director: Option<Option<String>>,
}

impl MoviePatch {
    /// Returns `true` when the patch carries no field changes.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.year.is_none()
            && self.genre.is_none()
            && self.duration.is_none()
            && self.rating.is_none()
            && self.director.is_none()
    }

    /// Merge the patch onto `movie` and stamp `updated_at`.
    pub fn apply(&self, movie: &mut Movie, now: Timestamp) {
        if let Some(title) = &self.title {
            movie.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            movie.description.clone_from(description);
        }
        if let Some(year) = self.year {
            movie.year = year;
        }
        if let Some(genre) = &self.genre {
            movie.genre.clone_from(genre);
        }
        if let Some(duration) = self.duration {
            movie.duration = duration;
        }
        if let Some(rating) = self.rating {
            movie.rating = rating;
        }
        if let Some(director) = &self.director {
            movie.director.clone_from(director);
        }
        movie.updated_at = now;
    }
}
