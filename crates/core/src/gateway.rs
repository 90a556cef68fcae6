//! Persistence gateway abstraction.
//!
//! The catalog service only sees this narrow interface; storage engines
//! implement it without exposing their native query language.

use async_trait::async_trait;

use crate::movie::{Movie, MoviePatch, NewMovie};
use crate::types::{DbId, Timestamp};

/// Failure inside a storage backend. "Record missing" is not an error here;
/// lookups report it as `None`.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Record selection for [`MovieGateway::query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovieFilter {
    All,
    /// Genre equal to the value after case folding.
    GenreEquals(String),
    /// Title, description, or director containing the value, ignoring case.
    TextContains(String),
}

impl MovieFilter {
    /// Evaluate the predicate against a single record.
    pub fn matches(&self, movie: &Movie) -> bool {
        match self {
            Self::All => true,
            Self::GenreEquals(genre) => movie.genre.to_lowercase() == genre.to_lowercase(),
            Self::TextContains(text) => {
                let needle = text.to_lowercase();
                let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);
                contains(&movie.title)
                    || movie.description.as_deref().is_some_and(contains)
                    || movie.director.as_deref().is_some_and(contains)
            }
        }
    }
}

/// Result ordering for [`MovieGateway::query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieOrder {
    /// `created_at` descending, then `id` descending.
    NewestFirst,
    /// `rating` descending with unrated records last, then `id` ascending.
    RatingDesc,
}

impl MovieOrder {
    pub fn sort(self, movies: &mut [Movie]) {
        match self {
            Self::NewestFirst => movies.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| b.id.cmp(&a.id))
            }),
            Self::RatingDesc => movies.sort_by(|a, b| match (a.rating, b.rating) {
                (Some(x), Some(y)) => y.total_cmp(&x).then_with(|| a.id.cmp(&b.id)),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.id.cmp(&b.id),
            }),
        }
    }
}

/// Durable movie storage keyed by identifier.
#[async_trait]
pub trait MovieGateway: Send + Sync {
    /// Short backend name reported by health checks.
    fn backend(&self) -> &'static str;

    async fn get_by_id(&self, id: DbId) -> Result<Option<Movie>, GatewayError>;

    /// Persist a new record. Storage assigns the id; both timestamps are `now`.
    async fn insert(&self, movie: NewMovie, now: Timestamp) -> Result<Movie, GatewayError>;

    /// Merge `patch` onto the record and set `updated_at` to `now`.
    ///
    /// Returns `None` if no record has this id.
    async fn update_by_id(
        &self,
        id: DbId,
        patch: MoviePatch,
        now: Timestamp,
    ) -> Result<Option<Movie>, GatewayError>;

    /// Permanently delete a record, returning its last state.
    async fn delete_by_id(&self, id: DbId) -> Result<Option<Movie>, GatewayError>;

    async fn query(
        &self,
        filter: MovieFilter,
        order: MovieOrder,
    ) -> Result<Vec<Movie>, GatewayError>;
}
