//! In-process [`MovieGateway`] backed by a `BTreeMap`.
//!
//! Used when no database is configured and by the test suites. Each call
//! takes the lock once, so single-record operations are atomic.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::gateway::{GatewayError, MovieFilter, MovieGateway, MovieOrder};
use crate::movie::{Movie, MoviePatch, NewMovie};
use crate::types::{DbId, Timestamp};

#[derive(Debug, Default)]
struct Inner {
    movies: BTreeMap<DbId, Movie>,
    last_id: DbId,
}

#[derive(Debug, Default)]
pub struct InMemoryMovieGateway {
    inner: RwLock<Inner>,
}

impl InMemoryMovieGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.inner.read().await.movies.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl MovieGateway for InMemoryMovieGateway {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get_by_id(&self, id: DbId) -> Result<Option<Movie>, GatewayError> {
        Ok(self.inner.read().await.movies.get(&id).cloned())
    }

    async fn insert(&self, movie: NewMovie, now: Timestamp) -> Result<Movie, GatewayError> {
        let mut inner = self.inner.write().await;
        // Ids are never reused, even after deletes.
        inner.last_id += 1;
        let movie = movie.into_movie(inner.last_id, now);
        inner.movies.insert(movie.id, movie.clone());
        Ok(movie)
    }

    async fn update_by_id(
        &self,
        id: DbId,
        patch: MoviePatch,
        now: Timestamp,
    ) -> Result<Option<Movie>, GatewayError> {
        let mut inner = self.inner.write().await;
        Ok(inner.movies.get_mut(&id).map(|movie| {
            patch.apply(movie, now);
            movie.clone()
        }))
    }

    async fn delete_by_id(&self, id: DbId) -> Result<Option<Movie>, GatewayError> {
        Ok(self.inner.write().await.movies.remove(&id))
    }

    async fn query(
        &self,
        filter: MovieFilter,
        order: MovieOrder,
    ) -> Result<Vec<Movie>, GatewayError> {
        let mut movies: Vec<Movie> = self
            .inner
            .read()
            .await
            .movies
            .values()
            .filter(|movie| filter.matches(movie))
            .cloned()
            .collect();
        order.sort(&mut movies);
        Ok(movies)
    }
}
