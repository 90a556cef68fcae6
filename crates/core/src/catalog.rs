//! Catalog service: validation, gateway calls, and error translation for
//! every movie operation.
//!
//! The service keeps no state besides its gateway handle, and each method
//! issues exactly one gateway call.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde_json::Value;

use crate::error::CoreError;
use crate::gateway::{GatewayError, MovieFilter, MovieGateway, MovieOrder};
use crate::movie::Movie;
use crate::types::DbId;
use crate::validation::{
    validate_movie_patch, validate_new_movie, FieldViolation, ValidationError, ViolationRule,
};

const ENTITY: &str = "Movie";

#[derive(Clone)]
pub struct CatalogService {
    gateway: Arc<dyn MovieGateway>,
}

impl CatalogService {
    pub fn new(gateway: Arc<dyn MovieGateway>) -> Self {
        Self { gateway }
    }

    /// Name of the storage backend behind this service.
    pub fn backend(&self) -> &'static str {
        self.gateway.backend()
    }

    /// Validate a full field set and store it as a new record.
    pub async fn create(&self, fields: &Value) -> Result<Movie, CoreError> {
        let now = Utc::now();
        let movie = validate_new_movie(fields, now.year())?;
        let movie = self.gateway.insert(movie, now).await.map_err(storage)?;
        tracing::info!(movie_id = movie.id, title = %movie.title, "Movie created");
        Ok(movie)
    }

    /// All records, most recently created first. An empty catalog is not an error.
    pub async fn find_all(&self) -> Result<Vec<Movie>, CoreError> {
        let movies = self
            .gateway
            .query(MovieFilter::All, MovieOrder::NewestFirst)
            .await
            .map_err(storage)?;
        tracing::debug!(count = movies.len(), "Listed movies");
        Ok(movies)
    }

    pub async fn find_one(&self, id: DbId) -> Result<Movie, CoreError> {
        self.gateway
            .get_by_id(id)
            .await
            .map_err(storage)?
            .ok_or(CoreError::NotFound { entity: ENTITY, id })
    }

    /// Apply a partial update. Omitted fields keep their stored values.
    pub async fn update(&self, id: DbId, fields: &Value) -> Result<Movie, CoreError> {
        let now = Utc::now();
        let patch = validate_movie_patch(fields, now.year())?;
        let movie = self
            .gateway
            .update_by_id(id, patch, now)
            .await
            .map_err(storage)?
            .ok_or(CoreError::NotFound { entity: ENTITY, id })?;
        tracing::info!(movie_id = id, "Movie updated");
        Ok(movie)
    }

    /// Permanently delete a record and return its prior state.
    pub async fn remove(&self, id: DbId) -> Result<Movie, CoreError> {
        let movie = self
            .gateway
            .delete_by_id(id)
            .await
            .map_err(storage)?
            .ok_or(CoreError::NotFound { entity: ENTITY, id })?;
        tracing::info!(movie_id = id, "Movie deleted");
        Ok(movie)
    }

    /// Records whose genre equals `genre` ignoring case, best rated first.
    ///
    /// Unlike [`find_all`](Self::find_all), no matches is a `NoMatches` error.
    pub async fn find_by_genre(&self, genre: &str) -> Result<Vec<Movie>, CoreError> {
        let movies = self
            .gateway
            .query(
                MovieFilter::GenreEquals(genre.to_string()),
                MovieOrder::RatingDesc,
            )
            .await
            .map_err(storage)?;
        tracing::debug!(genre, count = movies.len(), "Filtered movies by genre");
        non_empty(movies, || format!("in genre '{genre}'"))
    }

    /// Records whose title, description, or director contains `query`
    /// ignoring case, newest first. No matches is a `NoMatches` error.
    pub async fn search(&self, query: &str) -> Result<Vec<Movie>, CoreError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ValidationError::single(FieldViolation::new(
                "q",
                ViolationRule::NonEmpty,
                "must not be empty",
            ))
            .into());
        }

        let movies = self
            .gateway
            .query(
                MovieFilter::TextContains(query.to_string()),
                MovieOrder::NewestFirst,
            )
            .await
            .map_err(storage)?;
        tracing::debug!(query, count = movies.len(), "Searched movies");
        non_empty(movies, || format!("matching '{query}'"))
    }
}

fn non_empty(movies: Vec<Movie>, what: impl FnOnce() -> String) -> Result<Vec<Movie>, CoreError> {
    if movies.is_empty() {
        Err(CoreError::NoMatches { what: what() })
    } else {
        Ok(movies)
    }
}

fn storage(err: GatewayError) -> CoreError {
    tracing::error!(error = %err, "Movie gateway failure");
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use serde_json::json;

    use crate::memory::InMemoryMovieGateway;
    use crate::movie::{MoviePatch, NewMovie};
    use crate::types::Timestamp;

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(InMemoryMovieGateway::new()))
    }

    fn film(title: &str, genre: &str, rating: Option<f64>) -> Value {
        let mut fields = json!({
            "title": title,
            "year": 2000,
            "genre": genre,
            "duration": 120,
        });
        if let Some(rating) = rating {
            fields["rating"] = json!(rating);
        }
        fields
    }

    #[tokio::test]
    async fn create_then_find_one_round_trips_fields() {
        let svc = service();
        let input = json!({
            "title": "Film A",
            "description": "First",
            "year": 2000,
            "genre": "Drama",
            "duration": 120,
            "rating": 7.5,
            "director": "Someone"
        });
        let created = svc.create(&input).await.unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.updated_at, created.created_at);

        let found = svc.find_one(created.id).await.unwrap();
        assert_eq!(found, created);
        assert_eq!(found.description.as_deref(), Some("First"));
        assert_eq!(found.director.as_deref(), Some("Someone"));
    }

    #[tokio::test]
    async fn create_rejects_invalid_input_without_writing() {
        let gateway = Arc::new(InMemoryMovieGateway::new());
        let svc = CatalogService::new(gateway.clone());
        let err = svc
            .create(&json!({ "title": "X", "year": 1887, "genre": "Drama", "duration": 0 }))
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(ref v) if v.violations.len() == 2);
        assert!(gateway.is_empty().await);
    }

    #[tokio::test]
    async fn update_merges_and_advances_updated_at() {
        let svc = service();
        let created = svc.create(&film("Film A", "Drama", Some(7.5))).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let updated = svc.update(created.id, &json!({ "rating": 8.0 })).await.unwrap();
        assert_eq!(updated.rating, Some(8.0));
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.year, created.year);
        assert_eq!(updated.genre, created.genre);
        assert_eq!(updated.duration, created.duration);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn update_validates_before_lookup() {
        let svc = service();
        let created = svc.create(&film("Film A", "Drama", None)).await.unwrap();
        let err = svc
            .update(created.id, &json!({ "duration": 0 }))
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
        assert_eq!(svc.find_one(created.id).await.unwrap().duration, 120);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let svc = service();
        assert_matches!(
            svc.find_one(42).await,
            Err(CoreError::NotFound { id: 42, .. })
        );
        assert_matches!(
            svc.update(42, &json!({ "rating": 1 })).await,
            Err(CoreError::NotFound { id: 42, .. })
        );
        assert_matches!(svc.remove(42).await, Err(CoreError::NotFound { id: 42, .. }));
    }

    #[tokio::test]
    async fn remove_twice_is_not_found_the_second_time() {
        let svc = service();
        let created = svc.create(&film("Gone", "Drama", None)).await.unwrap();
        let removed = svc.remove(created.id).await.unwrap();
        assert_eq!(removed, created);
        assert_matches!(
            svc.remove(created.id).await,
            Err(CoreError::NotFound { .. })
        );
        assert_matches!(
            svc.find_one(created.id).await,
            Err(CoreError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn empty_catalog_lists_but_queries_fail() {
        let svc = service();
        assert!(svc.find_all().await.unwrap().is_empty());
        assert_matches!(
            svc.find_by_genre("Drama").await,
            Err(CoreError::NoMatches { .. })
        );
        assert_matches!(svc.search("anything").await, Err(CoreError::NoMatches { .. }));
    }

    #[tokio::test]
    async fn genre_lookup_ignores_case_and_sorts_by_rating() {
        let svc = service();
        svc.create(&film("Middle", "Drama", Some(6.0))).await.unwrap();
        svc.create(&film("Unrated", "drama", None)).await.unwrap();
        svc.create(&film("Top", "DRAMA", Some(9.0))).await.unwrap();
        svc.create(&film("Elsewhere", "Comedy", Some(10.0))).await.unwrap();

        let upper = svc.find_by_genre("Drama").await.unwrap();
        let lower = svc.find_by_genre("drama").await.unwrap();
        assert_eq!(upper, lower);

        let titles: Vec<_> = upper.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Top", "Middle", "Unrated"]);
    }

    #[tokio::test]
    async fn search_matches_description_case_insensitively() {
        let svc = service();
        let mut fields = film("The Godfather", "Crime", Some(9.2));
        fields["description"] = json!("A Criminal dynasty");
        svc.create(&fields).await.unwrap();
        svc.create(&film("Amelie", "Comedy", None)).await.unwrap();

        let found = svc.search("criminal").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "The Godfather");
    }

    #[tokio::test]
    async fn search_includes_a_record_once_even_if_several_fields_match() {
        let svc = service();
        let mut fields = film("Noir", "Crime", None);
        fields["description"] = json!("noir classic");
        fields["director"] = json!("Noir Person");
        svc.create(&fields).await.unwrap();

        assert_eq!(svc.search("NOIR").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_search_is_a_validation_error() {
        let svc = service();
        assert_matches!(
            svc.search("   ").await,
            Err(CoreError::Validation(ref v)) if v.has_field("q")
        );
    }

    struct FailingGateway;

    #[async_trait]
    impl MovieGateway for FailingGateway {
        fn backend(&self) -> &'static str {
            "failing"
        }

        async fn get_by_id(&self, _id: DbId) -> Result<Option<Movie>, GatewayError> {
            Err(GatewayError::Unavailable("connection refused".into()))
        }

        async fn insert(&self, _movie: NewMovie, _now: Timestamp) -> Result<Movie, GatewayError> {
            Err(GatewayError::Unavailable("connection refused".into()))
        }

        async fn update_by_id(
            &self,
            _id: DbId,
            _patch: MoviePatch,
            _now: Timestamp,
        ) -> Result<Option<Movie>, GatewayError> {
            Err(GatewayError::Backend("deadlock detected".into()))
        }

        async fn delete_by_id(&self, _id: DbId) -> Result<Option<Movie>, GatewayError> {
            Err(GatewayError::Backend("deadlock detected".into()))
        }

        async fn query(
            &self,
            _filter: MovieFilter,
            _order: MovieOrder,
        ) -> Result<Vec<Movie>, GatewayError> {
            Err(GatewayError::Unavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn gateway_failures_are_storage_errors_not_not_found() {
        let svc = CatalogService::new(Arc::new(FailingGateway));
        assert_matches!(
            svc.update(1, &json!({ "rating": 5 })).await,
            Err(CoreError::Storage(_))
        );
        assert_matches!(svc.remove(1).await, Err(CoreError::Storage(_)));
        assert_matches!(svc.find_all().await, Err(CoreError::Storage(_)));
    }

    #[tokio::test]
    async fn validation_runs_before_any_gateway_call() {
        let svc = CatalogService::new(Arc::new(FailingGateway));
        assert_matches!(
            svc.create(&json!({})).await,
            Err(CoreError::Validation(_))
        );
    }
}
