//! Handlers for the `/movies` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use marquee_core::movie::Movie;
use marquee_core::types::DbId;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::query::SearchParams;
use crate::state::AppState;

/// POST /api/v1/movies
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<Value>,
) -> AppResult<(StatusCode, Json<Movie>)> {
    let movie = state.catalog.create(&input).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

/// GET /api/v1/movies
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Movie>>> {
    let movies = state.catalog.find_all().await?;
    Ok(Json(movies))
}

/// GET /api/v1/movies/search?q=
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<Movie>>> {
    let query = params
        .q
        .ok_or_else(|| AppError::BadRequest("Query parameter 'q' is required".into()))?;
    let movies = state.catalog.search(&query).await?;
    Ok(Json(movies))
}

/// GET /api/v1/movies/genre/{genre}
pub async fn list_by_genre(
    State(state): State<AppState>,
    Path(genre): Path<String>,
) -> AppResult<Json<Vec<Movie>>> {
    let movies = state.catalog.find_by_genre(&genre).await?;
    Ok(Json(movies))
}

/// GET /api/v1/movies/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Movie>> {
    let movie = state.catalog.find_one(id).await?;
    Ok(Json(movie))
}

/// PATCH /api/v1/movies/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<Value>,
) -> AppResult<Json<Movie>> {
    let movie = state.catalog.update(id, &input).await?;
    Ok(Json(movie))
}

/// DELETE /api/v1/movies/{id}
///
/// Responds with the deleted record rather than `204`.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Movie>> {
    let movie = state.catalog.remove(id).await?;
    Ok(Json(movie))
}
