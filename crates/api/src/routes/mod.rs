pub mod health;
pub mod movie;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /movies                  list, create
/// /movies/search           free-text search (?q=)
/// /movies/genre/{genre}    filter by genre
/// /movies/{id}             get, patch, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/movies", movie::router())
}
