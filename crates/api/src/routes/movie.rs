//! Route definitions for the `/movies` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::movie;
use crate::state::AppState;

/// Routes mounted at `/movies`.
///
/// ```text
/// GET    /                 -> list
/// POST   /                 -> create
/// GET    /search?q=        -> search
/// GET    /genre/{genre}    -> list_by_genre
/// GET    /{id}             -> get_by_id
/// PATCH  /{id}             -> update
/// DELETE /{id}             -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(movie::list).post(movie::create))
        .route("/search", get(movie::search))
        .route("/genre/{genre}", get(movie::list_by_genre))
        .route(
            "/{id}",
            get(movie::get_by_id)
                .patch(movie::update)
                .delete(movie::delete),
        )
}
