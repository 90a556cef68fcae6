//! Query parameter types for API handlers.

use serde::Deserialize;

/// Parameters for `GET /movies/search?q=`.
///
/// `q` is optional here so a missing value yields a JSON `BAD_REQUEST`
/// instead of the extractor's plain-text rejection.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}
