//! [`MovieGateway`] over the `movies` table.

use async_trait::async_trait;
use marquee_core::gateway::{GatewayError, MovieFilter, MovieGateway, MovieOrder};
use marquee_core::movie::{Movie, MoviePatch, NewMovie};
use marquee_core::types::{DbId, Timestamp};
use sqlx::{FromRow, PgPool};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, title, description, year, genre, duration, rating, director, created_at, updated_at";

/// A row from the `movies` table.
#[derive(Debug, FromRow)]
struct MovieRow {
    id: DbId,
    title: String,
    description: Option<String>,
    year: i32,
    genre: String,
    duration: i32,
    rating: Option<f64>,
    director: Option<String>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            year: row.year,
            genre: row.genre,
            duration: row.duration,
            rating: row.rating,
            director: row.director,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Postgres-backed movie storage.
#[derive(Debug, Clone)]
pub struct PgMovieGateway {
    pool: PgPool,
}

impl PgMovieGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MovieGateway for PgMovieGateway {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn get_by_id(&self, id: DbId) -> Result<Option<Movie>, GatewayError> {
        let query = format!("SELECT {COLUMNS} FROM movies WHERE id = $1");
        let row = sqlx::query_as::<_, MovieRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(gateway_error)?;
        Ok(row.map(Movie::from))
    }

    async fn insert(&self, movie: NewMovie, now: Timestamp) -> Result<Movie, GatewayError> {
        let query = format!(
            "INSERT INTO movies
                (title, description, year, genre, duration, rating, director, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, MovieRow>(&query)
            .bind(&movie.title)
            .bind(&movie.description)
            .bind(movie.year)
            .bind(&movie.genre)
            .bind(movie.duration)
            .bind(movie.rating)
            .bind(&movie.director)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(gateway_error)?;
        Ok(row.into())
    }

    /// Required columns use `COALESCE`; nullable columns take an explicit
    /// "was set" flag so a patch can clear them.
    async fn update_by_id(
        &self,
        id: DbId,
        patch: MoviePatch,
        now: Timestamp,
    ) -> Result<Option<Movie>, GatewayError> {
        let query = format!(
            "UPDATE movies SET
                title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                year = COALESCE($5, year),
                genre = COALESCE($6, genre),
                duration = COALESCE($7, duration),
                rating = CASE WHEN $8 THEN $9 ELSE rating END,
                director = CASE WHEN $10 THEN $11 ELSE director END,
                updated_at = $12
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, MovieRow>(&query)
            .bind(id)
            .bind(&patch.title)
            .bind(patch.description.is_some())
            .bind(patch.description.clone().flatten())
            .bind(patch.year)
            .bind(&patch.genre)
            .bind(patch.duration)
            .bind(patch.rating.is_some())
            .bind(patch.rating.flatten())
            .bind(patch.director.is_some())
            .bind(patch.director.clone().flatten())
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(gateway_error)?;
        Ok(row.map(Movie::from))
    }

    async fn delete_by_id(&self, id: DbId) -> Result<Option<Movie>, GatewayError> {
        let query = format!("DELETE FROM movies WHERE id = $1 RETURNING {COLUMNS}");
        let row = sqlx::query_as::<_, MovieRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(gateway_error)?;
        Ok(row.map(Movie::from))
    }

    async fn query(
        &self,
        filter: MovieFilter,
        order: MovieOrder,
    ) -> Result<Vec<Movie>, GatewayError> {
        let order_by = match order {
            MovieOrder::NewestFirst => "created_at DESC, id DESC",
            MovieOrder::RatingDesc => "rating DESC NULLS LAST, id ASC",
        };

        let rows = match filter {
            MovieFilter::All => {
                let query = format!("SELECT {COLUMNS} FROM movies ORDER BY {order_by}");
                sqlx::query_as::<_, MovieRow>(&query)
                    .fetch_all(&self.pool)
                    .await
            }
            MovieFilter::GenreEquals(genre) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM movies
                     WHERE LOWER(genre) = LOWER($1)
                     ORDER BY {order_by}"
                );
                sqlx::query_as::<_, MovieRow>(&query)
                    .bind(genre)
                    .fetch_all(&self.pool)
                    .await
            }
            MovieFilter::TextContains(text) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM movies
                     WHERE title ILIKE $1 ESCAPE '\\'
                        OR description ILIKE $1 ESCAPE '\\'
                        OR director ILIKE $1 ESCAPE '\\'
                     ORDER BY {order_by}"
                );
                sqlx::query_as::<_, MovieRow>(&query)
                    .bind(contains_pattern(&text))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(gateway_error)?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }
}

/// Build an `ILIKE` pattern matching `text` anywhere, with wildcards in
/// `text` taken literally.
fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn gateway_error(err: sqlx::Error) -> GatewayError {
    tracing::warn!(error = %err, "movies query failed");
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            GatewayError::Unavailable(err.to_string())
        }
        other => GatewayError::Backend(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn contains_pattern_wraps_and_escapes() {
        assert_eq!(contains_pattern("noir"), "%noir%");
        assert_eq!(contains_pattern("100%_a\\b"), "%100\\%\\_a\\\\b%");
    }

    #[test]
    fn pool_failures_are_unavailable() {
        assert_matches!(
            gateway_error(sqlx::Error::PoolTimedOut),
            GatewayError::Unavailable(_)
        );
        assert_matches!(
            gateway_error(sqlx::Error::RowNotFound),
            GatewayError::Backend(_)
        );
    }
}
