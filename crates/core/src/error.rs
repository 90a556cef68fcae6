use crate::gateway::GatewayError;
use crate::types::DbId;
use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// A genre filter or search produced no records.
    #[error("No movies found {what}")]
    NoMatches { what: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<GatewayError> for CoreError {
    fn from(err: GatewayError) -> Self {
        Self::Storage(err.to_string())
    }
}
